// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Construction of the client bundle used by all controllers

use crate::config::Config;
use crate::error::{ClientKind, KubeClientError, Result};
use crate::informers::{ApisixInformerFactory, InformerFactory};
use crate::kubernetes::{ApisixClient, ConnectionParams};
use kube::Client;
use std::time::Duration;
use tracing::{info, instrument};

/// The objects used to communicate with the Kubernetes API server.
///
/// Built once at startup and passed to the controllers that need it. Fields are
/// fixed after construction; reconfiguring means building a new `KubeClient`.
/// Both informer factories share the same resync interval and stay dormant until
/// a caller starts them.
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
    apisix_client: ApisixClient,
    shared_informer_factory: InformerFactory,
    apisix_shared_informer_factory: ApisixInformerFactory,
}

impl KubeClient {
    /// Resolve the connection described by `config` and build both clients and both
    /// informer factories.
    ///
    /// Only local credential files are read; the API server is not contacted. Any
    /// failure aborts the whole build.
    #[instrument(
        skip(config),
        fields(
            kubeconfig = %config.kubernetes.kubeconfig,
            resync = ?config.kubernetes.resync_interval
        )
    )]
    pub async fn new(config: &Config) -> Result<Self> {
        let params = ConnectionParams::from_config(&config.kubernetes);
        let rest_config = params.resolve().await?;
        info!(
            "Resolved {} for API server {}",
            params.credential_source(),
            rest_config.cluster_url
        );

        let client = Client::try_from(rest_config.clone()).map_err(|source| {
            KubeClientError::ClientConstructionError {
                client: ClientKind::Kubernetes,
                source,
            }
        })?;
        let apisix_client = ApisixClient::try_from(rest_config).map_err(|source| {
            KubeClientError::ClientConstructionError {
                client: ClientKind::Apisix,
                source,
            }
        })?;

        Self::from_parts(client, apisix_client, config.kubernetes.resync_interval)
    }

    /// Assemble a bundle from already constructed clients
    pub fn from_parts(
        client: Client,
        apisix_client: ApisixClient,
        resync_interval: Duration,
    ) -> Result<Self> {
        let shared_informer_factory = InformerFactory::new(client.clone(), resync_interval)?;
        let apisix_shared_informer_factory =
            ApisixInformerFactory::new(apisix_client.clone(), resync_interval)?;

        Ok(Self {
            client,
            apisix_client,
            shared_informer_factory,
            apisix_shared_informer_factory,
        })
    }

    /// Client for built-in resources
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Client for resources in the apisix.apache.org group
    pub fn apisix_client(&self) -> &ApisixClient {
        &self.apisix_client
    }

    /// Informer factory for built-in resources
    pub fn shared_informer_factory(&self) -> &InformerFactory {
        &self.shared_informer_factory
    }

    /// Informer factory for resources in the apisix.apache.org group
    pub fn apisix_shared_informer_factory(&self) -> &ApisixInformerFactory {
        &self.apisix_shared_informer_factory
    }
}
