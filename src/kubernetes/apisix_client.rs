// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed client for the apisix.apache.org resource group

use crate::types::{ApisixRoute, ApisixTls, ApisixUpstream};
use kube::{Api, Client, Config as KConfig};

/// Client for APISIX custom resources.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApisixClient {
    client: Client,
}

impl ApisixClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The underlying untyped client
    pub fn kube_client(&self) -> &Client {
        &self.client
    }

    pub fn routes(&self, namespace: &str) -> Api<ApisixRoute> {
        Api::namespaced(self.client.clone(), namespace)
    }

    pub fn all_routes(&self) -> Api<ApisixRoute> {
        Api::all(self.client.clone())
    }

    pub fn upstreams(&self, namespace: &str) -> Api<ApisixUpstream> {
        Api::namespaced(self.client.clone(), namespace)
    }

    pub fn all_upstreams(&self) -> Api<ApisixUpstream> {
        Api::all(self.client.clone())
    }

    pub fn tls(&self, namespace: &str) -> Api<ApisixTls> {
        Api::namespaced(self.client.clone(), namespace)
    }

    pub fn all_tls(&self) -> Api<ApisixTls> {
        Api::all(self.client.clone())
    }
}

impl TryFrom<KConfig> for ApisixClient {
    type Error = kube::Error;

    /// Build a dedicated client from a resolved connection descriptor.
    /// No request is sent until the client is used.
    fn try_from(config: KConfig) -> Result<Self, Self::Error> {
        Client::try_from(config).map(Self::new)
    }
}
