// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use k8s_openapi::api::core::v1::Service;
use tracing::{info, warn};

use apisix_ingress_kube::config::Config;
use apisix_ingress_kube::types::ApisixRoute;
use apisix_ingress_kube::KubeClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting APISIX ingress kube client");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded: kubeconfig={:?}, resync_interval={:?}",
        config.kubernetes.kubeconfig, config.kubernetes.resync_interval
    );

    // Build clients and informer factories; nothing is watched yet
    let kube_client = KubeClient::new(&config).await?;

    let services = kube_client.shared_informer_factory().informer::<Service>();
    let routes = kube_client
        .apisix_shared_informer_factory()
        .informer::<ApisixRoute>();

    kube_client.shared_informer_factory().start();
    kube_client.apisix_shared_informer_factory().start();

    info!("Waiting for informer caches to sync...");
    let (builtin, apisix) = tokio::join!(
        kube_client.shared_informer_factory().wait_for_cache_sync(),
        kube_client.apisix_shared_informer_factory().wait_for_cache_sync()
    );
    for (kind, synced) in builtin.iter().chain(apisix.iter()) {
        if !synced {
            warn!("Cache for {} did not sync", kind);
        }
    }
    info!(
        "Caches synced: {} services, {} apisix routes",
        services.store().state().len(),
        routes.store().state().len()
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down informers");
    tokio::join!(
        kube_client.shared_informer_factory().shutdown(),
        kube_client.apisix_shared_informer_factory().shutdown()
    );

    Ok(())
}
