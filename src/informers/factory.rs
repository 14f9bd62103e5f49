// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Shared informer factories, one per API client.

use super::informer::{Informer, SharedInformer, WatchedResource};
use crate::error::{ClientKind, KubeClientError, Result};
use crate::kubernetes::ApisixClient;
use crate::types::ApisixResource;
use futures::future::join_all;
use kube::runtime::watcher;
use kube::{Api, Client};
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// An API client an informer factory can be bound to
pub trait ResourceClient: Clone + Send + Sync + 'static {
    const KIND: ClientKind;

    fn api_client(&self) -> Client;
}

impl ResourceClient for Client {
    const KIND: ClientKind = ClientKind::Kubernetes;

    fn api_client(&self) -> Client {
        self.clone()
    }
}

impl ResourceClient for ApisixClient {
    const KIND: ClientKind = ClientKind::Apisix;

    fn api_client(&self) -> Client {
        self.kube_client().clone()
    }
}

/// Marks the resource types a client can serve informers for
pub trait ServesResource<K> {}

impl<K: k8s_openapi::Resource> ServesResource<K> for Client {}

impl<K: ApisixResource> ServesResource<K> for ApisixClient {}

/// Factory for built-in resource informers
pub type InformerFactory = SharedInformerFactory<Client>;

/// Factory for apisix.apache.org resource informers
pub type ApisixInformerFactory = SharedInformerFactory<ApisixClient>;

/// Creates and caches one informer per resource type, all bound to the same client and
/// resync interval.
///
/// Cheap to clone; clones share the informer registry. Informers are dormant until
/// [`start`](Self::start) is called. Dropping the last clone stops all watches.
pub struct SharedInformerFactory<C: ResourceClient> {
    inner: Arc<FactoryInner<C>>,
}

impl<C: ResourceClient> Clone for SharedInformerFactory<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct FactoryInner<C> {
    client: C,
    resync: Duration,
    watcher_config: watcher::Config,
    informers: Mutex<HashMap<TypeId, Arc<dyn SharedInformer>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    shutdown: CancellationToken,
}

impl<C> Drop for FactoryInner<C> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl<C: ResourceClient> SharedInformerFactory<C> {
    pub fn new(client: C, resync: Duration) -> Result<Self> {
        Self::with_watcher_config(client, resync, watcher::Config::default())
    }

    /// Like [`new`](Self::new), with list/watch options (selectors, timeouts) applied to
    /// every informer of this factory
    pub fn with_watcher_config(
        client: C,
        resync: Duration,
        watcher_config: watcher::Config,
    ) -> Result<Self> {
        let factory = C::KIND;
        if Instant::now().checked_add(resync).is_none() {
            return Err(KubeClientError::FactoryConstructionError {
                factory,
                reason: format!("resync interval {:?} is out of range", resync),
            });
        }

        debug!(factory = %factory, resync = ?resync, "Created shared informer factory");

        Ok(Self {
            inner: Arc::new(FactoryInner {
                client,
                resync,
                watcher_config,
                informers: Mutex::new(HashMap::new()),
                tasks: Mutex::new(Vec::new()),
                shutdown: CancellationToken::new(),
            }),
        })
    }

    pub fn client(&self) -> &C {
        &self.inner.client
    }

    pub fn resync_period(&self) -> Duration {
        self.inner.resync
    }

    /// Get the shared informer for `K`, registering it on first use
    pub fn informer<K>(&self) -> Informer<K>
    where
        K: WatchedResource,
        C: ServesResource<K>,
    {
        let mut informers = self.inner.informers.lock();
        let key = TypeId::of::<K>();

        if let Some(existing) = informers
            .get(&key)
            .and_then(|informer| informer.as_any().downcast_ref::<Informer<K>>())
        {
            return existing.clone();
        }

        let api: Api<K> = Api::all(self.inner.client.api_client());
        let informer = Informer::new(api, self.inner.watcher_config.clone(), self.inner.resync);
        informers.insert(key, Arc::new(informer.clone()));
        let kind = K::kind(&());
        debug!(factory = %C::KIND, kind = %kind, "Registered informer");

        informer
    }

    /// Kinds of all registered informers, sorted
    pub fn informer_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self
            .inner
            .informers
            .lock()
            .values()
            .map(|informer| informer.kind())
            .collect();
        kinds.sort();
        kinds
    }

    /// Start watching for every registered informer that is not running yet.
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let informers = self.inner.informers.lock();
        let mut tasks = self.inner.tasks.lock();

        for informer in informers.values() {
            if let Some(task) = informer.spawn(self.inner.shutdown.child_token()) {
                info!(factory = %C::KIND, kind = %informer.kind(), "Started informer");
                tasks.push(task);
            }
        }
    }

    /// Wait until every started informer has cached its initial list.
    ///
    /// Returns the sync state per kind; `false` means the factory was shut down first.
    /// There is no timeout; wrap the call if one is needed.
    pub async fn wait_for_cache_sync(&self) -> HashMap<String, bool> {
        let pending: Vec<_> = self
            .inner
            .informers
            .lock()
            .values()
            .filter(|informer| informer.started())
            .map(|informer| {
                let synced = informer.synced(self.inner.shutdown.clone());
                let kind = informer.kind();
                async move { (kind, synced.await) }
            })
            .collect();

        join_all(pending).await.into_iter().collect()
    }

    /// Stop all watches and wait for their tasks to finish.
    /// The factory cannot be restarted afterwards.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let tasks = std::mem::take(&mut *self.inner.tasks.lock());

        for task in tasks {
            if let Err(e) = task.await {
                warn!(factory = %C::KIND, error = %e, "Informer task failed");
            }
        }
        debug!(factory = %C::KIND, "Informer factory shut down");
    }
}
