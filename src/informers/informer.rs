// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! A cached, shared watch over one resource type.

use crate::constants::informer::EVENT_CHANNEL_CAPACITY;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use kube::runtime::reflector::{self, store::Writer, ObjectRef, Store};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Resource};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::HashSet;
use std::fmt::Debug;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Resource types an informer can watch
pub trait WatchedResource:
    Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static
{
}

impl<K> WatchedResource for K where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static
{
}

/// Change notification delivered to informer subscribers.
///
/// The informer cache already reflects the change when the event is received.
#[derive(Debug, Clone)]
pub enum InformerEvent<K> {
    Added(Arc<K>),
    /// Also sent on periodic resync, with `old` and `new` pointing at the same object
    Updated { old: Arc<K>, new: Arc<K> },
    Deleted(Arc<K>),
}

impl<K> InformerEvent<K> {
    /// The object in its latest known state
    pub fn object(&self) -> &Arc<K> {
        match self {
            InformerEvent::Added(obj) | InformerEvent::Deleted(obj) => obj,
            InformerEvent::Updated { new, .. } => new,
        }
    }

    /// True for the updates produced by a periodic resync
    pub fn is_resync(&self) -> bool {
        matches!(self, InformerEvent::Updated { old, new } if Arc::ptr_eq(old, new))
    }
}

/// Shared informer for resources of type `K`.
///
/// Obtained from a `SharedInformerFactory`; all clones share one cache and one watch.
/// Nothing is watched until the owning factory is started.
pub struct Informer<K: WatchedResource> {
    shared: Arc<Shared<K>>,
}

impl<K: WatchedResource> Clone for Informer<K> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<K: WatchedResource> {
    api: Api<K>,
    watcher_config: watcher::Config,
    resync: Duration,
    store: Store<K>,
    /// Taken by the watch task when the informer starts
    writer: Mutex<Option<Writer<K>>>,
    events: broadcast::Sender<InformerEvent<K>>,
}

/// Bookkeeping for an in-progress (re)list
struct Relist<K: WatchedResource> {
    previous: Vec<Arc<K>>,
    seen: HashSet<ObjectRef<K>>,
    pending: Vec<InformerEvent<K>>,
}

impl<K: WatchedResource> Informer<K> {
    pub(crate) fn new(api: Api<K>, watcher_config: watcher::Config, resync: Duration) -> Self {
        let (store, writer) = reflector::store();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            shared: Arc::new(Shared {
                api,
                watcher_config,
                resync,
                store,
                writer: Mutex::new(Some(writer)),
                events,
            }),
        }
    }

    /// Read handle on the informer cache
    pub fn store(&self) -> Store<K> {
        self.shared.store.clone()
    }

    /// Register a new consumer of change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<InformerEvent<K>> {
        self.shared.events.subscribe()
    }

    pub fn resync_period(&self) -> Duration {
        self.shared.resync
    }

    pub fn has_started(&self) -> bool {
        self.shared.writer.lock().is_none()
    }

    #[cfg(test)]
    pub(crate) fn same_informer(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<K: WatchedResource> Shared<K> {
    async fn run(self: Arc<Self>, mut writer: Writer<K>, cancel: CancellationToken) {
        let kind = K::kind(&()).to_string();
        debug!(kind = %kind, resync = ?self.resync, "Starting informer");

        let mut stream = pin!(
            watcher(self.api.clone(), self.watcher_config.clone()).default_backoff()
        );
        let mut resync = resync_timer(self.resync);
        let mut relist = None;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = stream.next() => match event {
                    Some(Ok(event)) => self.process(&mut writer, &mut relist, event),
                    Some(Err(e)) => warn!(kind = %kind, error = %e, "Watch stream error"),
                    None => break,
                },
                _ = tick(&mut resync) => self.redeliver_all(),
            }
        }

        debug!(kind = %kind, "Informer stopped");
    }

    /// Apply one watch event to the cache, then notify subscribers
    fn process(
        &self,
        writer: &mut Writer<K>,
        relist: &mut Option<Relist<K>>,
        event: watcher::Event<K>,
    ) {
        let mut ready = Vec::new();

        match &event {
            watcher::Event::Init => {
                *relist = Some(Relist {
                    previous: self.store.state(),
                    seen: HashSet::new(),
                    pending: Vec::new(),
                });
            }
            watcher::Event::InitApply(obj) => {
                let obj_ref = ObjectRef::from_obj(obj);
                let change = self.applied(&obj_ref, obj);
                match relist.as_mut() {
                    Some(relist) => {
                        relist.seen.insert(obj_ref);
                        relist.pending.push(change);
                    }
                    None => ready.push(change),
                }
            }
            watcher::Event::InitDone => {
                if let Some(Relist {
                    previous,
                    seen,
                    pending,
                }) = relist.take()
                {
                    ready.extend(pending);
                    // Objects that disappeared while the watch was down
                    ready.extend(
                        previous
                            .into_iter()
                            .filter(|obj| !seen.contains(&ObjectRef::from_obj(&**obj)))
                            .map(InformerEvent::Deleted),
                    );
                }
            }
            watcher::Event::Apply(obj) => {
                ready.push(self.applied(&ObjectRef::from_obj(obj), obj));
            }
            watcher::Event::Delete(obj) => {
                ready.push(InformerEvent::Deleted(Arc::new(obj.clone())));
            }
        }

        writer.apply_watcher_event(&event);

        for change in ready {
            self.notify(change);
        }
    }

    fn applied(&self, obj_ref: &ObjectRef<K>, obj: &K) -> InformerEvent<K> {
        let new = Arc::new(obj.clone());
        match self.store.get(obj_ref) {
            Some(old) => InformerEvent::Updated { old, new },
            None => InformerEvent::Added(new),
        }
    }

    fn redeliver_all(&self) {
        let kind = K::kind(&());
        let objects = self.store.state();
        trace!(kind = %kind, count = objects.len(), "Resyncing informer cache");
        for obj in objects {
            self.notify(InformerEvent::Updated {
                old: Arc::clone(&obj),
                new: obj,
            });
        }
    }

    fn notify(&self, event: InformerEvent<K>) {
        if self.events.send(event).is_err() {
            let kind = K::kind(&());
            trace!(kind = %kind, "No subscribers for informer event");
        }
    }
}

fn resync_timer(period: Duration) -> Option<Interval> {
    if period.is_zero() {
        return None;
    }
    let first = Instant::now().checked_add(period)?;
    let mut timer = interval_at(first, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(timer)
}

async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Type-erased view of an informer, used by the factory registry
pub(crate) trait SharedInformer: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn kind(&self) -> String;
    fn started(&self) -> bool;
    /// Spawn the watch task; `None` if it is already running
    fn spawn(&self, cancel: CancellationToken) -> Option<JoinHandle<()>>;
    /// Resolves to `true` once the initial list is cached, `false` on shutdown
    fn synced(&self, cancel: CancellationToken) -> BoxFuture<'static, bool>;
}

impl<K: WatchedResource> SharedInformer for Informer<K> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> String {
        K::kind(&()).to_string()
    }

    fn started(&self) -> bool {
        self.has_started()
    }

    fn spawn(&self, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        let writer = self.shared.writer.lock().take()?;
        Some(tokio::spawn(Arc::clone(&self.shared).run(writer, cancel)))
    }

    fn synced(&self, cancel: CancellationToken) -> BoxFuture<'static, bool> {
        let store = self.store();
        async move {
            tokio::select! {
                ready = store.wait_until_ready() => ready.is_ok(),
                _ = cancel.cancelled() => false,
            }
        }
        .boxed()
    }
}
