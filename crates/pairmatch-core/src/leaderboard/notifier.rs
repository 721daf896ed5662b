//! Push refreshed rankings to subscribers whenever the store changes.
//!
//! Each subscription owns a listener thread reading the backend change feed.
//! Every change triggers a full `query_top` and the whole list is delivered;
//! events queued while a refresh runs are folded into the next one.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::error::Result;

use super::backend::WatchId;
use super::{LeaderboardEntry, LeaderboardStore};

pub struct LeaderboardNotifier {
    store: Arc<LeaderboardStore>,
    limit: usize,
    active: Arc<AtomicUsize>,
}

impl LeaderboardNotifier {
    pub fn new(store: Arc<LeaderboardStore>) -> Self {
        let limit = store.default_limit();
        Self {
            store,
            limit,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Start receiving the top list after every store change
    pub fn subscribe<F>(&self, callback: F) -> Result<Subscription>
    where
        F: Fn(&[LeaderboardEntry]) + Send + 'static,
    {
        let feed = self.store.watch()?;
        let watch_id = feed.id;
        let live = Arc::new(AtomicBool::new(true));

        let store = Arc::clone(&self.store);
        let limit = self.limit;
        let worker_live = Arc::clone(&live);

        let worker = thread::Builder::new()
            .name(format!("leaderboard-watch-{}", watch_id.0))
            .spawn(move || {
                while let Ok(event) = feed.events.recv() {
                    let coalesced = feed.events.try_iter().count();
                    if !worker_live.load(Ordering::SeqCst) {
                        break;
                    }
                    debug!(
                        "Leaderboard change {:?} (+{} queued), refreshing top {}",
                        event, coalesced, limit
                    );
                    let entries = store.query_top(limit);
                    if worker_live.load(Ordering::SeqCst) {
                        callback(&entries);
                    }
                }
                debug!("Leaderboard watch {} closed", watch_id.0);
            });

        let worker = match worker {
            Ok(handle) => handle,
            Err(e) => {
                self.store.unwatch(watch_id);
                return Err(e.into());
            }
        };

        self.active.fetch_add(1, Ordering::SeqCst);
        Ok(Subscription {
            watch_id,
            live,
            store: Arc::clone(&self.store),
            active: Arc::clone(&self.active),
            worker: Some(worker),
        })
    }

    /// Stop a subscription; calling it again has no effect
    pub fn unsubscribe(&self, subscription: &mut Subscription) {
        subscription.unsubscribe();
    }

    /// Number of subscriptions still delivering
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// Handle to one notifier subscription
///
/// Owns the listener thread. Dropping the handle unsubscribes.
pub struct Subscription {
    watch_id: WatchId,
    live: Arc<AtomicBool>,
    store: Arc<LeaderboardStore>,
    active: Arc<AtomicUsize>,
    worker: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Stop delivery, release the change feed and wait for the listener
    pub fn unsubscribe(&mut self) {
        if self.live.swap(false, Ordering::SeqCst) {
            self.store.unwatch(self.watch_id);
            self.active.fetch_sub(1, Ordering::SeqCst);
        }

        if let Some(worker) = self.worker.take() {
            // A callback may unsubscribe from inside the listener thread
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                warn!("Leaderboard listener {} panicked", self.watch_id.0);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
