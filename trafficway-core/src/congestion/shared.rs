//! Process-wide handle to the congestion cache.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::info;

use crate::{CongestionLevel, JunctionId, JunctionState};

use super::{CongestionStateCache, Listener, ListenerId, Upsert, notify};

/// Single-threaded shared handle to one [`CongestionStateCache`].
///
/// The application creates one instance with [`SharedCongestionCache::init`]
/// at start-up, hands clones to the feed ingestion path and to the planner,
/// and calls [`SharedCongestionCache::teardown`] on shutdown. Listeners run
/// after the cache borrow is released, so they may read the cache.
#[derive(Debug, Clone)]
pub struct SharedCongestionCache {
    inner: Rc<RefCell<CongestionStateCache>>,
}

impl Default for SharedCongestionCache {
    fn default() -> Self {
        Self::init(super::DEFAULT_VALIDITY_WINDOW)
    }
}

impl SharedCongestionCache {
    /// Create the cache with the given validity window.
    #[must_use]
    pub fn init(validity_window: Duration) -> Self {
        info!(
            "congestion cache initialised with a {}s validity window",
            validity_window.as_secs()
        );
        Self {
            inner: Rc::new(RefCell::new(CongestionStateCache::new(validity_window))),
        }
    }

    /// Drop every entry and listener.
    pub fn teardown(&self) {
        self.inner.borrow_mut().clear();
        info!("congestion cache torn down");
    }

    /// See [`CongestionStateCache::upsert`].
    pub fn upsert(&self, state: JunctionState) -> Upsert {
        let outcome = self.inner.borrow_mut().store(state);
        if let Upsert::LevelChanged(change) = outcome {
            let mut listeners = self.inner.borrow_mut().take_listeners();
            notify(&mut listeners, &change);
            self.inner.borrow_mut().restore_listeners(listeners);
        }
        outcome
    }

    /// See [`CongestionStateCache::on_change`].
    pub fn on_change(&self, listener: Listener) -> ListenerId {
        self.inner.borrow_mut().on_change(listener)
    }

    /// See [`CongestionStateCache::remove_listener`].
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().remove_listener(id)
    }

    /// See [`CongestionStateCache::snapshot`].
    #[must_use]
    pub fn snapshot(
        &self,
        now: DateTime<Utc>,
        max_age: Duration,
    ) -> BTreeMap<JunctionId, JunctionState> {
        self.inner.borrow().snapshot(now, max_age)
    }

    /// See [`CongestionStateCache::fresh`].
    #[must_use]
    pub fn fresh(&self, now: DateTime<Utc>) -> BTreeMap<JunctionId, JunctionState> {
        self.inner.borrow().fresh(now)
    }

    /// See [`CongestionStateCache::levels`].
    #[must_use]
    pub fn levels(&self, now: DateTime<Utc>) -> BTreeMap<JunctionId, CongestionLevel> {
        self.inner.borrow().levels(now)
    }

    /// Number of junctions ever observed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Whether no junction has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}
