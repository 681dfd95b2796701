//! Latest observed state of every monitored junction.
//!
//! [`CongestionStateCache`] keeps exactly one [`JunctionState`] per junction,
//! overwritten on every push from the live feed. Entries are never removed;
//! they simply stop appearing in snapshots once older than the validity
//! window. Listeners are told about congestion *level* transitions only, so a
//! feed that merely updates vehicle counts stays quiet.
//!
//! Invariants:
//! - One live entry per junction id.
//! - An update older than the stored observation is ignored.
//! - Snapshots never contain an entry older than the requested age.

mod shared;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;

use crate::{CongestionLevel, JunctionId, JunctionState};

pub use shared::SharedCongestionCache;

/// Age after which a junction observation is excluded from scoring.
pub const DEFAULT_VALIDITY_WINDOW: Duration = Duration::from_secs(5 * 60);

/// A congestion level transition caused by one upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    /// Junction whose level changed.
    pub junction_id: JunctionId,
    /// Level before the update; `None` for a junction seen for the first time.
    pub previous: Option<CongestionLevel>,
    /// Level after the update.
    pub current: CongestionLevel,
}

/// Result of [`CongestionStateCache::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The entry was stored and its congestion level changed.
    LevelChanged(LevelChange),
    /// The entry was stored with the same congestion level.
    Refreshed,
    /// The update predates the stored observation and was dropped.
    Outdated,
}

/// Handle returned by [`CongestionStateCache::on_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback invoked after an upsert changes a junction's congestion level.
pub type Listener = Box<dyn FnMut(&LevelChange)>;

/// In-memory store of junction states fed by the live congestion feed.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use chrono::Utc;
/// use trafficway_core::congestion::{CongestionStateCache, Upsert};
/// use trafficway_core::{CongestionLevel, GeoPoint, JunctionState};
///
/// let mut cache = CongestionStateCache::default();
/// let notified = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&notified);
/// cache.on_change(Box::new(move |_| counter.set(counter.get() + 1)));
///
/// let state = JunctionState {
///     id: 1,
///     point: GeoPoint { latitude: 51.5, longitude: -0.1 },
///     congestion_level: CongestionLevel::High,
///     vehicle_count: 20,
///     observed_at: Utc::now(),
/// };
/// assert!(matches!(cache.upsert(state), Upsert::LevelChanged(_)));
/// assert_eq!(notified.get(), 1);
/// ```
pub struct CongestionStateCache {
    entries: HashMap<JunctionId, JunctionState>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    validity_window: Duration,
}

impl fmt::Debug for CongestionStateCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CongestionStateCache")
            .field("entries", &self.entries)
            .field("listeners", &self.listeners.len())
            .field("validity_window", &self.validity_window)
            .finish()
    }
}

impl Default for CongestionStateCache {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDITY_WINDOW)
    }
}

impl CongestionStateCache {
    /// Create an empty cache whose entries expire after `validity_window`.
    #[must_use]
    pub fn new(validity_window: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            listeners: Vec::new(),
            next_listener: 0,
            validity_window,
        }
    }

    /// Age after which entries drop out of [`CongestionStateCache::fresh`].
    #[must_use]
    pub const fn validity_window(&self) -> Duration {
        self.validity_window
    }

    /// Number of junctions ever observed, fresh or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no junction has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace the entry for `state.id` and notify listeners of a
    /// level transition.
    pub fn upsert(&mut self, state: JunctionState) -> Upsert {
        let outcome = self.store(state);
        if let Upsert::LevelChanged(change) = outcome {
            notify(&mut self.listeners, &change);
        }
        outcome
    }

    /// Register `listener` for level transitions.
    pub fn on_change(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Unregister a listener. Returns `false` if `id` was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Entries observed no more than `max_age` before `now`.
    #[must_use]
    pub fn snapshot(
        &self,
        now: DateTime<Utc>,
        max_age: Duration,
    ) -> BTreeMap<JunctionId, JunctionState> {
        self.entries
            .iter()
            .filter(|(_, state)| !state.is_stale(now, max_age))
            .map(|(id, state)| (*id, state.clone()))
            .collect()
    }

    /// Entries within the cache's validity window.
    #[must_use]
    pub fn fresh(&self, now: DateTime<Utc>) -> BTreeMap<JunctionId, JunctionState> {
        self.snapshot(now, self.validity_window)
    }

    /// Congestion level of every fresh entry.
    #[must_use]
    pub fn levels(&self, now: DateTime<Utc>) -> BTreeMap<JunctionId, CongestionLevel> {
        self.entries
            .iter()
            .filter(|(_, state)| !state.is_stale(now, self.validity_window))
            .map(|(id, state)| (*id, state.congestion_level))
            .collect()
    }

    /// Store `state` without notifying anyone.
    pub(crate) fn store(&mut self, state: JunctionState) -> Upsert {
        let previous = self.entries.get(&state.id);
        if let Some(existing) = previous
            && state.observed_at < existing.observed_at
        {
            debug!(
                "ignoring junction {} update observed at {}; stored observation is from {}",
                state.id, state.observed_at, existing.observed_at
            );
            return Upsert::Outdated;
        }
        let previous_level = previous.map(|existing| existing.congestion_level);
        let change = LevelChange {
            junction_id: state.id,
            previous: previous_level,
            current: state.congestion_level,
        };
        self.entries.insert(state.id, state);
        if previous_level == Some(change.current) {
            Upsert::Refreshed
        } else {
            Upsert::LevelChanged(change)
        }
    }

    pub(crate) fn take_listeners(&mut self) -> Vec<(ListenerId, Listener)> {
        std::mem::take(&mut self.listeners)
    }

    /// Put back listeners taken for notification, keeping any registered in
    /// the meantime after them.
    pub(crate) fn restore_listeners(&mut self, mut listeners: Vec<(ListenerId, Listener)>) {
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.listeners.clear();
    }
}

pub(crate) fn notify(listeners: &mut [(ListenerId, Listener)], change: &LevelChange) {
    debug!(
        "junction {} congestion {:?} -> {}",
        change.junction_id, change.previous, change.current
    );
    for (_, listener) in listeners.iter_mut() {
        listener(change);
    }
}
