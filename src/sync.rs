//! Cross-tab change notification and cache reconciliation.
//!
//! A write through one tab's [`TableStore`](crate::tables::TableStore) is
//! published on a [`ChangeBus`] to every *other* subscribed tab. The writer
//! never hears its own change and must re-render locally. Tabs in another
//! process see nothing on the bus; the [`PollTimer`] fallback catches those
//! and any event that was missed.

use crate::models::Section;
use crate::tables::{Table, TableName, TableStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub table: TableName,
    /// The serialized table as written, or `None` when the key was removed.
    pub new_value: Option<String>,
}

pub struct Subscription {
    pub tab: TabId,
    pub inbox: Receiver<ChangeEvent>,
}

/// Publish/subscribe seam between tabs.
pub trait ChangeBus: Send + Sync {
    fn subscribe(&self) -> Subscription;

    fn unsubscribe(&self, tab: TabId);

    /// Delivers `event` to every subscriber except `origin`.
    fn publish(&self, origin: TabId, event: ChangeEvent);
}

/// In-process bus: one channel per subscribed tab.
#[derive(Default)]
pub struct LocalBus {
    next_tab: AtomicU64,
    subscribers: Mutex<HashMap<TabId, Sender<ChangeEvent>>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TabId, Sender<ChangeEvent>>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ChangeBus for LocalBus {
    fn subscribe(&self) -> Subscription {
        let tab = TabId(self.next_tab.fetch_add(1, Ordering::Relaxed) + 1);
        let (tx, rx) = mpsc::channel();
        self.lock().insert(tab, tx);
        Subscription { tab, inbox: rx }
    }

    fn unsubscribe(&self, tab: TabId) {
        self.lock().remove(&tab);
    }

    fn publish(&self, origin: TabId, event: ChangeEvent) {
        let mut subscribers = self.lock();
        // Receivers dropped without unsubscribing are pruned here.
        subscribers.retain(|tab, tx| *tab == origin || tx.send(event.clone()).is_ok());
        debug!(%origin, table = %event.table, receivers = subscribers.len().saturating_sub(1), "published change");
    }
}

/// Fixed-interval poll schedule.
#[derive(Debug, Clone)]
pub struct PollTimer {
    interval: Duration,
    last: Instant,
}

impl PollTimer {
    /// Starts counting from now.
    pub fn new(interval: Duration) -> Self {
        PollTimer {
            interval,
            last: Instant::now(),
        }
    }

    /// True at most once per interval.
    pub fn due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }
}

/// A tab's cached copy of one table.
pub struct Mirror<T: Table> {
    value: T::Value,
}

impl<T: Table> Mirror<T> {
    pub fn load(store: &TableStore) -> Self {
        Mirror {
            value: store.load::<T>(),
        }
    }

    pub fn get(&self) -> &T::Value {
        &self.value
    }

    /// Replaces the cache with a value this tab just wrote.
    pub fn set(&mut self, value: T::Value) {
        self.value = value;
    }

    /// Reloads from the store; true when the serialized form differs.
    pub fn refresh(&mut self, store: &TableStore) -> bool {
        let fresh = store.load::<T>();
        let changed = serde_json::to_value(&fresh).ok() != serde_json::to_value(&self.value).ok();
        if changed {
            self.value = fresh;
        }
        changed
    }
}

/// The reconcile loop shared by every page controller.
///
/// Implementors describe which tables they watch, how to reload one, and
/// which sections render from it; the provided methods turn broadcasts,
/// poll ticks and visibility changes into the list of sections to redraw.
/// Only sections currently on screen are ever returned.
pub trait Reconcile {
    fn store(&self) -> &TableStore;

    fn poll_timer(&mut self) -> &mut PollTimer;

    /// Sections on screen right now.
    fn showing(&self) -> &'static [Section];

    fn watched_tables(&self) -> &'static [TableName];

    fn sections_for(&self, table: TableName) -> &'static [Section];

    /// Reloads `table` into the cache; true when it changed.
    fn reload(&mut self, table: TableName) -> bool;

    /// Drains broadcasts from other tabs and reloads the tables they name.
    fn pump(&mut self) -> Vec<Section> {
        let events = self.store().take_changes();
        let mut touched = Vec::new();
        for event in events {
            if !self.watched_tables().contains(&event.table) {
                continue;
            }
            debug!(
                tab = %self.store().tab(),
                table = %event.table,
                removed = event.new_value.is_none(),
                "broadcast received"
            );
            if self.reload(event.table) {
                touched.push(event.table);
            }
        }
        self.visible_sections(&touched)
    }

    /// Polls every watched table and reports the visible sections whose
    /// data changed.
    fn refresh_data(&mut self) -> Vec<Section> {
        let mut touched = Vec::new();
        for &table in self.watched_tables() {
            if self.reload(table) {
                touched.push(table);
            }
        }
        if !touched.is_empty() {
            debug!(tab = %self.store().tab(), tables = ?touched, "poll found changes");
        }
        self.visible_sections(&touched)
    }

    /// Reloads everything and redraws what is on screen unconditionally.
    fn manual_refresh(&mut self) -> Vec<Section> {
        for &table in self.watched_tables() {
            self.reload(table);
        }
        self.showing().to_vec()
    }

    /// Event loop step: broadcasts first, then the poll when due.
    fn tick(&mut self, now: Instant) -> Vec<Section> {
        let mut sections = self.pump();
        if self.poll_timer().due(now) {
            for section in self.refresh_data() {
                if !sections.contains(&section) {
                    sections.push(section);
                }
            }
        }
        sections
    }

    /// A tab coming back into view reconciles immediately.
    fn on_visibility_change(&mut self, visible: bool, now: Instant) -> Vec<Section> {
        if !visible {
            return Vec::new();
        }
        self.poll_timer().reset(now);
        let mut sections = self.pump();
        for section in self.refresh_data() {
            if !sections.contains(&section) {
                sections.push(section);
            }
        }
        sections
    }

    fn visible_sections(&self, touched: &[TableName]) -> Vec<Section> {
        self.showing()
            .iter()
            .copied()
            .filter(|section| {
                touched
                    .iter()
                    .any(|&table| self.sections_for(table).contains(section))
            })
            .collect()
    }
}
