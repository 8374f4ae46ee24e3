//! Cancellable deferred saves.
//!
//! Every edit schedules a save for its key after a quiet period. Scheduling
//! again before the period is over replaces the pending value and restarts
//! the wait, so a burst of edits produces exactly one save carrying the last
//! value. Keys (notes) are independent of each other.
//!
//! Time is passed in by the caller rather than read from a clock, which keeps
//! the UI loop in charge of when saves fire.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Identifies one scheduled save. A handle stops being current as soon as
/// its key is rescheduled, fired or cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    handle: SaveHandle,
    due: Instant,
    value: T,
}

#[derive(Debug)]
pub struct Debouncer<K, T> {
    quiet: Duration,
    next_handle: u64,
    pending: HashMap<K, Pending<T>>,
}

impl<K: Eq + Hash + Clone, T> Debouncer<K, T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            next_handle: 0,
            pending: HashMap::new(),
        }
    }

    /// Schedule `value` for `key`, cancelling whatever was pending for it.
    pub fn schedule(&mut self, key: K, value: T, now: Instant) -> SaveHandle {
        self.next_handle += 1;
        let handle = SaveHandle(self.next_handle);
        let previous = self.pending.insert(
            key,
            Pending {
                handle,
                due: now + self.quiet,
                value,
            },
        );
        if let Some(previous) = previous {
            tracing::trace!(cancelled = previous.handle.0, "rescheduled pending save");
        }
        handle
    }

    /// Cancel a save if `handle` is still the current one for its key.
    /// Returns whether anything was cancelled.
    pub fn cancel(&mut self, handle: SaveHandle) -> bool {
        let key = self
            .pending
            .iter()
            .find(|(_, p)| p.handle == handle)
            .map(|(k, _)| k.clone());
        match key {
            Some(key) => self.pending.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Earliest deadline among pending saves.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.due).min()
    }

    /// Take every save whose quiet period has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<(K, T)> {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, p)| p.due <= now)
            .map(|(k, _)| k.clone())
            .collect();
        due.into_iter()
            .filter_map(|k| self.pending.remove(&k).map(|p| (k, p.value)))
            .collect()
    }

    /// Take the pending save for one key regardless of its deadline.
    pub fn take(&mut self, key: &K) -> Option<T> {
        self.pending.remove(key).map(|p| p.value)
    }

    /// Take every pending save regardless of deadlines.
    pub fn flush(&mut self) -> Vec<(K, T)> {
        self.pending.drain().map(|(k, p)| (k, p.value)).collect()
    }
}
