//! Ground height cache with time-to-live expiry.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

#[derive(Clone, Copy, Debug)]
struct CacheEntry {
    elevation: f32,
    stamp: Instant,
}

/// Quantized (x, z) to elevation, with per-entry timestamps.
///
/// - Entries at or past the TTL are never returned.
/// - When the entry count exceeds `max_entries`, entries older than twice the TTL
///   are discarded.
#[derive(Debug)]
pub struct HeightCache {
    entries: HashMap<(i32, i32), CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl HeightCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            max_entries,
        }
    }

    /// Live elevation for `key`, if any.
    #[inline]
    pub fn get(&self, key: (i32, i32), now: Instant) -> Option<f32> {
        let entry = self.entries.get(&key)?;
        (now.saturating_duration_since(entry.stamp) < self.ttl).then_some(entry.elevation)
    }

    /// Store `elevation` for `key`. Returns the number of entries pruned.
    pub fn insert(&mut self, key: (i32, i32), elevation: f32, now: Instant) -> usize {
        self.entries.insert(
            key,
            CacheEntry {
                elevation,
                stamp: now,
            },
        );

        if self.entries.len() > self.max_entries {
            self.prune(now)
        } else {
            0
        }
    }

    /// Drop entries older than twice the TTL. Returns how many were removed.
    pub fn prune(&mut self, now: Instant) -> usize {
        let horizon = self.ttl * 2;
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.stamp) <= horizon);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
