//! Expire-after-write cache with a capacity bound.
//!
//! Entries expire once `ttl` has elapsed since they were written; reads do not
//! extend the lifetime. When an insert would exceed the capacity, expired
//! entries are purged first and then the oldest-written entries are evicted.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::clock::Clock;

#[derive(Debug, Clone)]
struct Slot<V> {
    written: Instant,
    value: V,
}

#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, Slot<V>>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity: capacity.max(1),
            clock,
        }
    }

    /// Live value for `key`. An expired entry is removed and reported as absent.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let value = {
            let slot = self.entries.get(key)?;
            (!self.is_expired(&slot, now)).then(|| slot.value.clone())
        };
        if value.is_none() {
            self.entries
                .remove_if(key, |_, slot| self.is_expired(slot, now));
        }
        value
    }

    pub fn insert(&self, key: K, value: V) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.make_room();
        }
        let written = self.clock.now();
        self.entries.insert(key, Slot { written, value });
    }

    /// Number of stored entries, expired ones included until they are purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    fn is_expired(&self, slot: &Slot<V>, now: Instant) -> bool {
        now.saturating_duration_since(slot.written) >= self.ttl
    }

    fn make_room(&self) {
        let now = self.clock.now();
        self.entries.retain(|_, slot| !self.is_expired(slot, now));

        while self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().written)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}
