//! Signal value cache
//!
//! LRU cache of interpolated signal values keyed by signal name and
//! timestamp rounded to the millisecond. Owned by whoever drives playback;
//! there is no shared global instance.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::sampler::SignalValue;

/// Default number of cached values
pub const DEFAULT_CAPACITY: usize = 1024;

/// Cache tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub capacity: usize,
    /// Entry lifetime in milliseconds, `None` for no expiry
    pub ttl_ms: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl_ms: None,
        }
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    /// Entries dropped because their TTL ran out
    pub expired: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, 0 when nothing was looked up
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    signal: String,
    time_ms: i64,
}

impl CacheKey {
    fn new(signal: &str, time: f64) -> Self {
        Self {
            signal: signal.to_string(),
            time_ms: (time * 1000.0).round() as i64,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: SignalValue,
    inserted: Instant,
    last_access: u64,
}

/// LRU cache of signal values
#[derive(Debug)]
pub struct SignalCache {
    entries: HashMap<CacheKey, CacheEntry>,
    capacity: usize,
    ttl: Option<Duration>,
    /// Monotonic access counter for LRU ordering
    clock: u64,
    stats: CacheStats,
}

impl Default for SignalCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl SignalCache {
    /// Create a cache
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: HashMap::with_capacity(config.capacity.min(DEFAULT_CAPACITY)),
            capacity: config.capacity.max(1),
            ttl: config.ttl_ms.map(Duration::from_millis),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    /// Number of cached values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counters since creation or the last [`clear`](Self::clear)
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.inserted.elapsed() >= ttl)
    }

    /// Look up a value
    pub fn get(&mut self, signal: &str, time: f64) -> Option<SignalValue> {
        let key = CacheKey::new(signal, time);
        let expired = match self.entries.get(&key) {
            None => {
                self.stats.misses += 1;
                return None;
            }
            Some(entry) => self.is_expired(entry),
        };
        if expired {
            self.entries.remove(&key);
            self.stats.expired += 1;
            self.stats.misses += 1;
            return None;
        }

        self.clock += 1;
        let entry = self.entries.get_mut(&key)?;
        entry.last_access = self.clock;
        self.stats.hits += 1;
        Some(entry.value.clone())
    }

    /// Store a value, evicting the least recently used entry when full
    pub fn insert(&mut self, signal: &str, time: f64, value: SignalValue) {
        let key = CacheKey::new(signal, time);
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= self.capacity {
                self.evict_lru();
            }
        }
        self.clock += 1;
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted: Instant::now(),
                last_access: self.clock,
            },
        );
    }

    /// Return the cached value or compute, store and return it
    pub fn get_or_try_insert_with<E, F>(
        &mut self,
        signal: &str,
        time: f64,
        compute: F,
    ) -> Result<SignalValue, E>
    where
        F: FnOnce() -> Result<SignalValue, E>,
    {
        if let Some(value) = self.get(signal, time) {
            return Ok(value);
        }
        let value = compute()?;
        self.insert(signal, time, value.clone());
        Ok(value)
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_access)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            tracing::debug!("Evicting cached {} @ {}ms", key.signal, key.time_ms);
            self.entries.remove(&key);
            self.stats.evictions += 1;
        }
    }

    /// Drop expired entries, returning how many were removed
    pub fn cleanup_expired(&mut self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let before = self.entries.len();
        self.entries.retain(|_, e| e.inserted.elapsed() < ttl);
        let removed = before - self.entries.len();
        self.stats.expired += removed as u64;
        removed
    }

    /// Remove everything and reset the counters
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }
}
