//! Key/value store with a per-entry TTL and a hard capacity.
//!
//! Eviction is TTL first, then insertion order (FIFO) on overflow. Reads never
//! reorder entries, so a hot entry is as evictable as a cold one once it is
//! the oldest insertion.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

const MIN_TTL: Duration = Duration::from_millis(1);

struct Slot<V> {
    seq: u64,
    expires_at: Instant,
    value: V,
}

struct Inner<K, V> {
    entries: HashMap<K, Slot<V>>,
    /// Insertion order. A `(key, seq)` whose seq no longer matches the live
    /// slot is a tombstone left by a re-put or a removal.
    order: VecDeque<(K, u64)>,
    next_seq: u64,
}

pub struct ExpiringBoundedCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    capacity: usize,
    ttl: Duration,
}

impl<K, V> ExpiringBoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::with_capacity(capacity.min(4096)),
                order: VecDeque::with_capacity(capacity.min(4096)),
                next_seq: 0,
            }),
            capacity,
            ttl: ttl.max(MIN_TTL),
        }
    }

    /// Store `value` and run a maintenance pass. Returns how many other
    /// entries the pass removed (expired plus overflow).
    ///
    /// Re-putting a live key refreshes its TTL and moves it to the back of
    /// the insertion order.
    pub fn put(&self, key: K, value: V) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.order.push_back((key.clone(), seq));
        inner.entries.insert(
            key,
            Slot {
                seq,
                expires_at: now + self.ttl,
                value,
            },
        );

        let removed = self.maintain(&mut inner, now);
        self.compact(&mut inner);
        removed
    }

    /// Returns a clone of the live value, or `None` when absent or expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let inner = self.inner.lock();
        inner
            .entries
            .get(key)
            .filter(|slot| now < slot.expires_at)
            .map(|slot| slot.value.clone())
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let removed = inner.entries.remove(key).map(|slot| slot.value);
        self.compact(&mut inner);
        removed
    }

    /// Remove every entry whose key satisfies `predicate`.
    pub fn remove_matching<F>(&self, predicate: F) -> usize
    where
        F: Fn(&K) -> bool,
    {
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !predicate(key));
        let removed = before - inner.entries.len();
        self.compact(&mut inner);
        removed
    }

    /// Number of unexpired entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let inner = self.inner.lock();
        inner
            .entries
            .values()
            .filter(|slot| now < slot.expires_at)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn maintain(&self, inner: &mut Inner<K, V>, now: Instant) -> usize {
        let mut removed = 0;

        // Every entry shares one TTL, so live entries expire in insertion
        // order and the expired ones always form a prefix of `order`.
        while let Some((key, seq)) = inner.order.front().cloned() {
            let live = inner
                .entries
                .get(&key)
                .filter(|slot| slot.seq == seq)
                .map(|slot| slot.expires_at > now);
            match live {
                Some(true) => break,
                Some(false) => {
                    inner.entries.remove(&key);
                    removed += 1;
                }
                None => {}
            }
            inner.order.pop_front();
        }

        while inner.entries.len() > self.capacity {
            let Some((key, seq)) = inner.order.pop_front() else {
                break;
            };
            if inner.entries.get(&key).is_some_and(|slot| slot.seq == seq) {
                inner.entries.remove(&key);
                removed += 1;
            }
        }

        removed
    }

    fn compact(&self, inner: &mut Inner<K, V>) {
        if inner.order.len() <= inner.entries.len() * 2 + 16 {
            return;
        }
        let Inner { entries, order, .. } = inner;
        order.retain(|(key, seq)| entries.get(key).is_some_and(|slot| slot.seq == *seq));
    }
}
