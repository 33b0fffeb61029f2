//! Shared collection abstractions used by the caches and registries.
//!
//! `ConcurrentMap` wraps `dashmap::DashMap`; `Subscribers` is a callback list
//! behind a single lock that dispatches over a snapshot.

use dashmap::DashMap;
use derive_more::Display;
use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct ConcurrentMap<K, V> {
    inner: DashMap<K, V>,
}

impl<K, V> Default for ConcurrentMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ConcurrentMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    pub fn get_cloned(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.get(key).map(|entry| entry.value().clone())
    }

    /// Returns the cached value, computing it outside of any shard lock on a
    /// miss. Concurrent misses may compute twice; the first insert wins.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E>
    where
        V: Clone,
    {
        if let Some(hit) = self.get_cloned(&key) {
            return Ok(hit);
        }
        let value = compute()?;
        Ok(self.inner.entry(key).or_insert(value).value().clone())
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.remove(key).map(|(_, v)| v)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for entry in self.inner.iter() {
            let (k, v) = entry.pair();
            f(k, v);
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("subscription#{_0}")]
pub struct SubscriptionId(u64);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

pub struct Subscribers<E> {
    entries: Mutex<Vec<(SubscriptionId, Callback<E>)>>,
    next_id: AtomicU64,
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<E> Subscribers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: impl Fn(&E) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, Arc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Invokes every callback registered at the time of the call. The lock is
    /// released before dispatch so callbacks may (un)subscribe freely.
    pub fn notify(&self, event: &E) {
        let snapshot: Vec<Callback<E>> = self
            .entries
            .lock()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in snapshot {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn callback_can_unsubscribe_itself_during_dispatch() {
        let subscribers = Arc::new(Subscribers::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let id = {
            let owner = subscribers.clone();
            let calls = calls.clone();
            let slot = slot.clone();
            subscribers.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                if let Some(id) = *slot.lock() {
                    owner.unsubscribe(id);
                }
            })
        };
        *slot.lock() = Some(id);
        let other = calls.clone();
        subscribers.subscribe(move |_| {
            other.fetch_add(10, Ordering::SeqCst);
        });

        subscribers.notify(&1);
        assert_eq!(calls.load(Ordering::SeqCst), 11);
        assert_eq!(subscribers.len(), 1);

        subscribers.notify(&2);
        assert_eq!(calls.load(Ordering::SeqCst), 21);
    }

    #[test]
    fn first_insert_wins_on_concurrent_miss() {
        let map = ConcurrentMap::<&str, u32>::new();
        map.insert("a", 1);
        let value: Result<u32, ()> = map.get_or_try_insert_with("a", || Ok(2));
        assert_eq!(value, Ok(1));
        let value: Result<u32, ()> = map.get_or_try_insert_with("b", || Ok(3));
        assert_eq!(value, Ok(3));
        assert_eq!(map.len(), 2);
    }
}
