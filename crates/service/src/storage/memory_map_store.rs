use std::{
    collections::{BTreeMap, HashMap},
    hash::Hash,
    sync::Arc,
};
use tokio::sync::RwLock;

use crate::errors::ServiceError;

/// Generic in-memory key-value map store.
///
/// Holds a `HashMap<K, V>` behind an async reader-writer lock. Nothing is
/// persisted; the map lives exactly as long as the process (or the test) that
/// built it. Multi-step operations go through [`MemoryMapStore::update_map`]
/// so the lookup and the write happen under one lock.
pub struct MemoryMapStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> MemoryMapStore<K, V>
where
    K: Eq + Hash + Ord + Clone,
    V: Clone,
{
    /// Create an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self { inner: RwLock::new(HashMap::new()) })
    }

    /// Create a store pre-filled with the given entries.
    pub fn with_entries<I>(entries: I) -> Arc<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Arc::new(Self { inner: RwLock::new(entries.into_iter().collect()) })
    }

    /// All entries, ordered by key.
    pub async fn list(&self) -> BTreeMap<K, V> {
        let map = self.inner.read().await;
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Entries whose key and value satisfy `pred`, ordered by key.
    pub async fn filter<F>(&self, pred: F) -> BTreeMap<K, V>
    where
        F: Fn(&K, &V) -> bool,
    {
        let map = self.inner.read().await;
        map.iter()
            .filter(|(k, v)| pred(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    pub async fn contains(&self, key: &K) -> bool {
        self.inner.read().await.contains_key(key)
    }

    /// Insert or replace a value by key.
    pub async fn set(&self, key: K, value: V) {
        let mut map = self.inner.write().await;
        map.insert(key, value);
    }

    /// Remove a key; returns whether it existed.
    pub async fn remove(&self, key: &K) -> bool {
        let mut map = self.inner.write().await;
        map.remove(key).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// Apply a mutation to the underlying map while holding the write lock.
    ///
    /// If `f` fails the map is left as `f` left it; callers validate before
    /// touching the map so a failure never leaves a half-applied write.
    pub async fn update_map<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<T, ServiceError>,
    {
        let mut map = self.inner.write().await;
        f(&mut map)
    }
}
