use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use crate::domain::Lookup;
use crate::error::OntoError;

pub struct MemoCache<K, V> {
    name: &'static str,
    inner: Cache<K, Lookup<Arc<V>>>,
}

impl<K, V> MemoCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(name: &'static str, max_entries: u64, ttl: Duration) -> Self {
        Self {
            name,
            inner: Cache::builder()
                .name(name)
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get_or_fetch<F>(&self, key: K, fetch: F) -> Result<Option<Arc<V>>, OntoError>
    where
        F: FnOnce() -> Result<Option<V>, OntoError>,
    {
        self.inner
            .try_get_with(key, || fetch().map(|value| Lookup::from(value.map(Arc::new))))
            .map(Lookup::into_option)
            .map_err(Arc::unwrap_or_clone)
    }

    pub fn peek(&self, key: &K) -> Option<Lookup<Arc<V>>> {
        self.inner.get(key)
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
