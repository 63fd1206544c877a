//! Async facade over a shared [`RangeStore`]
//!
//! Request handlers running on a tokio runtime should not block a worker on
//! SQLite, so every call is moved onto the blocking pool.

use super::entry::{EntryId, EntryStatus, PoolEntry};
use super::sql_store::RangeStore;
use crate::error::{PoolError, PoolResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct AsyncRangeStore {
    inner: Arc<RangeStore>,
}

impl AsyncRangeStore {
    pub fn new(store: Arc<RangeStore>) -> Self {
        Self { inner: store }
    }

    /// The wrapped blocking store
    pub fn blocking(&self) -> &Arc<RangeStore> {
        &self.inner
    }

    /// Run any blocking store operation on the blocking pool
    pub async fn run<T, F>(&self, op: F) -> PoolResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&RangeStore) -> PoolResult<T> + Send + 'static,
    {
        let store = self.inner.clone();
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| PoolError::Internal(format!("Task join error: {}", e)))?
    }

    pub async fn find_containing(&self, ip: u32) -> PoolResult<Option<PoolEntry>> {
        self.run(move |store| store.find_containing(ip)).await
    }

    pub async fn insert(
        &self,
        cidr: String,
        pool_name: String,
        comment: String,
        status: EntryStatus,
    ) -> PoolResult<Option<PoolEntry>> {
        self.run(move |store| store.insert(&cidr, &pool_name, &comment, status)).await
    }

    pub async fn get(&self, id: EntryId) -> PoolResult<Option<PoolEntry>> {
        self.run(move |store| store.get(id)).await
    }

    pub async fn list_by_pool(&self, pool_name: String) -> PoolResult<Vec<PoolEntry>> {
        self.run(move |store| store.list_by_pool(&pool_name)).await
    }

    pub async fn list_pool_names(&self) -> PoolResult<Vec<String>> {
        self.run(|store| store.list_pool_names()).await
    }

    /// `(whitelisted, blocked)` counts of one pool
    pub async fn pool_summary(&self, pool_name: String) -> PoolResult<(usize, usize)> {
        self.run(move |store| store.pool_summary(&pool_name)).await
    }

    pub async fn set_comment(&self, id: EntryId, comment: String) -> PoolResult<usize> {
        self.run(move |store| store.set_comment(id, &comment)).await
    }

    pub async fn set_status(&self, id: EntryId, status: EntryStatus) -> PoolResult<usize> {
        self.run(move |store| store.set_status(id, status)).await
    }

    pub async fn set_status_by_pool(
        &self,
        pool_name: String,
        status: EntryStatus,
    ) -> PoolResult<usize> {
        self.run(move |store| store.set_status_by_pool(&pool_name, status)).await
    }

    pub async fn delete_by_id(&self, id: EntryId) -> PoolResult<usize> {
        self.run(move |store| store.delete_by_id(id)).await
    }

    pub async fn delete_by_pool(&self, pool_name: String) -> PoolResult<usize> {
        self.run(move |store| store.delete_by_pool(&pool_name)).await
    }
}
