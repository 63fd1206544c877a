//! Seams between the store and the list codec / bulk operations
//!
//! Both the pooled [`RangeStore`](super::RangeStore) and a scoped
//! [`StoreTransaction`](super::StoreTransaction) implement these, so the
//! same import and export code runs inside or outside an exclusive section.

use super::entry::{EntryStatus, PoolEntry};
use crate::error::PoolResult;

/// Something ranges can be inserted into
pub trait RangeSink {
    /// Insert a range unless an existing entry already covers it.
    ///
    /// Returns the existing entry on a dedup hit, `None` when a new row was
    /// written.
    fn insert(
        &self,
        cidr: &str,
        pool_name: &str,
        comment: &str,
        status: EntryStatus,
    ) -> PoolResult<Option<PoolEntry>>;
}

/// Something pools can be enumerated from
pub trait RangeSource {
    /// Entries of one pool ordered by `(status, cidr)`
    fn list_by_pool(&self, pool_name: &str) -> PoolResult<Vec<PoolEntry>>;

    /// Distinct pool names, alphabetical
    fn list_pool_names(&self) -> PoolResult<Vec<String>>;
}
