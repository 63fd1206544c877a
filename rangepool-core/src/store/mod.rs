//! Storage layer for pool entries
//!
//! Provides SQL-based persistence for ranges, pools and the hostname lookup table.

pub mod async_store;
pub mod entry;
pub mod migrations;
pub mod sql_store;
pub mod traits;

pub use async_store::AsyncRangeStore;
pub use entry::{truncate_comment, EntryId, EntryStatus, PoolEntry, MAX_COMMENT_CHARS};
pub use migrations::{migrate, CURRENT_POOL_SCHEMA_VERSION};
pub use sql_store::{OverlapPolicy, RangeStore, StoreOptions, StoreTransaction};
pub use traits::{RangeSink, RangeSource};
