//! SQLite-backed range store
//!
//! Every mutating call runs in its own `BEGIN IMMEDIATE` transaction, so the
//! dedup check of an insert and the insert itself are one unit and writers
//! are serialized by SQLite. Readers on other connections see either the
//! whole row or nothing.

use super::entry::{truncate_comment, EntryId, EntryStatus, PoolEntry};
use super::migrations::{self, DROP_POOLS_SQL, POOLS_TABLE_SQL};
use super::traits::{RangeSink, RangeSource};
use crate::address::AddressRange;
use crate::error::PoolResult;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const ENTRY_COLUMNS: &str = "id, start_ip_int, end_ip_int, cidr, name, comment, status";

/// What counts as "already stored" when inserting a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Either endpoint of the new range lies inside a stored range
    #[default]
    Endpoints,
    /// Any stored range intersects the new one
    Interval,
}

impl std::str::FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "endpoints" => Ok(OverlapPolicy::Endpoints),
            "interval" => Ok(OverlapPolicy::Interval),
            other => Err(format!("unknown overlap policy '{}'", other)),
        }
    }
}

/// Connection settings for [`RangeStore::open`]
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub max_connections: u32,
    pub busy_timeout: Duration,
    pub overlap_policy: OverlapPolicy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 8,
            busy_timeout: Duration::from_secs(5),
            overlap_policy: OverlapPolicy::Endpoints,
        }
    }
}

/// Persistent collection of pool entries
pub struct RangeStore {
    pool: Pool<SqliteConnectionManager>,
    overlap_policy: OverlapPolicy,
}

impl RangeStore {
    /// Open (and migrate) a database file
    pub fn open<P: AsRef<Path>>(db_path: P, options: StoreOptions) -> PoolResult<Self> {
        let busy_timeout = options.busy_timeout;
        let manager = SqliteConnectionManager::file(db_path.as_ref()).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(options.max_connections)
            .build(manager)?;

        info!(path = %db_path.as_ref().display(), "Opened range store");
        Self::new(pool, options.overlap_policy)
    }

    /// Create a new in-memory store
    pub fn memory() -> PoolResult<Self> {
        Self::memory_with_policy(OverlapPolicy::default())
    }

    /// In-memory store with an explicit overlap policy
    pub fn memory_with_policy(overlap_policy: OverlapPolicy) -> PoolResult<Self> {
        // Every in-memory connection is its own database, so keep exactly one alive
        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(SqliteConnectionManager::memory())?;

        Self::new(pool, overlap_policy)
    }

    fn new(pool: Pool<SqliteConnectionManager>, overlap_policy: OverlapPolicy) -> PoolResult<Self> {
        {
            let mut conn = pool.get()?;
            migrations::migrate(&mut conn)?;
        }

        Ok(Self {
            pool,
            overlap_policy,
        })
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.overlap_policy
    }

    pub(crate) fn connection(&self) -> PoolResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    fn write<T>(&self, op: impl FnOnce(&Connection) -> PoolResult<T>) -> PoolResult<T> {
        let mut conn = self.connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = op(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Run `f` inside one exclusive transaction.
    ///
    /// Other writers wait (up to the busy timeout) until it commits. An error
    /// returned by `f` rolls back everything it did.
    pub fn exclusive<T>(
        &self,
        f: impl FnOnce(&StoreTransaction<'_>) -> PoolResult<T>,
    ) -> PoolResult<T> {
        let mut conn = self.connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let scoped = StoreTransaction {
            tx,
            overlap_policy: self.overlap_policy,
        };
        let out = f(&scoped)?;
        scoped.tx.commit()?;
        Ok(out)
    }

    // ===== Range Operations =====

    /// Insert a range; see [`RangeSink::insert`]
    pub fn insert(
        &self,
        cidr: &str,
        pool_name: &str,
        comment: &str,
        status: EntryStatus,
    ) -> PoolResult<Option<PoolEntry>> {
        let policy = self.overlap_policy;
        self.write(|conn| insert_entry(conn, policy, cidr, pool_name, comment, status))
    }

    /// Most specific entry containing `ip`
    pub fn find_containing(&self, ip: u32) -> PoolResult<Option<PoolEntry>> {
        let conn = self.connection()?;
        find_containing(&conn, ip)
    }

    pub fn get(&self, id: EntryId) -> PoolResult<Option<PoolEntry>> {
        let conn = self.connection()?;
        let entry = conn
            .query_row(
                &format!("SELECT {} FROM pools WHERE id = ?", ENTRY_COLUMNS),
                params![id.0],
                entry_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    pub fn list_by_pool(&self, pool_name: &str) -> PoolResult<Vec<PoolEntry>> {
        let conn = self.connection()?;
        list_by_pool(&conn, pool_name)
    }

    pub fn list_pool_names(&self) -> PoolResult<Vec<String>> {
        let conn = self.connection()?;
        list_pool_names(&conn)
    }

    /// Number of stored entries
    pub fn count(&self) -> PoolResult<usize> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM pools", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }

    /// `(whitelisted, blocked)` entry counts of a pool
    pub fn pool_summary(&self, pool_name: &str) -> PoolResult<(usize, usize)> {
        let conn = self.connection()?;
        let (whitelisted, blocked): (i64, i64) = conn.query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN status = 'w' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'b' THEN 1 ELSE 0 END), 0)
             FROM pools WHERE name = ?",
            params![pool_name],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok((whitelisted.max(0) as usize, blocked.max(0) as usize))
    }

    /// Returns the number of entries changed (0 if the id is unknown)
    pub fn set_status(&self, id: EntryId, status: EntryStatus) -> PoolResult<usize> {
        self.write(|conn| {
            Ok(conn.execute(
                "UPDATE pools SET status = ? WHERE id = ?",
                params![status.as_code(), id.0],
            )?)
        })
    }

    pub fn set_status_by_pool(&self, pool_name: &str, status: EntryStatus) -> PoolResult<usize> {
        let changed = self.write(|conn| {
            Ok(conn.execute(
                "UPDATE pools SET status = ? WHERE name = ?",
                params![status.as_code(), pool_name],
            )?)
        })?;
        debug!(pool = pool_name, %status, changed, "Updated pool status");
        Ok(changed)
    }

    pub fn set_comment(&self, id: EntryId, comment: &str) -> PoolResult<usize> {
        let comment = truncate_comment(comment);
        self.write(|conn| {
            Ok(conn.execute(
                "UPDATE pools SET comment = ? WHERE id = ?",
                params![comment, id.0],
            )?)
        })
    }

    pub fn delete_by_id(&self, id: EntryId) -> PoolResult<usize> {
        self.write(|conn| Ok(conn.execute("DELETE FROM pools WHERE id = ?", params![id.0])?))
    }

    pub fn delete_by_pool(&self, pool_name: &str) -> PoolResult<usize> {
        let removed = self.write(|conn| {
            Ok(conn.execute("DELETE FROM pools WHERE name = ?", params![pool_name])?)
        })?;
        debug!(pool = pool_name, removed, "Deleted pool");
        Ok(removed)
    }

    /// Drop every entry and recreate an empty pools table
    pub fn clear(&self) -> PoolResult<()> {
        self.write(clear_pools)
    }
}

impl RangeSink for RangeStore {
    fn insert(
        &self,
        cidr: &str,
        pool_name: &str,
        comment: &str,
        status: EntryStatus,
    ) -> PoolResult<Option<PoolEntry>> {
        RangeStore::insert(self, cidr, pool_name, comment, status)
    }
}

impl RangeSource for RangeStore {
    fn list_by_pool(&self, pool_name: &str) -> PoolResult<Vec<PoolEntry>> {
        RangeStore::list_by_pool(self, pool_name)
    }

    fn list_pool_names(&self) -> PoolResult<Vec<String>> {
        RangeStore::list_pool_names(self)
    }
}

/// Store operations scoped to one exclusive transaction
pub struct StoreTransaction<'conn> {
    tx: Transaction<'conn>,
    overlap_policy: OverlapPolicy,
}

impl StoreTransaction<'_> {
    pub fn insert(
        &self,
        cidr: &str,
        pool_name: &str,
        comment: &str,
        status: EntryStatus,
    ) -> PoolResult<Option<PoolEntry>> {
        insert_entry(&self.tx, self.overlap_policy, cidr, pool_name, comment, status)
    }

    pub fn find_containing(&self, ip: u32) -> PoolResult<Option<PoolEntry>> {
        find_containing(&self.tx, ip)
    }

    pub fn list_by_pool(&self, pool_name: &str) -> PoolResult<Vec<PoolEntry>> {
        list_by_pool(&self.tx, pool_name)
    }

    pub fn list_pool_names(&self) -> PoolResult<Vec<String>> {
        list_pool_names(&self.tx)
    }

    /// Drop every entry and recreate an empty pools table
    pub fn clear(&self) -> PoolResult<()> {
        clear_pools(&self.tx)
    }
}

impl RangeSink for StoreTransaction<'_> {
    fn insert(
        &self,
        cidr: &str,
        pool_name: &str,
        comment: &str,
        status: EntryStatus,
    ) -> PoolResult<Option<PoolEntry>> {
        StoreTransaction::insert(self, cidr, pool_name, comment, status)
    }
}

impl RangeSource for StoreTransaction<'_> {
    fn list_by_pool(&self, pool_name: &str) -> PoolResult<Vec<PoolEntry>> {
        StoreTransaction::list_by_pool(self, pool_name)
    }

    fn list_pool_names(&self) -> PoolResult<Vec<String>> {
        StoreTransaction::list_pool_names(self)
    }
}

// ===== Statement helpers shared by the store and its transactions =====

fn entry_from_row(row: &Row) -> rusqlite::Result<PoolEntry> {
    let status: Option<String> = row.get(6)?;
    let status = status
        .as_deref()
        .and_then(EntryStatus::from_code)
        .unwrap_or(EntryStatus::Blocked);

    Ok(PoolEntry {
        id: EntryId(row.get(0)?),
        start: row.get(1)?,
        end: row.get(2)?,
        cidr: row.get(3)?,
        pool_name: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        comment: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        status,
    })
}

fn insert_entry(
    conn: &Connection,
    policy: OverlapPolicy,
    cidr: &str,
    pool_name: &str,
    comment: &str,
    status: EntryStatus,
) -> PoolResult<Option<PoolEntry>> {
    let range = AddressRange::parse(cidr)?;
    let comment = truncate_comment(comment);

    let existing = match policy {
        OverlapPolicy::Endpoints => match find_containing(conn, range.start)? {
            Some(entry) => Some(entry),
            None => find_containing(conn, range.end)?,
        },
        OverlapPolicy::Interval => find_overlapping(conn, range.start, range.end)?,
    };

    if let Some(entry) = existing {
        debug!(cidr = %range.cidr, existing = %entry.cidr, pool = %entry.pool_name, "Range already covered");
        return Ok(Some(entry));
    }

    conn.execute(
        "INSERT INTO pools (start_ip_int, end_ip_int, cidr, name, comment, status)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![range.start, range.end, range.cidr, pool_name, comment, status.as_code()],
    )?;

    Ok(None)
}

fn find_containing(conn: &Connection, ip: u32) -> PoolResult<Option<PoolEntry>> {
    find_overlapping(conn, ip, ip)
}

/// Narrowest entry intersecting `[start, end]`; ties go to the lowest start, then lowest id
fn find_overlapping(conn: &Connection, start: u32, end: u32) -> PoolResult<Option<PoolEntry>> {
    let entry = conn
        .query_row(
            &format!(
                "SELECT {} FROM pools
                 WHERE start_ip_int <= ?2 AND end_ip_int >= ?1
                 ORDER BY end_ip_int - start_ip_int ASC, start_ip_int ASC, id ASC
                 LIMIT 1",
                ENTRY_COLUMNS
            ),
            params![start, end],
            entry_from_row,
        )
        .optional()?;
    Ok(entry)
}

fn list_by_pool(conn: &Connection, pool_name: &str) -> PoolResult<Vec<PoolEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM pools WHERE name = ? ORDER BY status, cidr",
        ENTRY_COLUMNS
    ))?;

    let entries = stmt
        .query_map(params![pool_name], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

fn list_pool_names(conn: &Connection) -> PoolResult<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT name FROM pools WHERE name IS NOT NULL ORDER BY name")?;

    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn clear_pools(conn: &Connection) -> PoolResult<()> {
    conn.execute_batch(DROP_POOLS_SQL)?;
    conn.execute_batch(POOLS_TABLE_SQL)?;
    info!("Cleared range store");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::parse_ipv4;

    fn ip(text: &str) -> u32 {
        parse_ipv4(text).unwrap()
    }

    #[test]
    fn test_insert_and_find() {
        let store = RangeStore::memory().unwrap();

        let existing = store
            .insert("192.168.0.0/16", "office", "lan", EntryStatus::Whitelisted)
            .unwrap();
        assert!(existing.is_none());

        let found = store.find_containing(ip("192.168.10.1")).unwrap().unwrap();
        assert_eq!(found.cidr, "192.168.0.0/16");
        assert_eq!(found.pool_name, "office");
        assert_eq!(found.comment, "lan");
        assert_eq!(found.status, EntryStatus::Whitelisted);
    }

    #[test]
    fn test_insert_twice_returns_existing() {
        let store = RangeStore::memory().unwrap();

        assert!(store.insert("10.0.0.0/24", "p", "", EntryStatus::Blocked).unwrap().is_none());
        let second = store.insert("10.0.0.0/24", "p", "", EntryStatus::Blocked).unwrap();

        assert_eq!(second.unwrap().cidr, "10.0.0.0/24");
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_endpoint_dedup_misses_enclosing_range() {
        let store = RangeStore::memory().unwrap();
        store.insert("10.1.0.0/16", "inner", "", EntryStatus::Blocked).unwrap();

        // Neither endpoint of the /8 lies inside the /16
        let existing = store.insert("10.0.0.0/8", "outer", "", EntryStatus::Blocked).unwrap();
        assert!(existing.is_none());
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_interval_policy_detects_enclosing_range() {
        let store = RangeStore::memory_with_policy(OverlapPolicy::Interval).unwrap();
        store.insert("10.1.0.0/16", "inner", "", EntryStatus::Blocked).unwrap();

        let existing = store.insert("10.0.0.0/8", "outer", "", EntryStatus::Blocked).unwrap();
        assert_eq!(existing.unwrap().cidr, "10.1.0.0/16");
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_longest_match() {
        let store = RangeStore::memory().unwrap();
        store.insert("10.1.2.0/24", "fine", "", EntryStatus::Whitelisted).unwrap();
        store.insert("10.0.0.0/8", "coarse", "", EntryStatus::Blocked).unwrap();

        let hit = store.find_containing(ip("10.1.2.5")).unwrap().unwrap();
        assert_eq!(hit.cidr, "10.1.2.0/24");
        assert_eq!(hit.status, EntryStatus::Whitelisted);

        let hit = store.find_containing(ip("10.2.0.0")).unwrap().unwrap();
        assert_eq!(hit.cidr, "10.0.0.0/8");
        assert_eq!(hit.status, EntryStatus::Blocked);

        assert!(store.find_containing(ip("11.0.0.0")).unwrap().is_none());
    }

    #[test]
    fn test_equal_width_tie_goes_to_lowest_id() {
        let store = RangeStore::memory().unwrap();
        {
            // Duplicates can only come from databases written by older tooling
            let conn = store.connection().unwrap();
            for pool in ["second", "first"] {
                conn.execute(
                    "INSERT INTO pools (start_ip_int, end_ip_int, cidr, name, comment, status)
                     VALUES (?, ?, '10.9.0.0/16', ?, '', 'b')",
                    params![ip("10.9.0.0"), ip("10.9.255.255"), pool],
                )
                .unwrap();
            }
        }

        for _ in 0..3 {
            let hit = store.find_containing(ip("10.9.1.1")).unwrap().unwrap();
            assert_eq!(hit.pool_name, "second");
            assert_eq!(hit.id, EntryId(1));
        }
    }

    #[test]
    fn test_comment_truncated_on_insert() {
        let store = RangeStore::memory().unwrap();
        let comment = "c".repeat(75);
        store.insert("1.2.3.4", "p", &comment, EntryStatus::Blocked).unwrap();

        let entry = store.find_containing(ip("1.2.3.4")).unwrap().unwrap();
        assert_eq!(entry.comment(), "c".repeat(60));
        assert_eq!(entry.cidr, "1.2.3.4/32");
    }

    #[test]
    fn test_invalid_cidr_rejected() {
        let store = RangeStore::memory().unwrap();
        let err = store.insert("10.0.0.0/40", "p", "", EntryStatus::Blocked).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_list_by_pool_order() {
        let store = RangeStore::memory().unwrap();
        store.insert("172.16.0.0/12", "mixed", "", EntryStatus::Whitelisted).unwrap();
        store.insert("10.0.0.0/8", "mixed", "", EntryStatus::Whitelisted).unwrap();
        store.insert("192.168.0.0/16", "mixed", "", EntryStatus::Blocked).unwrap();
        store.insert("8.8.8.8", "other", "", EntryStatus::Blocked).unwrap();

        let cidrs: Vec<_> = store
            .list_by_pool("mixed")
            .unwrap()
            .into_iter()
            .map(|e| e.cidr)
            .collect();
        assert_eq!(cidrs, vec!["192.168.0.0/16", "10.0.0.0/8", "172.16.0.0/12"]);
    }

    #[test]
    fn test_list_pool_names_sorted() {
        let store = RangeStore::memory().unwrap();
        store.insert("3.0.0.0/8", "zeta", "", EntryStatus::Blocked).unwrap();
        store.insert("1.0.0.0/8", "alpha", "", EntryStatus::Blocked).unwrap();
        store.insert("2.0.0.0/8", "alpha", "", EntryStatus::Blocked).unwrap();

        assert_eq!(store.list_pool_names().unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_status_changes() {
        let store = RangeStore::memory().unwrap();
        store.insert("1.0.0.0/8", "pool", "", EntryStatus::Blocked).unwrap();
        store.insert("2.0.0.0/8", "pool", "", EntryStatus::Blocked).unwrap();

        assert_eq!(store.set_status_by_pool("pool", EntryStatus::Whitelisted).unwrap(), 2);
        assert_eq!(store.pool_summary("pool").unwrap(), (2, 0));

        let entry = store.find_containing(ip("1.1.1.1")).unwrap().unwrap();
        assert_eq!(store.set_status(entry.id, EntryStatus::Blocked).unwrap(), 1);
        assert_eq!(store.pool_summary("pool").unwrap(), (1, 1));

        // Unknown targets are no-ops
        assert_eq!(store.set_status(EntryId(999), EntryStatus::Blocked).unwrap(), 0);
        assert_eq!(store.set_status_by_pool("nope", EntryStatus::Blocked).unwrap(), 0);
    }

    #[test]
    fn test_set_comment() {
        let store = RangeStore::memory().unwrap();
        store.insert("1.0.0.0/8", "pool", "old", EntryStatus::Blocked).unwrap();
        let entry = store.find_containing(ip("1.0.0.1")).unwrap().unwrap();

        store.set_comment(entry.id, &"n".repeat(80)).unwrap();
        let entry = store.get(entry.id).unwrap().unwrap();
        assert_eq!(entry.comment.len(), 60);
    }

    #[test]
    fn test_deletes_are_idempotent() {
        let store = RangeStore::memory().unwrap();
        store.insert("1.0.0.0/8", "a", "", EntryStatus::Blocked).unwrap();
        store.insert("2.0.0.0/8", "b", "", EntryStatus::Blocked).unwrap();
        store.insert("3.0.0.0/8", "b", "", EntryStatus::Blocked).unwrap();

        let entry = store.find_containing(ip("1.0.0.1")).unwrap().unwrap();
        assert_eq!(store.delete_by_id(entry.id).unwrap(), 1);
        assert_eq!(store.delete_by_id(entry.id).unwrap(), 0);

        assert_eq!(store.delete_by_pool("b").unwrap(), 2);
        assert_eq!(store.delete_by_pool("b").unwrap(), 0);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_clear_resets_ids() {
        let store = RangeStore::memory().unwrap();
        store.insert("1.0.0.0/8", "a", "", EntryStatus::Blocked).unwrap();
        store.insert("2.0.0.0/8", "a", "", EntryStatus::Blocked).unwrap();

        store.clear().unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.list_pool_names().unwrap().is_empty());

        store.insert("3.0.0.0/8", "a", "", EntryStatus::Blocked).unwrap();
        let entry = store.find_containing(ip("3.0.0.1")).unwrap().unwrap();
        assert_eq!(entry.id, EntryId(1));
    }

    #[test]
    fn test_exclusive_rolls_back_on_error() {
        let store = RangeStore::memory().unwrap();
        store.insert("1.0.0.0/8", "keep", "", EntryStatus::Blocked).unwrap();

        let result: PoolResult<()> = store.exclusive(|tx| {
            tx.clear()?;
            tx.insert("2.0.0.0/8", "new", "", EntryStatus::Blocked)?;
            tx.insert("not-a-cidr", "new", "", EntryStatus::Blocked)?;
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(store.list_pool_names().unwrap(), vec!["keep"]);
    }

    #[test]
    fn test_overlap_policy_from_str() {
        assert_eq!("Interval".parse::<OverlapPolicy>().unwrap(), OverlapPolicy::Interval);
        assert_eq!("endpoints".parse::<OverlapPolicy>().unwrap(), OverlapPolicy::Endpoints);
        assert!("all".parse::<OverlapPolicy>().is_err());
    }
}
