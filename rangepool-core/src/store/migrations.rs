//! Database migrations for the range store
//!
//! Provides versioned migrations for the pool schema. Each migration is
//! applied atomically and tracked in the pool_schema_version table.
//!
//! Databases written by earlier unversioned tooling may already carry some of
//! the columns a migration adds, so column additions check `table_info` first.

use rusqlite::{params, Connection};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Current schema version for the range store
pub const CURRENT_POOL_SCHEMA_VERSION: i32 = 4;

/// A column a migration adds to an existing table
pub struct ColumnAddition {
    pub table: &'static str,
    pub column: &'static str,
    pub definition: &'static str,
}

/// Migration descriptor
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub add_columns: &'static [ColumnAddition],
    pub up_sql: &'static str,
}

/// Full shape of the pools table, used when the table is recreated by a reset
pub(crate) const POOLS_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS pools (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        start_ip_int INTEGER NOT NULL,
        end_ip_int INTEGER NOT NULL,
        cidr TEXT NOT NULL,
        name TEXT,
        comment TEXT,
        status TEXT NOT NULL DEFAULT 'b'
    );

    CREATE INDEX IF NOT EXISTS idx_ip_range ON pools (start_ip_int, end_ip_int);
    CREATE INDEX IF NOT EXISTS idx_pools_name ON pools (name);
"#;

pub(crate) const DROP_POOLS_SQL: &str = r#"
    DROP INDEX IF EXISTS idx_pools_name;
    DROP INDEX IF EXISTS idx_ip_range;
    DROP TABLE IF EXISTS pools;
"#;

/// All available migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Blocklist pools with range index",
            add_columns: &[],
            up_sql: r#"
                CREATE TABLE IF NOT EXISTS pools (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    start_ip_int INTEGER NOT NULL,
                    end_ip_int INTEGER NOT NULL,
                    cidr TEXT NOT NULL,
                    name TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_ip_range ON pools (start_ip_int, end_ip_int);
            "#,
        },
        Migration {
            version: 2,
            description: "Per-entry comments",
            add_columns: &[ColumnAddition {
                table: "pools",
                column: "comment",
                definition: "TEXT",
            }],
            up_sql: "",
        },
        Migration {
            version: 3,
            description: "Whitelist/blocklist status",
            // Rows from the blocklist-only shape are blocked
            add_columns: &[ColumnAddition {
                table: "pools",
                column: "status",
                definition: "TEXT NOT NULL DEFAULT 'b'",
            }],
            up_sql: r#"
                CREATE INDEX IF NOT EXISTS idx_pools_name ON pools (name);
            "#,
        },
        Migration {
            version: 4,
            description: "Address to hostname lookup table",
            add_columns: &[],
            up_sql: r#"
                CREATE TABLE IF NOT EXISTS lut (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    ip_int INTEGER NOT NULL,
                    name TEXT
                );

                CREATE INDEX IF NOT EXISTS host_name ON lut (name);
                CREATE INDEX IF NOT EXISTS idx_lut_ip ON lut (ip_int);
            "#,
        },
    ]
}

/// Get current schema version from database
pub fn get_current_version(conn: &Connection) -> Result<i32, rusqlite::Error> {
    // Ensure schema_version table exists
    conn.execute(
        "CREATE TABLE IF NOT EXISTS pool_schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Option<i32> = conn.query_row(
        "SELECT MAX(version) FROM pool_schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version.unwrap_or(0))
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|name| name == column))
}

/// Run all pending migrations
pub fn migrate(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    let current_version = get_current_version(conn)?;

    let pending_migrations: Vec<_> = get_migrations()
        .into_iter()
        .filter(|m| m.version > current_version)
        .collect();

    for migration in pending_migrations {
        let tx = conn.transaction()?;

        for addition in migration.add_columns {
            if !has_column(&tx, addition.table, addition.column)? {
                tx.execute_batch(&format!(
                    "ALTER TABLE {} ADD COLUMN {} {};",
                    addition.table, addition.column, addition.definition
                ))?;
            }
        }

        if !migration.up_sql.trim().is_empty() {
            tx.execute_batch(migration.up_sql)?;
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();

        tx.execute(
            "INSERT INTO pool_schema_version (version, applied_at) VALUES (?, ?)",
            params![migration.version, now],
        )?;

        tx.commit()?;

        info!(
            version = migration.version,
            description = migration.description,
            "Applied schema migration"
        );
    }

    Ok(())
}

/// Get the latest migration version available
#[cfg(test)]
fn get_latest_version() -> i32 {
    get_migrations().iter().map(|m| m.version).max().unwrap_or(0)
}
