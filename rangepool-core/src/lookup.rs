//! Address to hostname lookup table
//!
//! Filled from comma separated `ip,hostname` dumps and queried by the CLI's
//! `host` command.

use crate::address::parse_ipv4;
use crate::error::{PoolError, PoolResult};
use crate::store::RangeStore;
use rusqlite::{params, Connection, TransactionBehavior};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::{debug, info, warn};

/// File extension of lookup dumps
pub const LOOKUP_EXTENSION: &str = "txt";

const PROGRESS_EVERY: usize = 1000;

/// Split one CSV record, trimming leading whitespace and surrounding quotes
fn split_record(line: &str) -> Vec<&str> {
    line.split(',')
        .map(|field| field.trim_start().trim_end_matches(['\r', '\n']))
        .map(|field| {
            field
                .strip_prefix('"')
                .and_then(|f| f.strip_suffix('"'))
                .unwrap_or(field)
        })
        .collect()
}

fn insert_lookup(conn: &Connection, ip: &str, name: &str) -> PoolResult<()> {
    let ip_int = parse_ipv4(ip)?;
    conn.execute(
        "INSERT INTO lut (ip_int, name) VALUES (?, ?)",
        params![ip_int, name.trim()],
    )?;
    Ok(())
}

impl RangeStore {
    /// Record that `ip` is known as `name`
    pub fn insert_lookup(&self, ip: &str, name: &str) -> PoolResult<()> {
        let conn = self.connection()?;
        insert_lookup(&conn, ip, name)
    }

    /// Every name recorded for `ip`, in insertion order
    pub fn lookup_names(&self, ip: u32) -> PoolResult<Vec<String>> {
        let conn = self.connection()?;
        let mut stmt =
            conn.prepare("SELECT name FROM lut WHERE ip_int = ? AND name IS NOT NULL ORDER BY id")?;
        let names = stmt
            .query_map(params![ip], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Every address recorded under `name`
    pub fn lookup_by_name(&self, name: &str) -> PoolResult<Vec<Ipv4Addr>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT ip_int FROM lut WHERE name = ? ORDER BY ip_int")?;
        let ips = stmt
            .query_map(params![name], |row| row.get::<_, u32>(0))?
            .map(|ip| ip.map(Ipv4Addr::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ips)
    }

    pub fn clear_lookup(&self) -> PoolResult<usize> {
        let conn = self.connection()?;
        Ok(conn.execute("DELETE FROM lut", [])?)
    }

    /// Load one `ip,hostname` dump; returns the number of records stored.
    ///
    /// Records with fewer than two fields or an unusable address are logged
    /// and skipped. The whole file is stored in one transaction.
    pub fn import_lookup<R: BufRead>(&self, reader: R, file_name: &str) -> PoolResult<usize> {
        let mut conn = self.connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut stored = 0;

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| PoolError::io(file_name, e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields = split_record(trimmed);
            if fields.len() < 2 {
                warn!(file = file_name, line = index + 1, "Skipping record without a hostname");
                continue;
            }

            match insert_lookup(&tx, fields[0], fields[1]) {
                Ok(()) => {
                    stored += 1;
                    if stored % PROGRESS_EVERY == 0 {
                        info!(file = file_name, records = stored, "Loading lookup records");
                    }
                }
                Err(e) if e.is_invalid_input() => {
                    warn!(file = file_name, line = index + 1, error = %e, "Skipping lookup record");
                }
                Err(e) => return Err(e),
            }
        }

        tx.commit()?;
        info!(file = file_name, records = stored, "Lookup file loaded");
        Ok(stored)
    }
}

/// Import every `.txt` dump in `folder`; per-file failures are logged.
///
/// Returns the number of records stored across all files.
pub fn load_lookup_directory(store: &RangeStore, folder: &Path) -> PoolResult<usize> {
    let read_dir = fs::read_dir(folder).map_err(|e| PoolError::io(folder, e))?;

    let mut files: Vec<_> = read_dir
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == LOOKUP_EXTENSION))
        .collect();
    files.sort();
    info!(folder = %folder.display(), files = files.len(), "Loading lookup files");

    let mut total = 0;
    for path in files {
        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %PoolError::io(&path, e), "Cannot open lookup file");
                continue;
            }
        };

        match store.import_lookup(BufReader::new(file), &file_name) {
            Ok(count) => total += count,
            Err(e) => warn!(file = %file_name, error = %e, "Failed to import lookup file"),
        }
    }

    debug!(folder = %folder.display(), total, "Lookup directory loaded");
    Ok(total)
}
