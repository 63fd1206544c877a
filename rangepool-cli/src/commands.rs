//! Subcommand implementations
//!
//! Single-entry commands go through the async facade; directory-level
//! commands run the blocking bulk operations on the blocking pool.

use crate::{expand_path, Command, Target};
use anyhow::{bail, Context, Result};
use rangepool_core::address::ipv4_to_u32;
use rangepool_core::bulk::{export_all, export_pool, import_directory, publish_lists, reset};
use rangepool_core::codec::ListKind;
use rangepool_core::config::Config;
use rangepool_core::lookup::load_lookup_directory;
use rangepool_core::{AsyncRangeStore, EntryId, EntryStatus, PoolEntry, RangeStore};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Serialize)]
struct PoolRow {
    name: String,
    whitelisted: usize,
    blocked: usize,
}

fn open_store(config: &Config) -> Result<AsyncRangeStore> {
    let store = RangeStore::open(&config.store.db_path, config.store.store_options())
        .with_context(|| format!("Opening {}", config.store.db_path.display()))?;
    Ok(AsyncRangeStore::new(Arc::new(store)))
}

/// Remove the database file together with its WAL and shared-memory files
fn remove_database(db_path: &Path) -> Result<()> {
    let mut paths = vec![db_path.to_path_buf()];
    for suffix in ["-wal", "-shm"] {
        let mut name = db_path.as_os_str().to_owned();
        name.push(suffix);
        paths.push(PathBuf::from(name));
    }
    for path in paths {
        match fs::remove_file(&path) {
            Ok(()) => info!(path = %path.display(), "Removed database file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("Removing {}", path.display())),
        }
    }
    Ok(())
}

fn format_entry(entry: &PoolEntry) -> String {
    let line = format!("{:>6}  {:<11}  {:<18}", entry.id, entry.status, entry.cidr);
    if entry.comment.is_empty() {
        line.trim_end().to_string()
    } else {
        format!("{}  # {}", line, entry.comment)
    }
}

async fn set_status(store: &AsyncRangeStore, target: Target, status: EntryStatus) -> Result<()> {
    let updated = match (target.id, target.pool) {
        (Some(id), _) => store.set_status(EntryId(id), status).await?,
        (None, Some(pool)) => store.set_status_by_pool(pool, status).await?,
        (None, None) => bail!("either --id or --pool is required"),
    };
    println!("Marked {} entries {}", updated, status);
    Ok(())
}

pub(crate) async fn run(command: Command, config: &Config) -> Result<()> {
    if let Command::Init { force: true } = command {
        remove_database(&config.store.db_path)?;
    }
    let store = open_store(config)?;
    let lists = &config.lists;

    match command {
        Command::Init { .. } => {
            for dir in [
                lists.list_path.join(ListKind::Whitelist.dir_name()),
                lists.list_path.join(ListKind::Blocklist.dir_name()),
                lists.backup_path.clone(),
                lists.output_path.clone(),
            ] {
                fs::create_dir_all(&dir).with_context(|| format!("Creating {}", dir.display()))?;
                debug!(dir = %dir.display(), "Directory ready");
            }
            println!("Initialized {}", config.store.db_path.display());
        }

        Command::Check { ip, json } => {
            let hit = store.find_containing(ipv4_to_u32(ip)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&hit)?);
            } else {
                match hit {
                    Some(entry) => {
                        let mut line = format!(
                            "{}: {} in pool '{}' by {} (id {})",
                            ip, entry.status, entry.pool_name, entry.cidr, entry.id
                        );
                        if !entry.comment.is_empty() {
                            line.push_str(&format!(" # {}", entry.comment));
                        }
                        println!("{}", line);
                    }
                    None => println!("{}: not in any pool", ip),
                }
            }
        }

        Command::Insert {
            cidr,
            pool,
            comment,
            status,
        } => match store.insert(cidr.clone(), pool.clone(), comment, status).await? {
            Some(existing) => println!(
                "{} already covered by {} in pool '{}' (id {})",
                cidr, existing.cidr, existing.pool_name, existing.id
            ),
            None => println!("Inserted {} into '{}' as {}", cidr, pool, status),
        },

        Command::List { pool, json } => {
            let entries = store.list_by_pool(pool.clone()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("Pool '{}' is empty", pool);
            } else {
                for entry in &entries {
                    println!("{}", format_entry(entry));
                }
            }
        }

        Command::Pools { json } => {
            let mut rows = Vec::new();
            for name in store.list_pool_names().await? {
                let (whitelisted, blocked) = store.pool_summary(name.clone()).await?;
                rows.push(PoolRow {
                    name,
                    whitelisted,
                    blocked,
                });
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in &rows {
                    println!("{:<24} whitelisted={:<6} blocked={}", row.name, row.whitelisted, row.blocked);
                }
            }
        }

        Command::Whitelist(target) => set_status(&store, target, EntryStatus::Whitelisted).await?,
        Command::Block(target) => set_status(&store, target, EntryStatus::Blocked).await?,

        Command::Comment { id, text } => {
            if store.set_comment(EntryId(id), text).await? == 0 {
                println!("No entry with id {}", id);
            } else {
                println!("Updated comment of entry {}", id);
            }
        }

        Command::Delete(target) => {
            let removed = match (target.id, target.pool) {
                (Some(id), _) => store.delete_by_id(EntryId(id)).await?,
                (None, Some(pool)) => store.delete_by_pool(pool).await?,
                (None, None) => bail!("either --id or --pool is required"),
            };
            println!("Deleted {} entries", removed);
        }

        Command::Import { dir, status } => {
            let dir = expand_path(&dir)?;
            let summary = store.run(move |s| import_directory(s, &dir, status)).await?;
            println!(
                "Imported {} directives from {} files as {}",
                summary.directives, summary.files, status
            );
            for failed in &summary.failed_files {
                println!("  skipped {}", failed.display());
            }
        }

        Command::Export { pool, out } => {
            let out = match out {
                Some(out) => expand_path(&out)?,
                None => lists.output_path.clone(),
            };
            match pool {
                Some(pool) => {
                    let target = out.clone();
                    let (whitelisted, blocked) =
                        store.run(move |s| export_pool(s, &pool, &target)).await?;
                    println!(
                        "Exported {} whitelisted and {} blocked entries to {}",
                        whitelisted,
                        blocked,
                        out.display()
                    );
                }
                None => {
                    let target = out.clone();
                    let summary = store.run(move |s| export_all(s, &target)).await?;
                    println!(
                        "Exported {} pools ({} whitelisted, {} blocked) to {}",
                        summary.pools,
                        summary.whitelisted,
                        summary.blocked,
                        out.display()
                    );
                }
            }
        }

        Command::Publish => {
            let (list_path, backup_path) = (lists.list_path.clone(), lists.backup_path.clone());
            let (backup_dir, summary) =
                store.run(move |s| publish_lists(s, &list_path, &backup_path)).await?;
            println!(
                "Published {} pools, previous lists saved in {}",
                summary.pools,
                backup_dir.display()
            );
            println!("Reload the web server to apply the lists");
        }

        Command::Reset => {
            let (list_path, backup_path) = (lists.list_path.clone(), lists.backup_path.clone());
            let summary = store.run(move |s| reset(s, &backup_path, &list_path)).await?;
            println!("Backup written to {}", summary.backup_dir.display());
            println!(
                "Rebuilt store: {} directives from {} files",
                summary.imported.directives, summary.imported.files
            );
            for failed in &summary.imported.failed_files {
                println!("  skipped {}", failed.display());
            }
        }

        Command::LoadLuts { dir } => {
            let dir = match dir {
                Some(dir) => expand_path(&dir)?,
                None => lists.lookup_path.clone(),
            };
            let total = store.run(move |s| load_lookup_directory(s, &dir)).await?;
            println!("Loaded {} lookup records", total);
        }

        Command::Host { ip } => {
            let names = store.run(move |s| s.lookup_names(ipv4_to_u32(ip))).await?;
            if names.is_empty() {
                println!("{}: no hostname recorded", ip);
            } else {
                println!("{}: {}", ip, names.join(", "));
            }
        }
    }

    Ok(())
}
