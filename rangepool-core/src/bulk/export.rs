use super::LIST_EXTENSION;
use crate::codec::{render_list, ListKind};
use crate::error::{PoolError, PoolResult};
use crate::store::{PoolEntry, RangeSource};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Totals of an [`export_all`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub pools: usize,
    pub whitelisted: usize,
    pub blocked: usize,
}

/// Write one pool to `output_path/{whitelists,blocklists}/<pool>.conf`.
///
/// A list file is only written for a side that has entries. Returns
/// `(whitelisted, blocked)` counts.
pub fn export_pool<S: RangeSource + ?Sized>(
    source: &S,
    pool_name: &str,
    output_path: &Path,
) -> PoolResult<(usize, usize)> {
    let entries = source.list_by_pool(pool_name)?;
    let whitelisted = entries.iter().filter(|e| e.is_whitelisted()).count();
    let blocked = entries.len() - whitelisted;

    for (kind, count) in [(ListKind::Whitelist, whitelisted), (ListKind::Blocklist, blocked)] {
        if count > 0 {
            let path = write_list(&entries, pool_name, kind, output_path)?;
            debug!(pool = pool_name, file = %path.display(), count, "Wrote list file");
        }
    }

    Ok((whitelisted, blocked))
}

/// Export every pool; failures are logged and collected.
///
/// Returns [`PoolError::Snapshot`] naming the failed pools once every pool
/// has been attempted.
pub fn export_all<S: RangeSource + ?Sized>(source: &S, output_path: &Path) -> PoolResult<ExportSummary> {
    let mut summary = ExportSummary::default();
    let mut failed_pools = Vec::new();

    for pool_name in source.list_pool_names()? {
        match export_pool(source, &pool_name, output_path) {
            Ok((whitelisted, blocked)) => {
                summary.pools += 1;
                summary.whitelisted += whitelisted;
                summary.blocked += blocked;
            }
            Err(e) => {
                error!(pool = %pool_name, error = %e, "Failed to export pool");
                failed_pools.push(pool_name);
            }
        }
    }

    if !failed_pools.is_empty() {
        return Err(PoolError::Snapshot { failed_pools });
    }

    info!(
        output = %output_path.display(),
        pools = summary.pools,
        whitelisted = summary.whitelisted,
        blocked = summary.blocked,
        "Exported pools"
    );
    Ok(summary)
}

fn write_list(
    entries: &[PoolEntry],
    pool_name: &str,
    kind: ListKind,
    output_path: &Path,
) -> PoolResult<PathBuf> {
    let dir = output_path.join(kind.dir_name());
    fs::create_dir_all(&dir).map_err(|e| PoolError::io(&dir, e))?;

    let path = dir.join(format!("{}.{}", file_stem(pool_name), LIST_EXTENSION));
    let file = File::create(&path).map_err(|e| PoolError::io(&path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(render_list(entries, pool_name, kind).as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| PoolError::io(&path, e))?;

    Ok(path)
}

// Pool names become file names; keep them inside the output directory
fn file_stem(pool_name: &str) -> String {
    pool_name.replace(['/', '\\'], "_")
}
