use super::is_list_file;
use crate::codec::parse_list;
use crate::error::{PoolError, PoolResult};
use crate::store::{EntryStatus, RangeSink};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Outcome of importing one or more list directories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Files parsed to the end
    pub files: usize,
    /// Directive lines processed, dedup hits included
    pub directives: usize,
    /// Files that could not be read or stopped on a malformed line
    pub failed_files: Vec<PathBuf>,
}

impl ImportSummary {
    pub fn merge(&mut self, other: ImportSummary) {
        self.files += other.files;
        self.directives += other.directives;
        self.failed_files.extend(other.failed_files);
    }
}

/// Parse every `.conf` file in `dir` into `sink`, one pool per file stem.
///
/// Unreadable directories and files, and files with a malformed CIDR, are
/// logged and skipped. Storage failures are returned so that a surrounding
/// transaction can roll back.
pub fn import_directory<S: RangeSink + ?Sized>(
    sink: &S,
    dir: &Path,
    status: EntryStatus,
) -> PoolResult<ImportSummary> {
    let mut summary = ImportSummary::default();

    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Cannot read list directory");
            return Ok(summary);
        }
    };

    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_list_file(path))
        .collect();
    files.sort();

    for path in files {
        let Some(pool_name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            warn!(file = %path.display(), "Skipping list file with a non UTF-8 name");
            summary.failed_files.push(path);
            continue;
        };

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                error!(error = %PoolError::io(&path, e), "Failed to read list file");
                summary.failed_files.push(path);
                continue;
            }
        };

        match parse_list(sink, &text, &pool_name, status) {
            Ok(count) => {
                debug!(pool = %pool_name, file = %path.display(), count, "Imported list file");
                summary.files += 1;
                summary.directives += count;
            }
            Err(e) if e.is_invalid_input() => {
                error!(pool = %pool_name, file = %path.display(), error = %e, "Stopped list file at malformed line");
                summary.failed_files.push(path);
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        dir = %dir.display(),
        status = %status,
        files = summary.files,
        directives = summary.directives,
        failed = summary.failed_files.len(),
        "Imported list directory"
    );
    Ok(summary)
}
