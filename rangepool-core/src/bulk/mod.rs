//! Directory-level operations over list files
//!
//! Importing a tree of `.conf` files, exporting pools back to disk, and the
//! backup-then-rebuild reset cycle.

mod export;
mod import;
mod reset;

pub use export::{export_all, export_pool, ExportSummary};
pub use import::{import_directory, ImportSummary};
pub use reset::{backup_lists, publish_lists, reset, timestamped_dir, ResetSummary};

use std::path::Path;

/// File extension of list files
pub const LIST_EXTENSION: &str = "conf";

pub(crate) fn is_list_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == LIST_EXTENSION)
}
