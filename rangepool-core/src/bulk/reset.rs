use super::export::{export_all, ExportSummary};
use super::import::{import_directory, ImportSummary};
use super::is_list_file;
use crate::codec::ListKind;
use crate::error::{PoolError, PoolResult};
use crate::store::RangeStore;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What a [`reset`] did
#[derive(Debug, Clone)]
pub struct ResetSummary {
    /// `backup_path/<timestamp>` holding `lists/` and `store/`
    pub backup_dir: PathBuf,
    pub files_backed_up: usize,
    pub snapshot: ExportSummary,
    pub imported: ImportSummary,
}

/// `base/<YYYYMMDD_HHMMSS>` for the current local time
pub fn timestamped_dir(base: &Path) -> PathBuf {
    base.join(Local::now().format("%Y%m%d_%H%M%S").to_string())
}

/// Copy the `.conf` files of `lists_path/{whitelists,blocklists}` into
/// `dest/{whitelists,blocklists}`.
///
/// Both source subdirectories must be readable; an empty one is fine. Any
/// failure to read a source, create a destination or copy a file is
/// returned.
pub fn backup_lists(lists_path: &Path, dest: &Path) -> PoolResult<usize> {
    let mut copied = 0;

    for kind in ListKind::ALL {
        let source_dir = lists_path.join(kind.dir_name());
        let target_dir = dest.join(kind.dir_name());
        fs::create_dir_all(&target_dir).map_err(|e| PoolError::io(&target_dir, e))?;

        let read_dir = fs::read_dir(&source_dir).map_err(|e| {
            warn!(dir = %source_dir.display(), error = %e, "Cannot read lists to back up");
            PoolError::io(&source_dir, e)
        })?;

        for entry in read_dir {
            let path = entry.map_err(|e| PoolError::io(&source_dir, e))?.path();
            if !is_list_file(&path) {
                continue;
            }
            let Some(name) = path.file_name() else { continue };
            let target = target_dir.join(name);
            fs::copy(&path, &target).map_err(|e| PoolError::io(&target, e))?;
            copied += 1;
        }
    }

    debug!(from = %lists_path.display(), to = %dest.display(), copied, "Backed up list files");
    Ok(copied)
}

/// Rebuild the store from the list files on disk.
///
/// 1. copy the on-disk lists to `backup_path/<timestamp>/lists`
/// 2. export the store to `backup_path/<timestamp>/store`
/// 3. inside one exclusive transaction, clear the store and import
///    `lists_path/whitelists` as whitelisted and `lists_path/blocklists`
///    as blocked
///
/// A failure in (1) or (2) leaves the store untouched. A storage failure in
/// (3) rolls the store back to its previous contents.
pub fn reset(store: &RangeStore, backup_path: &Path, lists_path: &Path) -> PoolResult<ResetSummary> {
    let backup_dir = timestamped_dir(backup_path);
    info!(backup = %backup_dir.display(), lists = %lists_path.display(), "Resetting store");

    let files_backed_up = backup_lists(lists_path, &backup_dir.join("lists"))?;
    let snapshot = export_all(store, &backup_dir.join("store"))?;

    let imported = store.exclusive(|tx| {
        tx.clear()?;
        let mut imported = ImportSummary::default();
        for kind in ListKind::ALL {
            imported.merge(import_directory(
                tx,
                &lists_path.join(kind.dir_name()),
                kind.status(),
            )?);
        }
        Ok(imported)
    })?;

    info!(
        files = imported.files,
        directives = imported.directives,
        failed = imported.failed_files.len(),
        "Store rebuilt from lists"
    );

    Ok(ResetSummary {
        backup_dir,
        files_backed_up,
        snapshot,
        imported,
    })
}

/// Back up the on-disk lists, then overwrite them with the store's pools.
///
/// Returns the backup directory and the export totals.
pub fn publish_lists(
    store: &RangeStore,
    lists_path: &Path,
    backup_path: &Path,
) -> PoolResult<(PathBuf, ExportSummary)> {
    let backup_dir = timestamped_dir(backup_path);
    backup_lists(lists_path, &backup_dir.join("lists"))?;

    let summary = export_all(store, lists_path)?;
    info!(
        lists = %lists_path.display(),
        pools = summary.pools,
        "Lists published; reload the web server to apply them"
    );
    Ok((backup_dir, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::parse_ipv4;
    use crate::store::EntryStatus;
    use tempfile::tempdir;

    fn write_lists(root: &Path) {
        fs::create_dir_all(root.join("whitelists")).unwrap();
        fs::create_dir_all(root.join("blocklists")).unwrap();
        fs::write(root.join("whitelists/office.conf"), "Require ip 10.1.2.0/24 # desk\n").unwrap();
        fs::write(root.join("blocklists/abuse.conf"), "Require not ip 10.0.0.0/8\nRequire not ip 6.6.6.6\n").unwrap();
    }

    #[test]
    fn test_timestamped_dir_shape() {
        let dir = timestamped_dir(Path::new("/backups"));
        let stamp = dir.file_name().unwrap().to_str().unwrap();
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "_");
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_backup_lists_copies_conf_files() {
        let lists = tempdir().unwrap();
        let dest = tempdir().unwrap();
        write_lists(lists.path());
        fs::write(lists.path().join("whitelists/readme.md"), "skip me").unwrap();

        let copied = backup_lists(lists.path(), dest.path()).unwrap();
        assert_eq!(copied, 2);
        assert!(dest.path().join("whitelists/office.conf").exists());
        assert!(dest.path().join("blocklists/abuse.conf").exists());
        assert!(!dest.path().join("whitelists/readme.md").exists());
    }

    #[test]
    fn test_reset_rebuilds_from_lists() {
        let lists = tempdir().unwrap();
        let backups = tempdir().unwrap();
        write_lists(lists.path());

        let store = RangeStore::memory().unwrap();
        store.insert("1.1.1.1", "stale", "old", EntryStatus::Blocked).unwrap();

        let summary = reset(&store, backups.path(), lists.path()).unwrap();
        assert_eq!(summary.files_backed_up, 2);
        assert_eq!(summary.snapshot.pools, 1);
        assert_eq!(summary.imported.files, 2);
        assert_eq!(summary.imported.directives, 3);

        // Previous contents went to the snapshot, not the store
        assert!(summary.backup_dir.join("store/blocklists/stale.conf").exists());
        assert!(summary.backup_dir.join("lists/whitelists/office.conf").exists());
        assert_eq!(store.list_pool_names().unwrap(), vec!["abuse", "office"]);

        let hit = store.find_containing(parse_ipv4("10.1.2.5").unwrap()).unwrap().unwrap();
        assert_eq!(hit.pool_name, "office");
        assert_eq!(hit.status, EntryStatus::Whitelisted);

        let hit = store.find_containing(parse_ipv4("10.2.0.0").unwrap()).unwrap().unwrap();
        assert_eq!(hit.cidr, "10.0.0.0/8");
        assert_eq!(hit.status, EntryStatus::Blocked);
    }

    #[test]
    fn test_reset_aborts_when_backup_fails() {
        let lists = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        write_lists(lists.path());

        // Backups cannot be created below a regular file
        let backup_path = scratch.path().join("backups");
        fs::write(&backup_path, "in the way").unwrap();

        let store = RangeStore::memory().unwrap();
        store.insert("1.1.1.1", "stale", "old", EntryStatus::Blocked).unwrap();
        let before = store.list_by_pool("stale").unwrap();

        let err = reset(&store, &backup_path, lists.path()).unwrap_err();
        assert!(matches!(err, PoolError::Io { .. }));

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.list_by_pool("stale").unwrap(), before);
        assert_eq!(store.list_pool_names().unwrap(), vec!["stale"]);
    }

    #[test]
    fn test_backup_lists_accepts_empty_layout() {
        let lists = tempdir().unwrap();
        let dest = tempdir().unwrap();
        fs::create_dir_all(lists.path().join("whitelists")).unwrap();
        fs::create_dir_all(lists.path().join("blocklists")).unwrap();

        assert_eq!(backup_lists(lists.path(), dest.path()).unwrap(), 0);
    }

    #[test]
    fn test_reset_aborts_when_list_dir_missing() {
        let lists = tempdir().unwrap();
        let backups = tempdir().unwrap();
        fs::create_dir_all(lists.path().join("blocklists")).unwrap();

        let store = RangeStore::memory().unwrap();
        store.insert("10.0.0.0/8", "corp", "", EntryStatus::Blocked).unwrap();
        store.insert("192.168.0.0/16", "home", "", EntryStatus::Whitelisted).unwrap();

        let err = reset(&store, backups.path(), lists.path()).unwrap_err();
        assert!(matches!(err, PoolError::Io { .. }));
        assert_eq!(store.count().unwrap(), 2);

        // A mistyped list root is missing both directories
        let err = reset(&store, backups.path(), &lists.path().join("typo")).unwrap_err();
        assert!(matches!(err, PoolError::Io { .. }));
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_publish_aborts_when_list_dir_missing() {
        let lists = tempdir().unwrap();
        let backups = tempdir().unwrap();

        let store = RangeStore::memory().unwrap();
        store.insert("192.0.2.0/24", "office", "", EntryStatus::Whitelisted).unwrap();

        assert!(publish_lists(&store, lists.path(), backups.path()).is_err());
        assert!(!lists.path().join("whitelists/office.conf").exists());
    }

    #[test]
    fn test_publish_overwrites_lists() {
        let lists = tempdir().unwrap();
        let backups = tempdir().unwrap();
        write_lists(lists.path());

        let store = RangeStore::memory().unwrap();
        store.insert("192.0.2.0/24", "office", "moved", EntryStatus::Whitelisted).unwrap();

        let (backup_dir, summary) = publish_lists(&store, lists.path(), backups.path()).unwrap();
        assert_eq!(summary.pools, 1);

        let original = fs::read_to_string(backup_dir.join("lists/whitelists/office.conf")).unwrap();
        assert!(original.contains("10.1.2.0/24"));

        let published = fs::read_to_string(lists.path().join("whitelists/office.conf")).unwrap();
        assert!(published.contains("Require ip 192.0.2.0/24 # moved"));
        assert!(!published.contains("10.1.2.0/24"));
    }
}
