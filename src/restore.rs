//! Restore engine
//!
//! Copies the pristine backups back over the live installation files,
//! reversing everything the swap engine did.

use std::fs;
use std::path::{Path, PathBuf};

use crate::backup::BackupStore;
use crate::error::SwapError;
use crate::locator::InstallRoot;

#[derive(Debug, Default)]
pub struct RestoreReport {
    pub restored: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, SwapError)>,
}

impl RestoreReport {
    pub fn print_summary(&self) {
        if self.restored.is_empty() && self.failures.is_empty() {
            println!("[restore] No backups found. Nothing to restore.");
            return;
        }
        println!(
            "[restore] {} restored, {} failed.",
            self.restored.len(),
            self.failures.len()
        );
        for (path, e) in &self.failures {
            println!("[restore]   {}: {}", path.display(), e);
        }
    }
}

/// Copy every backed-up file back to its original location.
///
/// Successfully restored entries are removed from the store, which re-arms
/// the first-write-wins snapshot rule for the next swap session. Entries
/// that fail to restore stay in the store and are reported; they never halt
/// the remaining restores. Running this twice is a no-op the second time.
pub fn restore_all(install: &InstallRoot, store: &BackupStore) -> Result<RestoreReport, SwapError> {
    if !install.path().is_dir() {
        return Err(SwapError::InstallationNotFound);
    }

    let mut report = RestoreReport::default();
    for key in store.entries() {
        match restore_entry(&key, install, store) {
            Ok(()) => report.restored.push(key),
            Err(e) => report.failures.push((key, e)),
        }
    }
    Ok(report)
}

fn restore_entry(key: &Path, install: &InstallRoot, store: &BackupStore) -> Result<(), SwapError> {
    let target = install.path().join(key);
    match fs::copy(store.root().join(key), &target) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(SwapError::WritePermissionDenied(target));
        }
        Err(e) => return Err(SwapError::Io(e)),
    }
    store.consume(key)?;
    Ok(())
}
