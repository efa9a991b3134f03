//! Backup store
//!
//! Keeps a pristine copy of every installation file touched by a swap,
//! mirrored under one directory by the file's relative path. The store is
//! the only reader and writer of that directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SwapError;

pub struct BackupStore {
    root: PathBuf,
}

impl BackupStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    /// An unwritable root is fatal to the whole operation.
    pub fn open(root: &Path) -> Result<Self, SwapError> {
        fs::create_dir_all(root).map_err(|source| SwapError::BackupUnavailable {
            path: root.to_path_buf(),
            source,
        })?;

        // Probe writability so an unusable store aborts the run up front
        // instead of failing every record.
        let sentinel = root.join(".write_test");
        fs::write(&sentinel, b"")
            .and_then(|()| fs::remove_file(&sentinel))
            .map_err(|source| SwapError::BackupUnavailable {
                path: root.to_path_buf(),
                source,
            })?;

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalize a manifest target path into a backup key.
    ///
    /// Backslashes become forward slashes, empty and `.` segments are
    /// dropped, and `..` segments are rejected outright. Case is preserved.
    pub fn normalize_key(target: &str) -> Result<PathBuf, SwapError> {
        let cleaned = target.replace('\\', "/");
        let mut parts = Vec::new();
        for part in cleaned.split('/') {
            match part {
                "" | "." => continue,
                ".." => return Err(SwapError::InvalidTargetPath(target.to_string())),
                p => parts.push(p),
            }
        }
        if parts.is_empty() {
            return Err(SwapError::InvalidTargetPath(target.to_string()));
        }
        Ok(parts.iter().collect())
    }

    fn entry_path(&self, key: &Path) -> PathBuf {
        self.root.join(key)
    }

    pub fn contains(&self, key: &Path) -> bool {
        self.entry_path(key).is_file()
    }

    /// Snapshot `original` under `key` unless a backup already exists.
    ///
    /// First write wins: the stored bytes always reflect the state before
    /// any swap touched the file, however many swaps are layered on top.
    /// Returns whether a new backup was written.
    pub fn preserve(&self, key: &Path, original: &Path) -> Result<bool, SwapError> {
        let dest = self.entry_path(key);
        if dest.is_file() {
            return Ok(false);
        }

        let copy = || -> std::io::Result<()> {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(original, &dest)?;
            Ok(())
        };
        copy().map_err(|source| SwapError::BackupWriteFailed {
            path: dest.clone(),
            source,
        })?;
        Ok(true)
    }

    /// Read the stored bytes for a key.
    pub fn read(&self, key: &Path) -> std::io::Result<Vec<u8>> {
        fs::read(self.entry_path(key))
    }

    /// All keys currently held by the store, sorted.
    pub fn entries(&self) -> Vec<PathBuf> {
        let walk = walkdir::WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false);

        let mut keys = Vec::new();
        for entry in walk.into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file()
                && let Ok(rel) = entry.path().strip_prefix(&self.root)
            {
                keys.push(rel.to_path_buf());
            }
        }
        keys.sort();
        keys
    }

    /// Drop a restored entry and prune now-empty directories above it.
    /// Re-arms the first-write-wins rule for the next swap session.
    pub fn consume(&self, key: &Path) -> std::io::Result<()> {
        let path = self.entry_path(key);
        fs::remove_file(&path)?;

        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == self.root || fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
        Ok(())
    }
}
