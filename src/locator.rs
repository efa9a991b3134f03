//! Game installation path resolution
//!
//! Probes the known install locations for the game client and validates
//! them by the presence of the platform data directory.

use std::path::{Path, PathBuf};

use crate::error::SwapError;
use crate::paths::PATH_HOME;

/// Validated root of the installation's asset tree.
///
/// All manifest target paths resolve against this directory.
#[derive(Debug, Clone)]
pub struct InstallRoot(PathBuf);

impl InstallRoot {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Data directory names, per platform layout.
const DATA_DIRS: [&str; 2] = ["MTGA_Data", "Contents/Resources/Data"];

fn candidate_roots() -> Vec<PathBuf> {
    let home = &*PATH_HOME;
    vec![
        // Windows
        PathBuf::from("C:/Program Files/Wizards of the Coast/MTGA"),
        PathBuf::from("C:/Program Files (x86)/Wizards of the Coast/MTGA"),
        home.join("AppData/Local/Wizards of the Coast/MTGA"),
        PathBuf::from("C:/Program Files/Epic Games/MagicTheGathering"),
        // macOS
        PathBuf::from("/Applications/MTGA.app"),
        home.join("Library/Application Support/com.wizards.mtga"),
        home.join("Applications/MTGA.app"),
        PathBuf::from("/Applications/Epic Games/MagicTheGathering/MTGA.app"),
    ]
}

fn data_dir_of(root: &Path) -> Option<PathBuf> {
    DATA_DIRS
        .iter()
        .map(|d| root.join(d))
        .find(|p| p.is_dir())
}

/// Find the installation to operate on.
///
/// A hint always wins: it is accepted when it, or its platform data
/// subdirectory, exists. Without a hint the standard install locations
/// are probed in order.
pub fn locate(hint: Option<&Path>) -> Result<InstallRoot, SwapError> {
    if let Some(hint) = hint {
        if let Some(data) = data_dir_of(hint) {
            return Ok(InstallRoot(data));
        }
        if hint.is_dir() {
            return Ok(InstallRoot(hint.to_path_buf()));
        }
        return Err(SwapError::InstallationNotFound);
    }

    println!("[locator] Searching for game installation...");
    for root in candidate_roots() {
        if let Some(data) = data_dir_of(&root) {
            println!("[locator] Installation found at: {}", root.display());
            return Ok(InstallRoot(data));
        }
    }
    Err(SwapError::InstallationNotFound)
}
