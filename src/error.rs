//! Error taxonomy for manifest building and swap/restore runs.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a swap manifest.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid set code '{0}': expected 3-5 alphanumeric characters")]
    InvalidSetCode(String),

    #[error("card data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("no cards with alternate printings found for set '{0}'")]
    NoCardsFound(String),

    #[error("duplicate target path in manifest: {0}")]
    DuplicateTarget(String),

    #[error("manifest i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest JSON error: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors raised while swapping or restoring installation files.
///
/// `InstallationNotFound` and `BackupUnavailable` are fatal and abort the
/// whole operation. The remaining variants are per-record failures that get
/// collected into the operation report without stopping the batch.
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("game installation not found; pass --install-path to point at it")]
    InstallationNotFound,

    #[error("backup store at {path} is unusable: {source}")]
    BackupUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("target file not found: {0}")]
    TargetNotFound(PathBuf),

    #[error("backup write failed for {path}: {source}")]
    BackupWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("write permission denied: {0}")]
    WritePermissionDenied(PathBuf),

    #[error("payload unreadable: {path}: {source}")]
    PayloadUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("field '{field}' not found in {path}")]
    FieldNotFound { field: String, path: PathBuf },

    #[error("invalid target path '{0}': path traversal not allowed")]
    InvalidTargetPath(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
