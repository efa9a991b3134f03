use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;

pub static PATH_HOME: LazyLock<PathBuf> = LazyLock::new(|| {
    if let Ok(home) = env::var("HOME") {
        return PathBuf::from(home);
    }
    PathBuf::from(env::var("USERPROFILE").unwrap())
});

/// App data directory holding the manifest, downloaded art and backups.
pub static PATH_APP: LazyLock<PathBuf> = LazyLock::new(|| {
    if let Ok(xdg_data_home) = env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data_home).join("setswap");
    }
    if let Ok(local_app_data) = env::var("LOCALAPPDATA") {
        return PathBuf::from(local_app_data).join("setswap");
    }
    PATH_HOME.join(".local/share/setswap")
});

pub static PATH_MANIFEST: LazyLock<PathBuf> = LazyLock::new(|| PATH_APP.join("swaps.json"));

pub static PATH_BACKUPS: LazyLock<PathBuf> = LazyLock::new(|| PATH_APP.join("backups"));

pub static PATH_ART: LazyLock<PathBuf> = LazyLock::new(|| PATH_APP.join("art"));
