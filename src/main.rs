mod backup;
mod error;
mod locator;
mod manifest;
mod paths;
mod restore;
mod scryfall;
mod swap;

use std::path::{Path, PathBuf};

use crate::backup::BackupStore;
use crate::paths::{PATH_APP, PATH_BACKUPS, PATH_MANIFEST};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args.iter().any(|arg| arg == "--help") {
        println!("{}", USAGE_TEXT);
        return;
    }

    std::fs::create_dir_all(&*PATH_APP).expect("Failed to create app data directory");

    let install_hint = args
        .iter()
        .position(|arg| arg == "--install-path")
        .map(|i| match args.get(i + 1) {
            Some(path) => PathBuf::from(path),
            None => {
                eprintln!("{}", USAGE_TEXT);
                std::process::exit(1);
            }
        });

    if let Some(i) = args.iter().position(|arg| arg == "--generate") {
        let Some(set_code) = args.get(i + 1) else {
            eprintln!("{}", USAGE_TEXT);
            std::process::exit(1);
        };
        match manifest::build_manifest(set_code) {
            Ok(m) => println!(
                "[setswap] Generated manifest for '{}' with {} entries.",
                m.source_set,
                m.swaps.len()
            ),
            Err(e) => fatal(e),
        }
        return;
    }

    if args.iter().any(|arg| arg == "--apply") {
        run_apply(install_hint.as_deref());
        return;
    }

    if args.iter().any(|arg| arg == "--restore") {
        run_restore(install_hint.as_deref());
        return;
    }

    eprintln!("{}", USAGE_TEXT);
    std::process::exit(1);
}

fn run_apply(hint: Option<&Path>) {
    let install = match locator::locate(hint) {
        Ok(install) => install,
        Err(e) => fatal(e),
    };

    let manifest = match manifest::Manifest::load(&PATH_MANIFEST) {
        Ok(m) => m,
        Err(e) => {
            eprintln!(
                "[setswap] Could not load {}: {}",
                PATH_MANIFEST.display(),
                e
            );
            eprintln!("[setswap] Generate one first with --generate <set_code>.");
            std::process::exit(1);
        }
    };

    let store = match BackupStore::open(&PATH_BACKUPS) {
        Ok(store) => store,
        Err(e) => fatal(e),
    };

    println!(
        "[setswap] Applying {} swaps to {}",
        manifest.swaps.len(),
        install.path().display()
    );
    match swap::apply(&manifest, &install, &store, &PATH_APP) {
        Ok(report) => report.print_summary(),
        Err(e) => fatal(e),
    }
}

fn run_restore(hint: Option<&Path>) {
    let install = match locator::locate(hint) {
        Ok(install) => install,
        Err(e) => fatal(e),
    };

    let store = match BackupStore::open(&PATH_BACKUPS) {
        Ok(store) => store,
        Err(e) => fatal(e),
    };

    match restore::restore_all(&install, &store) {
        Ok(report) => report.print_summary(),
        Err(e) => fatal(e),
    }
}

fn fatal(e: impl std::fmt::Display) -> ! {
    eprintln!("[setswap] {}", e);
    std::process::exit(1);
}

static USAGE_TEXT: &str = r#"
Usage: setswap [OPTIONS]

Options:
    --generate <set_code>   Build swaps.json for the given set from the card data source
    --apply                 Apply the generated swaps to the installed game files
    --restore               Restore the original game files from backups
    --install-path <dir>    Use this installation directory instead of auto-detection
    --help                  Show this help text
"#;
