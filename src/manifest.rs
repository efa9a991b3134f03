//! Swap manifest model, validation, persistence and the manifest builder.
//!
//! The manifest is the handoff between generation and apply: it is written
//! to a well-known file in the app data directory and consumed by a later,
//! possibly separate, invocation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;

use crate::error::BuildError;
use crate::paths::{PATH_ART, PATH_MANIFEST};
use crate::scryfall;

static SET_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9]{3,5}$").unwrap());

/// How a single target file gets its replacement content.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SwapKind {
    /// Overwrite the whole file with the referenced payload's bytes.
    /// The payload path is relative to the app data directory.
    FullFileReplace { payload: PathBuf },
    /// Rewrite one `field=value` line inside a text asset.
    FieldPatch { field: String, value: String },
}

/// One file substitution instruction.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SwapRecord {
    /// Path of the asset to modify, relative to the installation root.
    pub target_path: String,
    /// Opaque identifier of where the replacement came from, e.g. "om1/42".
    pub source: String,
    #[serde(flatten)]
    pub kind: SwapKind,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Manifest {
    pub source_set: String,
    pub target_set: String,
    pub generated_at: u64,
    pub swaps: Vec<SwapRecord>,
}

impl Manifest {
    /// Reject manifests with duplicate target paths.
    pub fn validate(&self) -> Result<(), BuildError> {
        let mut seen = HashSet::new();
        for record in &self.swaps {
            if !seen.insert(record.target_path.as_str()) {
                return Err(BuildError::DuplicateTarget(record.target_path.clone()));
            }
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), BuildError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Manifest, BuildError> {
        let file = File::open(path)?;
        let manifest: Manifest = serde_json::from_reader(BufReader::new(file))?;
        manifest.validate()?;
        Ok(manifest)
    }
}

/// Check and case-fold a set code.
pub fn validate_set_code(code: &str) -> Result<String, BuildError> {
    let code = code.trim().to_ascii_lowercase();
    if SET_CODE_RE.is_match(&code) {
        Ok(code)
    } else {
        Err(BuildError::InvalidSetCode(code))
    }
}

/// Build and persist a swap manifest for one set.
///
/// Queries the card data source for every card in the set carrying an
/// alternate printed name, downloads the replacement art into the app data
/// directory, and writes the manifest to its well-known location so a later
/// apply run can pick it up.
pub fn build_manifest(set_code: &str) -> Result<Manifest, BuildError> {
    let set_code = validate_set_code(set_code)?;

    println!("[manifest] Fetching card data for set '{}'...", set_code);
    let mut cards = scryfall::set_cards(&set_code)?;
    cards.retain(|c| c.printed_name.is_some());
    if cards.is_empty() {
        return Err(BuildError::NoCardsFound(set_code));
    }
    cards.sort_by(|a, b| a.name.cmp(&b.name));

    let art_dir = PATH_ART.join(&set_code);
    std::fs::create_dir_all(&art_dir)?;

    let mut swaps = Vec::new();
    for card in cards {
        let Some(printed_name) = card.printed_name else {
            continue;
        };
        let stem = format!("{}_{:0>3}", set_code, card.collector_number);
        let source = format!("{}/{}", set_code, card.collector_number);

        if let Some(url) = &card.art_url {
            let file_name = format!("{}.jpg", card.collector_number);
            let payload = PathBuf::from("art").join(&set_code).join(&file_name);
            match scryfall::download_art(url, &art_dir.join(&file_name)) {
                Ok(()) => swaps.push(SwapRecord {
                    target_path: format!("cards/{}.art", stem),
                    source: source.clone(),
                    kind: SwapKind::FullFileReplace { payload },
                }),
                Err(e) => eprintln!("[manifest] Skipping art for '{}': {}", card.name, e),
            }
        }

        swaps.push(SwapRecord {
            target_path: format!("cards/{}.card", stem),
            source,
            kind: SwapKind::FieldPatch {
                field: "name".to_string(),
                value: printed_name,
            },
        });
    }

    let manifest = Manifest {
        source_set: set_code.clone(),
        target_set: set_code,
        generated_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
        swaps,
    };

    manifest.validate()?;
    manifest.save(&PATH_MANIFEST)?;
    println!(
        "[manifest] Wrote {} with {} entries.",
        PATH_MANIFEST.display(),
        manifest.swaps.len()
    );
    Ok(manifest)
}
