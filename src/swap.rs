//! Swap engine
//!
//! Applies a manifest's substitutions to live installation files. Every
//! target is snapshotted into the backup store before its first
//! modification; the snapshot is never overwritten, so layering any number
//! of manifests on the same files keeps a full restore possible.

use std::fs;
use std::path::Path;

use crate::backup::BackupStore;
use crate::error::SwapError;
use crate::locator::InstallRoot;
use crate::manifest::{Manifest, SwapKind, SwapRecord};

/// Outcome of one manifest record.
#[derive(Debug)]
pub struct RecordOutcome {
    pub target_path: String,
    pub source: String,
    pub result: Result<(), SwapError>,
}

#[derive(Debug, Default)]
pub struct ApplyReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl ApplyReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn print_summary(&self) {
        println!(
            "[swap] {} succeeded, {} failed.",
            self.succeeded(),
            self.failed()
        );
        for outcome in &self.outcomes {
            if let Err(e) = &outcome.result {
                println!("[swap]   {} ({}): {}", outcome.target_path, outcome.source, e);
            }
        }
    }
}

/// Apply every record of `manifest` against the installation, in manifest
/// order.
///
/// Individual record failures (missing target, unreadable payload, denied
/// write) are collected into the report and never abort the batch. A
/// missing installation root or an invalid manifest aborts before any
/// record is touched. `payload_root` is the directory payload references
/// resolve against.
pub fn apply(
    manifest: &Manifest,
    install: &InstallRoot,
    store: &BackupStore,
    payload_root: &Path,
) -> Result<ApplyReport, SwapError> {
    if !install.path().is_dir() {
        return Err(SwapError::InstallationNotFound);
    }
    manifest
        .validate()
        .map_err(|e| SwapError::InvalidManifest(e.to_string()))?;

    let mut report = ApplyReport::default();
    for record in &manifest.swaps {
        let result = apply_record(record, install, store, payload_root);
        report.outcomes.push(RecordOutcome {
            target_path: record.target_path.clone(),
            source: record.source.clone(),
            result,
        });
    }
    Ok(report)
}

fn apply_record(
    record: &SwapRecord,
    install: &InstallRoot,
    store: &BackupStore,
    payload_root: &Path,
) -> Result<(), SwapError> {
    let key = BackupStore::normalize_key(&record.target_path)?;
    let target = install.path().join(&key);
    if !target.is_file() {
        return Err(SwapError::TargetNotFound(target));
    }

    // Pristine snapshot before the first write, never after.
    store.preserve(&key, &target)?;

    match &record.kind {
        SwapKind::FullFileReplace { payload } => {
            let payload_path = payload_root.join(payload);
            let bytes = fs::read(&payload_path).map_err(|source| SwapError::PayloadUnreadable {
                path: payload_path.clone(),
                source,
            })?;
            write_target(&target, &bytes)
        }
        SwapKind::FieldPatch { field, value } => {
            let content = fs::read_to_string(&target)?;
            let patched =
                patch_field(&content, field, value).ok_or_else(|| SwapError::FieldNotFound {
                    field: field.clone(),
                    path: target.clone(),
                })?;
            write_target(&target, patched.as_bytes())
        }
    }
}

fn write_target(target: &Path, bytes: &[u8]) -> Result<(), SwapError> {
    match fs::write(target, bytes) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(SwapError::WritePermissionDenied(target.to_path_buf()))
        }
        Err(e) => Err(SwapError::Io(e)),
    }
}

/// Rewrite the value of one `field=value` line, preserving indentation and
/// the spacing style around `=`. Returns None when the field is absent.
fn patch_field(content: &str, field: &str, value: &str) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut found = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(eq_pos) = trimmed.find('=') {
            let line_key = trimmed[..eq_pos].trim();
            if line_key == field {
                let indent: String = line
                    .chars()
                    .take(line.len() - line.trim_start().len())
                    .collect();
                if trimmed.contains(" = ") {
                    lines.push(format!("{}{} = {}", indent, field, value));
                } else {
                    lines.push(format!("{}{}={}", indent, field, value));
                }
                found = true;
                continue;
            }
        }
        lines.push(line.to_string());
    }

    if !found {
        return None;
    }
    let mut patched = lines.join("\n");
    if content.ends_with('\n') {
        patched.push('\n');
    }
    Some(patched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator;
    use std::path::PathBuf;

    fn full_record(target: &str, payload: &str) -> SwapRecord {
        SwapRecord {
            target_path: target.to_string(),
            source: "om1/42".to_string(),
            kind: SwapKind::FullFileReplace {
                payload: PathBuf::from(payload),
            },
        }
    }

    fn patch_record(target: &str, field: &str, value: &str) -> SwapRecord {
        SwapRecord {
            target_path: target.to_string(),
            source: "om1/42".to_string(),
            kind: SwapKind::FieldPatch {
                field: field.to_string(),
                value: value.to_string(),
            },
        }
    }

    fn manifest_of(swaps: Vec<SwapRecord>) -> Manifest {
        Manifest {
            source_set: "om1".to_string(),
            target_set: "om1".to_string(),
            generated_at: 0,
            swaps,
        }
    }

    fn setup() -> (tempfile::TempDir, InstallRoot, BackupStore) {
        let tmp = tempfile::tempdir().unwrap();
        let install_dir = tmp.path().join("install");
        fs::create_dir_all(install_dir.join("cards")).unwrap();
        let install = locator::locate(Some(&install_dir)).unwrap();
        let store = BackupStore::open(&tmp.path().join("backups")).unwrap();
        (tmp, install, store)
    }

    #[test]
    fn full_replace_writes_payload_and_backs_up_original() {
        let (tmp, install, store) = setup();
        let target = install.path().join("cards/om1_042.art");
        fs::write(&target, b"AAAA").unwrap();
        fs::write(tmp.path().join("b.jpg"), b"BBBB").unwrap();

        let manifest = manifest_of(vec![full_record("cards/om1_042.art", "b.jpg")]);
        let report = apply(&manifest, &install, &store, tmp.path()).unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.outcomes[0].source, "om1/42");
        assert_eq!(fs::read(&target).unwrap(), b"BBBB");
        assert_eq!(
            store.read(&PathBuf::from("cards/om1_042.art")).unwrap(),
            b"AAAA"
        );
    }

    #[test]
    fn layered_applies_keep_the_first_backup() {
        let (tmp, install, store) = setup();
        let target = install.path().join("cards/om1_042.art");
        fs::write(&target, b"AAAA").unwrap();
        fs::write(tmp.path().join("b.jpg"), b"BBBB").unwrap();
        fs::write(tmp.path().join("c.jpg"), b"CCCC").unwrap();

        let first = manifest_of(vec![full_record("cards/om1_042.art", "b.jpg")]);
        let second = manifest_of(vec![full_record("cards/om1_042.art", "c.jpg")]);

        apply(&first, &install, &store, tmp.path()).unwrap();
        apply(&second, &install, &store, tmp.path()).unwrap();

        // Live file holds the latest swap, backup still holds the pristine
        // pre-first-apply bytes.
        assert_eq!(fs::read(&target).unwrap(), b"CCCC");
        assert_eq!(
            store.read(&PathBuf::from("cards/om1_042.art")).unwrap(),
            b"AAAA"
        );
    }

    #[test]
    fn missing_target_is_a_per_record_failure() {
        let (tmp, install, store) = setup();
        fs::write(install.path().join("cards/a.art"), b"a").unwrap();
        fs::write(install.path().join("cards/c.art"), b"c").unwrap();
        fs::write(tmp.path().join("new.jpg"), b"new").unwrap();

        let manifest = manifest_of(vec![
            full_record("cards/a.art", "new.jpg"),
            full_record("cards/missing.art", "new.jpg"),
            full_record("cards/c.art", "new.jpg"),
        ]);
        let report = apply(&manifest, &install, &store, tmp.path()).unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.outcomes[1].result,
            Err(SwapError::TargetNotFound(_))
        ));

        // Backups exist only for the records that went through.
        assert_eq!(
            store.entries(),
            vec![PathBuf::from("cards/a.art"), PathBuf::from("cards/c.art")]
        );
    }

    #[test]
    fn unreadable_payload_is_a_per_record_failure() {
        let (tmp, install, store) = setup();
        fs::write(install.path().join("cards/a.art"), b"a").unwrap();

        let manifest = manifest_of(vec![full_record("cards/a.art", "nonexistent.jpg")]);
        let report = apply(&manifest, &install, &store, tmp.path()).unwrap();

        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.outcomes[0].result,
            Err(SwapError::PayloadUnreadable { .. })
        ));
        // The target was left untouched.
        assert_eq!(fs::read(install.path().join("cards/a.art")).unwrap(), b"a");
    }

    #[test]
    fn duplicate_target_manifest_is_fatal() {
        let (tmp, install, store) = setup();
        let target = install.path().join("cards/a.art");
        fs::write(&target, b"AAAA").unwrap();
        fs::write(tmp.path().join("b.jpg"), b"BBBB").unwrap();

        let manifest = manifest_of(vec![
            full_record("cards/a.art", "b.jpg"),
            full_record("cards/a.art", "b.jpg"),
        ]);
        let result = apply(&manifest, &install, &store, tmp.path());

        assert!(matches!(result, Err(SwapError::InvalidManifest(_))));
        // Aborted before any record was touched.
        assert_eq!(fs::read(&target).unwrap(), b"AAAA");
        assert!(store.entries().is_empty());
    }

    #[test]
    fn missing_installation_root_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let install_dir = tmp.path().join("install");
        fs::create_dir_all(&install_dir).unwrap();
        let install = locator::locate(Some(&install_dir)).unwrap();
        let store = BackupStore::open(&tmp.path().join("backups")).unwrap();
        fs::remove_dir_all(&install_dir).unwrap();

        let manifest = manifest_of(vec![full_record("cards/a.art", "b.jpg")]);
        let result = apply(&manifest, &install, &store, tmp.path());
        assert!(matches!(result, Err(SwapError::InstallationNotFound)));
    }

    #[test]
    fn field_patch_rewrites_a_single_field() {
        let (tmp, install, store) = setup();
        let target = install.path().join("cards/om1_042.card");
        fs::write(&target, "name=Lightning Bolt\npower=3\n").unwrap();

        let manifest = manifest_of(vec![patch_record(
            "cards/om1_042.card",
            "name",
            "Bolt of Lightning",
        )]);
        let report = apply(&manifest, &install, &store, tmp.path()).unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "name=Bolt of Lightning\npower=3\n"
        );
    }

    #[test]
    fn field_patch_fails_when_field_absent() {
        let (tmp, install, store) = setup();
        let target = install.path().join("cards/om1_042.card");
        fs::write(&target, "power=3\n").unwrap();

        let manifest = manifest_of(vec![patch_record("cards/om1_042.card", "name", "X")]);
        let report = apply(&manifest, &install, &store, tmp.path()).unwrap();

        assert!(matches!(
            report.outcomes[0].result,
            Err(SwapError::FieldNotFound { .. })
        ));
        assert_eq!(fs::read_to_string(&target).unwrap(), "power=3\n");
    }

    #[test]
    fn patch_field_preserves_spacing_and_indent() {
        let content = "  name = Old Name\nrarity=rare";
        let patched = patch_field(content, "name", "New Name").unwrap();
        assert!(patched.contains("  name = New Name"));
        assert!(patched.contains("rarity=rare"));

        assert!(patch_field(content, "missing", "x").is_none());
    }

    #[test]
    fn patch_field_keeps_trailing_newline() {
        let patched = patch_field("name=Old\n", "name", "New").unwrap();
        assert_eq!(patched, "name=New\n");

        let patched = patch_field("name=Old", "name", "New").unwrap();
        assert_eq!(patched, "name=New");
    }
}
