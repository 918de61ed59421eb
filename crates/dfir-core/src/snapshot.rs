//! On-disk persistence for the case store (`.dfir/cases.json`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::config::DFIR_DIR;
use crate::model::case::CaseRecord;
use crate::store::CaseStore;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    #[serde(default)]
    cases: Vec<CaseRecord>,
}

#[must_use]
pub fn snapshot_path(project_root: &Path) -> PathBuf {
    project_root.join(DFIR_DIR).join("cases.json")
}

/// Read every record from `path`. A missing file is an empty store.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON, or was
/// written by a newer format version.
pub fn read_snapshot(path: &Path) -> Result<Vec<CaseRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("read snapshot {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let file: SnapshotFile = serde_json::from_str(&content)
        .with_context(|| format!("parse snapshot {}", path.display()))?;
    if file.version > SNAPSHOT_VERSION {
        bail!(
            "snapshot {} has version {}, this build reads up to {SNAPSHOT_VERSION}",
            path.display(),
            file.version
        );
    }
    Ok(file.cases)
}

/// Write `records` to `path`, replacing it atomically.
///
/// # Errors
///
/// Returns an error if serialization or file I/O fails.
pub fn write_snapshot(path: &Path, records: &[CaseRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create snapshot dir {}", parent.display()))?;
    }

    let file = SnapshotFile {
        version: SNAPSHOT_VERSION,
        cases: records.to_vec(),
    };
    let json = serde_json::to_string_pretty(&file).context("serialize snapshot")?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write snapshot {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replace snapshot {}", path.display()))?;

    tracing::debug!(path = %path.display(), count = records.len(), "snapshot written");
    Ok(())
}

/// Load the project's snapshot into `store`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any record fails its
/// integrity check.
pub fn load_into(store: &CaseStore, project_root: &Path) -> Result<usize> {
    let path = snapshot_path(project_root);
    let records = read_snapshot(&path)?;
    store
        .restore(records)
        .with_context(|| format!("restore cases from {}", path.display()))
}

/// Persist the full contents of `store` for the project.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be written.
pub fn save_from(store: &CaseStore, project_root: &Path) -> Result<()> {
    write_snapshot(&snapshot_path(project_root), &store.snapshot())
}
