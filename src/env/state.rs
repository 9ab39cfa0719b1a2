//! Persisted per-project environment record.
//!
//! One `.venv_info.json` per project, co-located with the project files and
//! overwritten in place on every successful install. Readers tolerate missing
//! fields (every field defaults) so old tools can read records written by
//! newer ones. A corrupt record is treated as "no prior record", never a crash.

use crate::env::fingerprint::Fingerprint;
use crate::report::Reporter;
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Record file name inside the project's working copy.
pub const STATE_FILE_NAME: &str = ".venv_info.json";

/// Tag identifying the tool that wrote the record.
pub const MANAGER_TAG: &str = "qlvenv";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvRecord {
    pub project_name: String,
    pub project_dir: String,
    pub venv_dir: String,
    pub python_path: String,
    pub pip_path: String,
    pub python_version: String,
    pub package_count: usize,
    pub dependency_hashes: Fingerprint,
    pub created_at: String,
    pub last_updated: String,
    pub manager: String,
}

pub fn state_path(project_dir: &Path) -> PathBuf {
    project_dir.join(STATE_FILE_NAME)
}

/// Load the record for a project. Missing file is a silent `None`; an
/// unreadable or invalid file is logged and also `None`.
pub fn load(project_dir: &Path, reporter: &dyn Reporter) -> Option<EnvRecord> {
    let path = state_path(project_dir);
    if !path.exists() {
        return None;
    }
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            reporter.warning(&format!("could not read {}: {}", path.display(), e));
            return None;
        }
    };
    match serde_json::from_str::<EnvRecord>(&content) {
        Ok(record) => Some(record),
        Err(e) => {
            reporter.warning(&format!(
                "state file {} is corrupt, treating as absent: {}",
                path.display(),
                e
            ));
            None
        }
    }
}

/// Write the record, preserving `created_at` from any existing record and
/// refreshing `last_updated`.
pub fn store(project_dir: &Path, mut record: EnvRecord, reporter: &dyn Reporter) -> Result<()> {
    let path = state_path(project_dir);
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    record.created_at = load(project_dir, reporter)
        .map(|existing| existing.created_at)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| now.clone());
    record.last_updated = now;
    record.manager = MANAGER_TAG.to_string();

    let content = serde_json::to_string_pretty(&record)
        .context("serialize environment record")?;
    fs::write(&path, content)
        .with_context(|| format!("write state file {}", path.display()))?;
    reporter.debug(&format!("environment record saved: {}", path.display()));
    Ok(())
}
