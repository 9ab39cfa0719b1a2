//! Dependency-manifest fingerprinting for change detection.
//!
//! A fingerprint maps each existing manifest file (checked in both the
//! working copy and the repository copy) to a SHA-256 digest of its content.
//! Any added, removed, or modified file counts as a change. The digest is
//! for change detection only, not security.

use crate::report::Reporter;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Manifest filenames that participate in the fingerprint, in check order.
pub const MANIFEST_CANDIDATES: [&str; 4] =
    ["requirements.txt", "pyproject.toml", "package.json", "Pipfile"];

/// Absolute manifest path → hex digest. BTreeMap keeps serialization stable.
pub type Fingerprint = BTreeMap<String, String>;

/// SHA-256 of a file's content as lowercase hex.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let content = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

/// Digest every manifest candidate that exists under either root.
/// A file that exists but cannot be read is logged and omitted.
pub fn collect(
    project_dir: &Path,
    repo_project_dir: &Path,
    reporter: &dyn Reporter,
) -> Fingerprint {
    let mut fingerprint = Fingerprint::new();
    for name in MANIFEST_CANDIDATES {
        for root in [project_dir, repo_project_dir] {
            let candidate = root.join(name);
            if !candidate.exists() {
                continue;
            }
            match hash_file(&candidate) {
                Ok(digest) => {
                    fingerprint.insert(candidate.display().to_string(), digest);
                }
                Err(e) => {
                    reporter.warning(&format!(
                        "could not hash {}: {}",
                        candidate.display(),
                        e
                    ));
                }
            }
        }
    }
    fingerprint
}

/// True iff the two fingerprints differ in any way.
pub fn changed(old: &Fingerprint, new: &Fingerprint) -> bool {
    old != new
}

/// How one manifest path differs between two fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Added,
    Removed,
    Modified,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Added => write!(f, "added"),
            Change::Removed => write!(f, "removed"),
            Change::Modified => write!(f, "modified"),
        }
    }
}

/// Per-path differences, sorted by path for deterministic logging.
pub fn diff(old: &Fingerprint, new: &Fingerprint) -> Vec<(String, Change)> {
    let mut changes = Vec::new();
    for (path, digest) in new {
        match old.get(path) {
            None => changes.push((path.clone(), Change::Added)),
            Some(prev) if prev != digest => changes.push((path.clone(), Change::Modified)),
            Some(_) => {}
        }
    }
    for path in old.keys() {
        if !new.contains_key(path) {
            changes.push((path.clone(), Change::Removed));
        }
    }
    changes.sort_by(|a, b| a.0.cmp(&b.0));
    changes
}
