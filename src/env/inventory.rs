//! Inventory scan over the scripts root.
//!
//! Presence is decided by directory existence, not by record presence: an
//! environment directory with no record is "present but untracked". The scan
//! is presentation-only and never mutates state; record fields that are
//! missing render as an "unknown" sentinel instead of being omitted.

use crate::config::ManagerConfig;
use crate::env::state;
use crate::env::{venv_python, NODE_MODULES_DIR_NAME, VENV_DIR_NAME};
use crate::report::Reporter;
use crate::runner::CommandRunner;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sentinel for record fields that are absent.
pub const UNKNOWN: &str = "unknown";

/// Live health probe bound.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Health of one project's environments, computed fresh on every scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvStatus {
    /// Venv python answered the version probe.
    Healthy,
    /// Venv python exists but the probe failed or timed out.
    Broken,
    /// Venv directory exists but its python binary is missing.
    Corrupt,
    /// Only a Node.js dependency cache is present.
    NodeOnly,
    Unknown,
}

impl EnvStatus {
    pub fn label(self) -> &'static str {
        match self {
            EnvStatus::Healthy => "ok",
            EnvStatus::Broken => "broken",
            EnvStatus::Corrupt => "corrupt",
            EnvStatus::NodeOnly => "node-only",
            EnvStatus::Unknown => UNKNOWN,
        }
    }
}

/// Runtime view of one project directory. Never persisted.
#[derive(Debug, Clone)]
pub struct ProjectEnvironment {
    pub project_name: String,
    pub project_dir: PathBuf,
    pub has_python_env: bool,
    pub has_nodejs_env: bool,
    pub python_version: String,
    pub package_count: usize,
    pub created_at: String,
    pub status: EnvStatus,
}

/// Inspect a single project directory.
pub fn probe_project(
    project_dir: &Path,
    runner: &dyn CommandRunner,
    reporter: &dyn Reporter,
) -> ProjectEnvironment {
    let venv_dir = project_dir.join(VENV_DIR_NAME);
    let node_modules = project_dir.join(NODE_MODULES_DIR_NAME);

    let mut env = ProjectEnvironment {
        project_name: project_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        project_dir: project_dir.to_path_buf(),
        has_python_env: venv_dir.exists(),
        has_nodejs_env: node_modules.exists(),
        python_version: UNKNOWN.to_string(),
        package_count: 0,
        created_at: UNKNOWN.to_string(),
        status: EnvStatus::Unknown,
    };

    if let Some(record) = state::load(project_dir, reporter) {
        if !record.python_version.is_empty() {
            env.python_version = record.python_version;
        }
        env.package_count = record.package_count;
        if !record.created_at.is_empty() {
            env.created_at = record.created_at;
        }
    }

    if env.has_python_env {
        let python = venv_python(&venv_dir);
        if python.exists() {
            match runner.run(&python, &["--version".to_string()], None, PROBE_TIMEOUT) {
                Ok(out) if out.success() => {
                    env.status = EnvStatus::Healthy;
                    if env.python_version == UNKNOWN {
                        let text = if out.stdout.trim().is_empty() {
                            out.stderr
                        } else {
                            out.stdout
                        };
                        if !text.trim().is_empty() {
                            env.python_version = text.trim().to_string();
                        }
                    }
                }
                _ => env.status = EnvStatus::Broken,
            }
        } else {
            env.status = EnvStatus::Corrupt;
        }
    } else if env.has_nodejs_env {
        env.status = EnvStatus::NodeOnly;
    }

    env
}

/// Scan every immediate subdirectory of the scripts root and keep the ones
/// holding at least one environment, sorted by project name.
pub fn scan(
    cfg: &ManagerConfig,
    runner: &dyn CommandRunner,
    reporter: &dyn Reporter,
) -> Result<Vec<ProjectEnvironment>> {
    reporter.info("scanning project environments...");
    if !cfg.scripts_dir.is_dir() {
        reporter.error(&format!(
            "scripts directory does not exist: {}",
            cfg.scripts_dir.display()
        ));
        return Ok(Vec::new());
    }

    let mut environments = Vec::new();
    for entry in fs::read_dir(&cfg.scripts_dir)?.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let env = probe_project(&path, runner, reporter);
        if env.has_python_env || env.has_nodejs_env {
            environments.push(env);
        }
    }
    environments.sort_by(|a, b| a.project_name.cmp(&b.project_name));
    Ok(environments)
}
