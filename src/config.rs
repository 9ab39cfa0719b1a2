//! Configuration for qlvenv
//!
//! All configuration is read from environment variables or CLI arguments.
//! No global configuration file is used.
//!
//! Environment variable keys are centralized here for consistency.

use std::path::{Path, PathBuf};

/// Environment variable key constants.
/// Use these when reading/writing env vars to avoid typos and enable refactoring.
pub mod env_keys {
    pub const QLVENV_SCRIPTS_DIR: &str = "QLVENV_SCRIPTS_DIR";
    pub const QLVENV_REPO_DIR: &str = "QLVENV_REPO_DIR";
    pub const QLVENV_PIP_INDEX_URL: &str = "QLVENV_PIP_INDEX_URL";
    pub const QLVENV_LOG_LEVEL: &str = "QLVENV_LOG_LEVEL";
    pub const QLVENV_QUIET: &str = "QLVENV_QUIET";
}

/// Default working-copy root on a stock QingLong container.
pub const DEFAULT_SCRIPTS_DIR: &str = "/ql/data/scripts";
/// Default source-repository root on a stock QingLong container.
pub const DEFAULT_REPO_DIR: &str = "/ql/data/repo";
/// Default package index used for pip installs.
pub const DEFAULT_PIP_INDEX_URL: &str = "https://pypi.tuna.tsinghua.edu.cn/simple";

/// Manager paths and install settings.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Root directory holding one working copy per project.
    pub scripts_dir: PathBuf,
    /// Root directory holding the pulled repository copy per project.
    pub repo_dir: PathBuf,
    /// Package index URL passed to pip via `-i`.
    pub pip_index_url: String,
}

impl ManagerConfig {
    /// Load from environment variables, falling back to container defaults.
    pub fn from_env() -> Self {
        let scripts_dir = std::env::var(env_keys::QLVENV_SCRIPTS_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SCRIPTS_DIR));
        let repo_dir = std::env::var(env_keys::QLVENV_REPO_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_REPO_DIR));
        let pip_index_url = std::env::var(env_keys::QLVENV_PIP_INDEX_URL)
            .unwrap_or_else(|_| DEFAULT_PIP_INDEX_URL.to_string());
        Self {
            scripts_dir,
            repo_dir,
            pip_index_url,
        }
    }

    /// Apply CLI overrides on top of the environment-derived values.
    pub fn with_cli_overrides(
        mut self,
        scripts_dir: Option<String>,
        repo_dir: Option<String>,
    ) -> Self {
        if let Some(dir) = scripts_dir {
            self.scripts_dir = PathBuf::from(dir);
        }
        if let Some(dir) = repo_dir {
            self.repo_dir = PathBuf::from(dir);
        }
        self
    }

    /// Working copy of a project.
    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.scripts_dir.join(project)
    }

    /// Repository copy of a project.
    pub fn repo_project_dir(&self, project: &str) -> PathBuf {
        self.repo_dir.join(project)
    }
}

/// Build a config rooted at explicit directories. Used by tests and embedders.
impl ManagerConfig {
    pub fn rooted(scripts_dir: &Path, repo_dir: &Path) -> Self {
        Self {
            scripts_dir: scripts_dir.to_path_buf(),
            repo_dir: repo_dir.to_path_buf(),
            pip_index_url: DEFAULT_PIP_INDEX_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_take_precedence() {
        let cfg = ManagerConfig {
            scripts_dir: PathBuf::from("/a"),
            repo_dir: PathBuf::from("/b"),
            pip_index_url: DEFAULT_PIP_INDEX_URL.to_string(),
        }
        .with_cli_overrides(Some("/x".into()), None);
        assert_eq!(cfg.scripts_dir, PathBuf::from("/x"));
        assert_eq!(cfg.repo_dir, PathBuf::from("/b"));
    }

    #[test]
    fn test_project_paths() {
        let cfg = ManagerConfig::rooted(Path::new("/scripts"), Path::new("/repo"));
        assert_eq!(cfg.project_dir("demo"), PathBuf::from("/scripts/demo"));
        assert_eq!(cfg.repo_project_dir("demo"), PathBuf::from("/repo/demo"));
    }
}
