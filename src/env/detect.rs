//! Project-type detection by manifest-file presence.

use std::path::{Path, PathBuf};

/// Files whose presence marks a Python project.
pub const PYTHON_MANIFESTS: [&str; 5] = [
    "requirements.txt",
    "pyproject.toml",
    "setup.py",
    "Pipfile",
    "poetry.lock",
];

/// Files whose presence marks a Node.js project.
pub const NODEJS_MANIFESTS: [&str; 3] = ["package.json", "yarn.lock", "pnpm-lock.yaml"];

/// What kind(s) of project a directory pair holds, with the manifests found.
#[derive(Debug, Default)]
pub struct ProjectKind {
    pub python_manifests: Vec<PathBuf>,
    pub nodejs_manifests: Vec<PathBuf>,
}

impl ProjectKind {
    /// Detect over the repository copy first, then the working copy, so a
    /// project without a pulled repo mirror is still recognized.
    pub fn detect(project_dir: &Path, repo_project_dir: &Path) -> Self {
        let mut kind = Self::default();
        for root in [repo_project_dir, project_dir] {
            for name in PYTHON_MANIFESTS {
                let candidate = root.join(name);
                if candidate.is_file() && !kind.python_manifests.contains(&candidate) {
                    kind.python_manifests.push(candidate);
                }
            }
            for name in NODEJS_MANIFESTS {
                let candidate = root.join(name);
                if candidate.is_file() && !kind.nodejs_manifests.contains(&candidate) {
                    kind.nodejs_manifests.push(candidate);
                }
            }
        }
        kind
    }

    pub fn has_python(&self) -> bool {
        !self.python_manifests.is_empty()
    }

    pub fn has_nodejs(&self) -> bool {
        !self.nodejs_manifests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_detects_python_from_repo_copy() {
        let scripts = tempfile::tempdir().unwrap();
        let repo = tempfile::tempdir().unwrap();
        fs::write(repo.path().join("requirements.txt"), "requests\n").unwrap();

        let kind = ProjectKind::detect(scripts.path(), repo.path());
        assert!(kind.has_python());
        assert!(!kind.has_nodejs());
        assert_eq!(kind.python_manifests.len(), 1);
    }

    #[test]
    fn test_detects_node_from_working_copy_without_repo() {
        let scripts = tempfile::tempdir().unwrap();
        fs::write(scripts.path().join("package.json"), "{}\n").unwrap();

        let kind = ProjectKind::detect(scripts.path(), Path::new("/nonexistent/repo"));
        assert!(kind.has_nodejs());
        assert!(!kind.has_python());
    }

    #[test]
    fn test_mixed_project_detects_both() {
        let scripts = tempfile::tempdir().unwrap();
        let repo = tempfile::tempdir().unwrap();
        fs::write(repo.path().join("pyproject.toml"), "[project]\n").unwrap();
        fs::write(repo.path().join("yarn.lock"), "\n").unwrap();

        let kind = ProjectKind::detect(scripts.path(), repo.path());
        assert!(kind.has_python());
        assert!(kind.has_nodejs());
    }

    #[test]
    fn test_same_manifest_in_both_roots_listed_once_per_root() {
        let scripts = tempfile::tempdir().unwrap();
        let repo = tempfile::tempdir().unwrap();
        fs::write(scripts.path().join("package.json"), "{}\n").unwrap();
        fs::write(repo.path().join("package.json"), "{}\n").unwrap();

        let kind = ProjectKind::detect(scripts.path(), repo.path());
        // Distinct paths, so both appear; repo copy first.
        assert_eq!(kind.nodejs_manifests.len(), 2);
        assert!(kind.nodejs_manifests[0].starts_with(repo.path()));
    }
}
