//! Environment lifecycle controller.
//!
//! Orchestrates create/force-rebuild/remove for Python virtual environments
//! and Node.js dependency caches. Every create or reinstall decision is gated
//! by a freshness check: the current manifest fingerprint is recomputed from
//! disk and compared to the stored record; unchanged and unforced means no
//! install at all.
//!
//! Asymmetry by policy: on a fingerprint mismatch the Python path reinstalls
//! in place (`pip install --force-reinstall` into the retained venv) while
//! the Node.js path deletes `node_modules` wholesale before reinstalling.
//! Incremental npm installs over a stale tree are not trusted.

use crate::config::ManagerConfig;
use crate::env::detect::{ProjectKind, NODEJS_MANIFESTS, PYTHON_MANIFESTS};
use crate::env::fingerprint;
use crate::env::state::{self, EnvRecord};
use crate::env::{venv_pip, venv_python, NODE_MODULES_DIR_NAME, VENV_DIR_NAME};
use crate::report::Reporter;
use crate::runner::CommandRunner;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Venv creation bound.
const CREATE_TIMEOUT: Duration = Duration::from_secs(300);
/// Dependency install bound (pip or npm).
const INSTALL_TIMEOUT: Duration = Duration::from_secs(600);
/// Post-creation pip self-upgrade bound.
const PIP_UPGRADE_TIMEOUT: Duration = Duration::from_secs(120);
/// Version / package-list probe bound.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Per-download socket timeout handed to pip itself.
const PIP_SOCKET_TIMEOUT_SECS: &str = "300";

enum DepKind {
    Requirements,
    Pyproject,
    Pipfile,
}

pub struct EnvBuilder<'a> {
    cfg: &'a ManagerConfig,
    runner: &'a dyn CommandRunner,
    reporter: &'a dyn Reporter,
}

impl<'a> EnvBuilder<'a> {
    pub fn new(
        cfg: &'a ManagerConfig,
        runner: &'a dyn CommandRunner,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            cfg,
            runner,
            reporter,
        }
    }

    /// Detect the project type and create every applicable environment.
    /// Returns `Ok(false)` when any part failed; failures are logged, not
    /// propagated, so a Python failure still lets the Node.js half run.
    pub fn create(&self, project: &str, force: bool) -> Result<bool> {
        let project_dir = self.cfg.project_dir(project);
        let repo_dir = self.cfg.repo_project_dir(project);
        tracing::debug!(project, force, "environment create requested");

        self.reporter
            .info(&format!("creating environments for project {}", project));

        if !project_dir.is_dir() {
            self.reporter.error(&format!(
                "project directory does not exist: {}",
                project_dir.display()
            ));
            return Ok(false);
        }

        let kind = ProjectKind::detect(&project_dir, &repo_dir);
        if !kind.has_python() && !kind.has_nodejs() {
            self.reporter
                .warning("no Python or Node.js manifests detected");
            self.reporter
                .info(&format!("recognized Python manifests: {}", PYTHON_MANIFESTS.join(", ")));
            self.reporter
                .info(&format!("recognized Node.js manifests: {}", NODEJS_MANIFESTS.join(", ")));
            return Ok(false);
        }

        let mut success = true;

        if kind.has_python() {
            self.reporter.info("Python project detected");
            for manifest in &kind.python_manifests {
                self.reporter.info(&format!("  - {}", manifest.display()));
            }
            if let Err(e) = self.create_python_env(project, &project_dir, &repo_dir, force) {
                self.reporter
                    .error(&format!("Python environment creation failed: {:#}", e));
                success = false;
            }
        }

        if kind.has_nodejs() {
            self.reporter.info("Node.js project detected");
            for manifest in &kind.nodejs_manifests {
                self.reporter.info(&format!("  - {}", manifest.display()));
            }
            if let Err(e) = self.create_node_env(project, &project_dir, &repo_dir, force) {
                self.reporter
                    .error(&format!("Node.js environment creation failed: {:#}", e));
                success = false;
            }
        }

        if success {
            self.reporter
                .success(&format!("environments ready for project {}", project));
        } else {
            self.reporter.warning(&format!(
                "environment creation partially failed for project {}",
                project
            ));
        }
        Ok(success)
    }

    /// Freshness check: recompute the fingerprint from disk and compare to
    /// the stored record. No prior record means "changed".
    fn deps_changed(&self, project_dir: &Path, repo_dir: &Path) -> bool {
        let current = fingerprint::collect(project_dir, repo_dir, self.reporter);
        let Some(record) = state::load(project_dir, self.reporter) else {
            self.reporter
                .debug("no previous install record, treating dependencies as changed");
            return true;
        };
        if !fingerprint::changed(&record.dependency_hashes, &current) {
            return false;
        }
        self.reporter
            .info("dependency manifests changed since last install");
        for (path, change) in fingerprint::diff(&record.dependency_hashes, &current) {
            self.reporter.info(&format!("  {}: {}", change, path));
        }
        true
    }

    fn create_python_env(
        &self,
        project: &str,
        project_dir: &Path,
        repo_dir: &Path,
        force: bool,
    ) -> Result<()> {
        let venv_dir = project_dir.join(VENV_DIR_NAME);
        let venv_exists = venv_dir.exists();
        let changed = self.deps_changed(project_dir, repo_dir);

        if venv_exists && !force && !changed {
            self.reporter.info(&format!(
                "virtual environment up to date, dependencies unchanged: {}",
                venv_dir.display()
            ));
            return Ok(());
        }

        let mut fresh = !venv_exists;
        if venv_exists && force {
            self.reporter
                .warning("force rebuild requested, removing existing virtual environment");
            fs::remove_dir_all(&venv_dir)
                .with_context(|| format!("remove {}", venv_dir.display()))?;
            fresh = true;
        }

        if fresh {
            self.reporter.info("creating Python virtual environment...");
            let python3 = self.resolve_tool("python3");
            let out = self.runner.run(
                &python3,
                &[
                    "-m".to_string(),
                    "venv".to_string(),
                    venv_dir.display().to_string(),
                ],
                None,
                CREATE_TIMEOUT,
            )?;
            if !out.success() {
                if out.timed_out {
                    bail!(
                        "virtual environment creation timed out after {} seconds",
                        CREATE_TIMEOUT.as_secs()
                    );
                }
                bail!(
                    "virtual environment creation failed: {}",
                    out.stderr.trim()
                );
            }
            self.reporter.success("Python virtual environment created");
            self.upgrade_pip(&venv_dir);
        } else {
            self.reporter
                .info("reinstalling dependencies into the existing virtual environment");
        }

        let installed =
            self.install_python_dependencies(&venv_dir, project_dir, repo_dir, changed || force)?;
        if installed {
            self.update_record(project, project_dir, repo_dir)?;
        }
        Ok(())
    }

    /// Pip self-upgrade after a fresh venv. Failure is noise, not fatal.
    fn upgrade_pip(&self, venv_dir: &Path) {
        self.reporter.info("upgrading pip...");
        let pip = venv_pip(venv_dir);
        let args = vec![
            "install".to_string(),
            "--upgrade".to_string(),
            "pip".to_string(),
            "-i".to_string(),
            self.cfg.pip_index_url.clone(),
        ];
        match self.runner.run(&pip, &args, None, PIP_UPGRADE_TIMEOUT) {
            Ok(out) if out.success() => {}
            Ok(out) => self.reporter.warning(&format!(
                "pip upgrade failed, continuing: {}",
                out.stderr.trim()
            )),
            Err(e) => self
                .reporter
                .warning(&format!("pip upgrade failed, continuing: {:#}", e)),
        }
    }

    /// Walk the dependency-file priority chain and install from the first
    /// usable manifest. Returns whether anything was installed; install
    /// failures are logged and fall through to the next candidate.
    fn install_python_dependencies(
        &self,
        venv_dir: &Path,
        project_dir: &Path,
        repo_dir: &Path,
        force_reinstall: bool,
    ) -> Result<bool> {
        let pip = venv_pip(venv_dir);
        let candidates: [(PathBuf, DepKind); 6] = [
            (project_dir.join("requirements.txt"), DepKind::Requirements),
            (repo_dir.join("requirements.txt"), DepKind::Requirements),
            (project_dir.join("pyproject.toml"), DepKind::Pyproject),
            (repo_dir.join("pyproject.toml"), DepKind::Pyproject),
            (project_dir.join("Pipfile"), DepKind::Pipfile),
            (repo_dir.join("Pipfile"), DepKind::Pipfile),
        ];

        for (dep_file, kind) in candidates {
            if !dep_file.is_file() {
                continue;
            }
            self.reporter
                .info(&format!("dependency manifest found: {}", dep_file.display()));

            match kind {
                DepKind::Requirements => {
                    let content = fs::read_to_string(&dep_file).unwrap_or_default();
                    if requirements_is_blank(&content) {
                        self.reporter.warning(
                            "requirements file is empty or comments only, trying next candidate",
                        );
                        continue;
                    }
                    let mut args = vec![
                        "install".to_string(),
                        "-r".to_string(),
                        dep_file.display().to_string(),
                        "-i".to_string(),
                        self.cfg.pip_index_url.clone(),
                        "--timeout".to_string(),
                        PIP_SOCKET_TIMEOUT_SECS.to_string(),
                    ];
                    if force_reinstall {
                        args.push("--force-reinstall".to_string());
                        self.reporter.info("reinstalling requirements...");
                    } else {
                        self.reporter.info("installing requirements...");
                    }
                    if self.run_install(&pip, &args, None)? {
                        return Ok(true);
                    }
                }
                DepKind::Pyproject => {
                    self.reporter.info("installing project from pyproject.toml...");
                    let target = project_dir.join("pyproject.toml");
                    if dep_file != target {
                        if let Err(e) = fs::copy(&dep_file, &target) {
                            self.reporter.warning(&format!(
                                "could not copy {} into the working copy: {}",
                                dep_file.display(),
                                e
                            ));
                            continue;
                        }
                    }
                    let args = vec![
                        "install".to_string(),
                        "-e".to_string(),
                        project_dir.display().to_string(),
                        "-i".to_string(),
                        self.cfg.pip_index_url.clone(),
                    ];
                    if self.run_install(&pip, &args, None)? {
                        return Ok(true);
                    }
                }
                DepKind::Pipfile => {
                    self.reporter.warning(&format!(
                        "Pipfile detected, no automated handling; manage {} with pipenv",
                        dep_file.display()
                    ));
                    continue;
                }
            }
        }

        self.reporter
            .warning("no dependencies installed: no usable manifest found or all installs failed");
        Ok(false)
    }

    /// One bounded installer invocation; failure and timeout are warnings so
    /// the caller can try the next manifest candidate.
    fn run_install(&self, program: &Path, args: &[String], cwd: Option<&Path>) -> Result<bool> {
        let out = self.runner.run(program, args, cwd, INSTALL_TIMEOUT)?;
        if out.success() {
            self.reporter.success("dependencies installed");
            return Ok(true);
        }
        if out.timed_out {
            self.reporter.warning(&format!(
                "dependency install timed out after {} seconds",
                INSTALL_TIMEOUT.as_secs()
            ));
        } else {
            self.reporter
                .warning(&format!("dependency install failed: {}", out.stderr.trim()));
        }
        Ok(false)
    }

    fn create_node_env(
        &self,
        project: &str,
        project_dir: &Path,
        repo_dir: &Path,
        force: bool,
    ) -> Result<()> {
        let node_modules = project_dir.join(NODE_MODULES_DIR_NAME);
        let exists = node_modules.exists();
        let changed = self.deps_changed(project_dir, repo_dir);

        if exists && !force && !changed {
            self.reporter.info(&format!(
                "Node.js environment up to date, dependencies unchanged: {}",
                node_modules.display()
            ));
            return Ok(());
        }

        if exists {
            if force {
                self.reporter
                    .warning("force rebuild requested, removing node_modules");
            } else {
                self.reporter
                    .info("package manifest changed, removing node_modules for a clean install");
            }
            fs::remove_dir_all(&node_modules)
                .with_context(|| format!("remove {}", node_modules.display()))?;
        }

        // The repository copy of package.json is authoritative: sync it into
        // the working copy before installing.
        let project_pkg = project_dir.join("package.json");
        let repo_pkg = repo_dir.join("package.json");
        if repo_pkg.is_file() {
            let differs = !project_pkg.is_file()
                || fs::read(&repo_pkg).ok() != fs::read(&project_pkg).ok();
            if differs {
                fs::copy(&repo_pkg, &project_pkg)
                    .with_context(|| format!("copy {} into the working copy", repo_pkg.display()))?;
                self.reporter.info(&format!(
                    "copied package.json from repository copy: {}",
                    repo_pkg.display()
                ));
            }
        }
        if !project_pkg.is_file() {
            bail!(
                "package.json not found in {} or {}",
                project_dir.display(),
                repo_dir.display()
            );
        }

        self.reporter.info("installing Node.js dependencies...");
        let npm = self.resolve_tool("npm");
        let args = vec![
            "install".to_string(),
            "--production".to_string(),
            "--no-audit".to_string(),
        ];
        let out = self.runner.run(&npm, &args, Some(project_dir), INSTALL_TIMEOUT)?;
        if !out.success() {
            if out.timed_out {
                bail!(
                    "Node.js dependency install timed out after {} seconds",
                    INSTALL_TIMEOUT.as_secs()
                );
            }
            bail!("Node.js dependency install failed: {}", out.stderr.trim());
        }
        self.reporter.success("Node.js dependencies installed");

        self.update_record(project, project_dir, repo_dir)?;
        Ok(())
    }

    /// Refresh the persisted record after a successful install: interpreter
    /// version, installed-package count, and the fingerprint just installed
    /// from. Probes are bounded and tolerated when they fail.
    fn update_record(&self, project: &str, project_dir: &Path, repo_dir: &Path) -> Result<()> {
        let venv_dir = project_dir.join(VENV_DIR_NAME);
        let python = venv_python(&venv_dir);
        let pip = venv_pip(&venv_dir);

        let mut python_version = String::new();
        let mut package_count = 0usize;
        if python.exists() {
            if let Ok(out) = self
                .runner
                .run(&python, &["--version".to_string()], None, PROBE_TIMEOUT)
            {
                if out.success() {
                    // Old interpreters print the version on stderr.
                    let text = if out.stdout.trim().is_empty() {
                        out.stderr
                    } else {
                        out.stdout
                    };
                    python_version = text.trim().to_string();
                }
            }
            if let Ok(out) = self.runner.run(
                &pip,
                &["list".to_string(), "--format=freeze".to_string()],
                None,
                PROBE_TIMEOUT,
            ) {
                if out.success() {
                    package_count = out.stdout.lines().filter(|l| !l.trim().is_empty()).count();
                }
            }
        }

        let record = EnvRecord {
            project_name: project.to_string(),
            project_dir: project_dir.display().to_string(),
            venv_dir: venv_dir.display().to_string(),
            python_path: python.display().to_string(),
            pip_path: pip.display().to_string(),
            python_version,
            package_count,
            dependency_hashes: fingerprint::collect(project_dir, repo_dir, self.reporter),
            ..Default::default()
        };
        state::store(project_dir, record, self.reporter)
    }

    /// Delete venv, node_modules, and the state file independently; every
    /// deletion is attempted even when an earlier one fails. "Nothing to
    /// remove" and "removal failed" are distinct outcomes.
    pub fn remove(&self, project: &str) -> Result<bool> {
        let project_dir = self.cfg.project_dir(project);
        self.reporter
            .info(&format!("removing environments for project {}", project));

        let targets: [(PathBuf, &str); 3] = [
            (project_dir.join(VENV_DIR_NAME), "Python virtual environment"),
            (project_dir.join(NODE_MODULES_DIR_NAME), "Node.js environment"),
            (state::state_path(&project_dir), "state file"),
        ];

        let mut removed_any = false;
        let mut failures = 0usize;
        for (path, label) in &targets {
            if !path.exists() {
                continue;
            }
            let result = if path.is_dir() {
                fs::remove_dir_all(path)
            } else {
                fs::remove_file(path)
            };
            match result {
                Ok(()) => {
                    self.reporter
                        .success(&format!("removed {}: {}", label, path.display()));
                    removed_any = true;
                }
                Err(e) => {
                    self.reporter
                        .error(&format!("failed to remove {}: {}", label, e));
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            self.reporter
                .error(&format!("removal failed for {} item(s)", failures));
            return Ok(false);
        }
        if !removed_any {
            self.reporter
                .warning(&format!("nothing to remove for project {}", project));
            return Ok(false);
        }
        self.reporter
            .success(&format!("environments removed for project {}", project));
        Ok(true)
    }

    fn resolve_tool(&self, name: &str) -> PathBuf {
        match which::which(name) {
            Ok(path) => path,
            Err(_) => {
                self.reporter
                    .debug(&format!("{} not found on PATH, invoking by name", name));
                PathBuf::from(name)
            }
        }
    }
}

/// True when a requirements file has no installable line.
fn requirements_is_blank(content: &str) -> bool {
    content
        .lines()
        .all(|line| line.trim().is_empty() || line.trim().starts_with('#'))
}
