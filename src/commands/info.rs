//! `qlvenv info` — multi-section report for one project's environments.

use crate::config::ManagerConfig;
use crate::env::state;
use crate::env::{venv_pip, venv_python, NODE_MODULES_DIR_NAME, VENV_DIR_NAME};
use crate::report::Reporter;
use crate::runner::CommandRunner;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::fs;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Installed packages listed before the report truncates.
const PACKAGE_PREVIEW: usize = 10;

pub fn cmd_info(
    cfg: &ManagerConfig,
    runner: &dyn CommandRunner,
    reporter: &dyn Reporter,
    project: &str,
) -> Result<bool> {
    let project_dir = cfg.project_dir(project);
    if !project_dir.is_dir() {
        reporter.error(&format!("project does not exist: {}", project));
        return Ok(false);
    }

    let venv_dir = project_dir.join(VENV_DIR_NAME);
    let node_modules = project_dir.join(NODE_MODULES_DIR_NAME);

    println!("{}", "=".repeat(60));
    println!("project name: {}", project.cyan());
    println!("project directory: {}", project_dir.display());

    // Python section
    if venv_dir.exists() {
        println!();
        println!("{}", "Python virtual environment".green());
        println!("  directory: {}", venv_dir.display());

        let python = venv_python(&venv_dir);
        if python.exists() {
            if let Ok(out) =
                runner.run(&python, &["--version".to_string()], None, PROBE_TIMEOUT)
            {
                if out.success() {
                    let text = if out.stdout.trim().is_empty() {
                        out.stderr
                    } else {
                        out.stdout
                    };
                    println!("  version: {}", text.trim());
                } else {
                    println!("  status: {}", "broken - version probe failed".red());
                }
            }
            let pip = venv_pip(&venv_dir);
            if let Ok(out) = runner.run(
                &pip,
                &["list".to_string(), "--format=freeze".to_string()],
                None,
                PROBE_TIMEOUT,
            ) {
                if out.success() {
                    let packages: Vec<&str> = out
                        .stdout
                        .lines()
                        .filter(|l| !l.trim().is_empty())
                        .collect();
                    println!("  installed packages: {}", packages.len());
                    for pkg in packages.iter().take(PACKAGE_PREVIEW) {
                        match pkg.split_once("==") {
                            Some((name, version)) => println!("    - {} ({})", name, version),
                            None => println!("    - {}", pkg),
                        }
                    }
                    if packages.len() > PACKAGE_PREVIEW {
                        println!("    ... and {} more", packages.len() - PACKAGE_PREVIEW);
                    }
                }
            }
        } else {
            println!("  status: {}", "corrupt - python executable missing".red());
        }
    } else {
        println!();
        println!("{}", "Python virtual environment not created".yellow());
    }

    // Node.js section
    if node_modules.exists() {
        println!();
        println!("{}", "Node.js environment".green());
        println!("  node_modules: {}", node_modules.display());

        let package_json = project_dir.join("package.json");
        if package_json.is_file() {
            match fs::read_to_string(&package_json)
                .ok()
                .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).ok())
            {
                Some(pkg) => {
                    let field = |key: &str| {
                        pkg.get(key)
                            .and_then(|v| v.as_str())
                            .unwrap_or("unknown")
                            .to_string()
                    };
                    println!("  package name: {}", field("name"));
                    println!("  package version: {}", field("version"));
                    let dep_count = |key: &str| {
                        pkg.get(key)
                            .and_then(|v| v.as_object())
                            .map(|m| m.len())
                            .unwrap_or(0)
                    };
                    println!("  production dependencies: {}", dep_count("dependencies"));
                    println!("  dev dependencies: {}", dep_count("devDependencies"));
                }
                None => println!("  package.json could not be parsed"),
            }
        }
    } else {
        println!();
        println!("{}", "Node.js environment not created".yellow());
    }

    // Persisted record section
    if let Some(record) = state::load(&project_dir, reporter) {
        println!();
        println!("{}", "state record".blue());
        println!("  created: {}", or_unknown(&record.created_at));
        println!("  last updated: {}", or_unknown(&record.last_updated));
        println!("  manager: {}", or_unknown(&record.manager));
    }

    println!("{}", "=".repeat(60));
    Ok(true)
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "unknown"
    } else {
        value
    }
}
