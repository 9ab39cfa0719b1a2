//! `qlvenv activate` — print, never execute, the activation commands.

use crate::config::ManagerConfig;
use crate::env::{venv_activate, venv_python, VENV_DIR_NAME};
use crate::report::Reporter;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn cmd_activate(cfg: &ManagerConfig, reporter: &dyn Reporter, project: &str) -> Result<bool> {
    let project_dir = cfg.project_dir(project);
    if !project_dir.is_dir() {
        reporter.error(&format!("project does not exist: {}", project));
        return Ok(false);
    }

    let venv_dir = project_dir.join(VENV_DIR_NAME);
    if !venv_dir.exists() {
        reporter.error(&format!(
            "project {} has no Python virtual environment",
            project
        ));
        reporter.info(&format!("create one first: qlvenv create {}", project));
        return Ok(false);
    }

    let activate = venv_activate(&venv_dir);
    if !activate.exists() {
        reporter.error(&format!(
            "activation script missing: {}",
            activate.display()
        ));
        return Ok(false);
    }

    reporter.info(&format!("activation commands for project {}:", project));
    println!("{}", "# activate the virtual environment".green());
    println!("cd {}", project_dir.display());
    println!("source {}", activate.display());
    println!();
    println!("{}", "# or call the interpreter directly".green());
    println!("{} your_script.py", venv_python(&venv_dir).display());
    println!();
    println!("{}", "# leave the virtual environment".green());
    println!("deactivate");
    Ok(true)
}
