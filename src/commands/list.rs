//! `qlvenv list` — fixed-width table of all project environments.

use crate::config::ManagerConfig;
use crate::env::inventory::{self, EnvStatus, UNKNOWN};
use crate::report::Reporter;
use crate::runner::CommandRunner;
use anyhow::Result;
use chrono::DateTime;
use owo_colors::OwoColorize;

const TABLE_WIDTH: usize = 104;

pub fn cmd_list(
    cfg: &ManagerConfig,
    runner: &dyn CommandRunner,
    reporter: &dyn Reporter,
) -> Result<bool> {
    let envs = inventory::scan(cfg, runner, reporter)?;

    if envs.is_empty() {
        reporter.warning("no project environments found");
        reporter.info("create one with: qlvenv create <project>");
        return Ok(true);
    }

    let header = format!(
        "{:<25} {:<15} {:<20} {:<10} {:<10} {:<20}",
        "PROJECT", "KIND", "PYTHON", "PACKAGES", "STATUS", "CREATED"
    );
    println!("{}", header.bold());
    println!("{}", "-".repeat(TABLE_WIDTH));

    for env in &envs {
        let name: String = env.project_name.chars().take(24).collect();
        let kind = kind_label(env.has_python_env, env.has_nodejs_env);
        let version = if env.python_version == UNKNOWN {
            "-".to_string()
        } else {
            env.python_version.replace("Python ", "")
        };
        let packages = if env.package_count > 0 {
            env.package_count.to_string()
        } else {
            "-".to_string()
        };
        // Pad before colorizing so the escape codes don't skew the column.
        let status = format!("{:<10}", env.status.label());
        let status = match env.status {
            EnvStatus::Healthy => status.green().to_string(),
            EnvStatus::NodeOnly => status.yellow().to_string(),
            EnvStatus::Unknown => status,
            _ => status.red().to_string(),
        };
        println!(
            "{:<25} {:<15} {:<20} {:<10} {} {:<20}",
            name,
            kind,
            version,
            packages,
            status,
            format_created(&env.created_at)
        );
    }

    println!("{}", "-".repeat(TABLE_WIDTH));
    reporter.info(&format!("found {} project environment(s)", envs.len()));
    Ok(true)
}

fn kind_label(has_python: bool, has_nodejs: bool) -> String {
    let mut kinds = Vec::new();
    if has_python {
        kinds.push("Python");
    }
    if has_nodejs {
        kinds.push("Node.js");
    }
    kinds.join("+")
}

/// Render a stored RFC 3339 timestamp as `YYYY-MM-DD HH:MM`; fall back to a
/// raw prefix when it does not parse, and `-` when unknown.
fn format_created(created_at: &str) -> String {
    if created_at == UNKNOWN || created_at.is_empty() {
        return "-".to_string();
    }
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => created_at.chars().take(16).collect(),
    }
}
