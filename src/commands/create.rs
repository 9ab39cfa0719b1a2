//! `qlvenv create` — create or refresh a project's environments.

use crate::config::ManagerConfig;
use crate::env::builder::EnvBuilder;
use crate::report::Reporter;
use crate::runner::CommandRunner;
use anyhow::Result;

pub fn cmd_create(
    cfg: &ManagerConfig,
    runner: &dyn CommandRunner,
    reporter: &dyn Reporter,
    project: &str,
    force: bool,
) -> Result<bool> {
    EnvBuilder::new(cfg, runner, reporter).create(project, force)
}
