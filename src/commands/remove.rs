//! `qlvenv remove` — delete a project's environments and state file.

use crate::config::ManagerConfig;
use crate::env::builder::EnvBuilder;
use crate::report::Reporter;
use crate::runner::CommandRunner;
use anyhow::Result;

pub fn cmd_remove(
    cfg: &ManagerConfig,
    runner: &dyn CommandRunner,
    reporter: &dyn Reporter,
    project: &str,
) -> Result<bool> {
    EnvBuilder::new(cfg, runner, reporter).remove(project)
}
