//! External command invocation with timeout enforcement.
//!
//! Everything the manager shells out to (`python3 -m venv`, pip, npm, version
//! probes) goes through the [`CommandRunner`] capability so tests can inject
//! a scripted fake. The production [`ProcessRunner`] reads stdout/stderr on
//! background threads while polling the child; without that, a child writing
//! more than the pipe buffer (~64KB) would block and we'd deadlock.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Child poll interval while waiting for exit or timeout.
const POLL_INTERVAL_MS: u64 = 100;

/// Outcome of one external invocation.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// True when the process was killed for exceeding its timeout.
    pub timed_out: bool,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Capability to run an external program to completion.
pub trait CommandRunner {
    fn run(
        &self,
        program: &Path,
        args: &[String],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> Result<RunOutput>;
}

/// Real process invoker.
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(
        &self,
        program: &Path,
        args: &[String],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> Result<RunOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        tracing::debug!(program = %program.display(), ?args, "spawning external command");
        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn {}", program.display()))?;

        let stdout_handle = child.stdout.take().map(|mut out| {
            thread::spawn(move || {
                let mut s = String::new();
                let _ = out.read_to_string(&mut s);
                s
            })
        });
        let stderr_handle = child.stderr.take().map(|mut err| {
            thread::spawn(move || {
                let mut s = String::new();
                let _ = err.read_to_string(&mut s);
                s
            })
        });

        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let stdout = stdout_handle
                        .map(|h| h.join().unwrap_or_default())
                        .unwrap_or_default();
                    let stderr = stderr_handle
                        .map(|h| h.join().unwrap_or_default())
                        .unwrap_or_default();
                    return Ok(RunOutput {
                        exit_code: status.code().unwrap_or(-1),
                        stdout,
                        stderr,
                        timed_out: false,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    let _ = stdout_handle.map(|h| h.join());
                    let _ = stderr_handle.map(|h| h.join());
                    return Err(anyhow::anyhow!(
                        "failed to wait for {}: {}",
                        program.display(),
                        e
                    ));
                }
            }

            if start.elapsed() > timeout {
                tracing::warn!(
                    program = %program.display(),
                    timeout_secs = timeout.as_secs(),
                    "external command exceeded its timeout, killing it"
                );
                let _ = child.kill();
                let _ = child.wait();
                let _ = stdout_handle.map(|h| h.join());
                let _ = stderr_handle.map(|h| h.join());
                return Ok(RunOutput {
                    exit_code: -1,
                    stdout: String::new(),
                    stderr: format!(
                        "process killed: exceeded timeout of {} seconds",
                        timeout.as_secs()
                    ),
                    timed_out: true,
                });
            }

            thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! Scripted runner fake: records every invocation and replays canned
    //! outputs keyed by substring match on "program arg arg...".

    use super::{CommandRunner, RunOutput};
    use anyhow::Result;
    use std::cell::RefCell;
    use std::path::Path;
    use std::time::Duration;

    pub struct FakeRunner {
        pub calls: RefCell<Vec<String>>,
        rules: Vec<(String, RunOutput)>,
    }

    impl FakeRunner {
        /// A runner where every invocation succeeds with empty output.
        pub fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                rules: Vec::new(),
            }
        }

        /// Replay `output` for any invocation whose command line contains `needle`.
        /// Rules are checked in insertion order; first match wins.
        pub fn with_rule(mut self, needle: &str, output: RunOutput) -> Self {
            self.rules.push((needle.to_string(), output));
            self
        }

        pub fn count_containing(&self, needle: &str) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|line| line.contains(needle))
                .count()
        }
    }

    pub fn ok_with(stdout: &str) -> RunOutput {
        RunOutput {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
            timed_out: false,
        }
    }

    pub fn failed_with(stderr: &str) -> RunOutput {
        RunOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: stderr.to_string(),
            timed_out: false,
        }
    }

    pub fn timed_out() -> RunOutput {
        RunOutput {
            exit_code: -1,
            stdout: String::new(),
            stderr: "process killed: exceeded timeout".to_string(),
            timed_out: true,
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(
            &self,
            program: &Path,
            args: &[String],
            _cwd: Option<&Path>,
            _timeout: Duration,
        ) -> Result<RunOutput> {
            let line = format!("{} {}", program.display(), args.join(" "));
            self.calls.borrow_mut().push(line.clone());
            for (needle, output) in &self.rules {
                if line.contains(needle.as_str()) {
                    return Ok(output.clone());
                }
            }
            Ok(ok_with(""))
        }
    }
}
