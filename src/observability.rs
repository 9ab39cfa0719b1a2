//! Tracing init.
//!
//! Diagnostics go through `tracing` on stderr so stdout stays clean for the
//! reporter lines, tables, and the `activate` shell snippet. When
//! QLVENV_QUIET=1, only WARN and above are logged.

use crate::config::env_keys;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Initialize tracing. Call once at process startup.
pub fn init_tracing() {
    let quiet = std::env::var(env_keys::QLVENV_QUIET)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let level = if quiet {
        "qlvenv=warn".to_string()
    } else {
        std::env::var(env_keys::QLVENV_LOG_LEVEL).unwrap_or_else(|_| "qlvenv=info".to_string())
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init();
}
