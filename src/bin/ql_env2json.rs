//! ql-env2json — convert a KEY=VALUE env file into the batch-import JSON format.

use clap::Parser;
use qlvenv::convert;
use qlvenv::report::{ConsoleReporter, Reporter};
use std::path::PathBuf;
use std::process::ExitCode;

/// Convert a KEY=VALUE env file into a batch-import JSON array
#[derive(Parser, Debug)]
#[command(name = "ql-env2json")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input env file (KEY=VALUE lines, `#` comments)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output JSON file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
}

fn main() -> ExitCode {
    qlvenv::observability::init_tracing();
    let args = Args::parse();
    let reporter = ConsoleReporter;

    match convert::run_convert(&args.input, &args.output, &reporter) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            reporter.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
