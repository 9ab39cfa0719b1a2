use std::process::ExitCode;

fn main() -> ExitCode {
    match qlvenv::run_cli() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
