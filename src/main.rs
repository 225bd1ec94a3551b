//! featplan - dependency resolution for feature registries

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = featplan::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
