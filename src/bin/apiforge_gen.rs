use std::process::ExitCode;

use apiforge::cli::{run_cli, Cli};
use apiforge::logging::{init_logging, LogConfig};
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&LogConfig::from_env()) {
        eprintln!("Warning: failed to initialise logging: {e}");
    }

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
