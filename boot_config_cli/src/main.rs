//! CLI entrypoint for `boot-config`.

use std::process::ExitCode;

use boot_config_cli::cli::Args;
use boot_config_cli::{run, telemetry};
use clap::Parser;

fn main() -> ExitCode {
    let args = Args::parse();
    telemetry::init(args.verbose);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
