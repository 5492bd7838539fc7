use std::process::ExitCode;

use clap::Parser;

use clawbridge_setup::{DEFAULT_BRIDGE_PORT, Outcome, SetupPaths, StdinConfirm, run};

/// Configure this machine to use the Claude Code CLI bridge as an OpenClaw
/// provider. Idempotent: safe to re-run at any time.
#[derive(Parser, Debug)]
#[command(name = "clawbridge-setup", version, about)]
struct Args {}

fn main() -> ExitCode {
    let _ = Args::parse();

    let paths = match SetupPaths::discover(DEFAULT_BRIDGE_PORT) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("  [!!] {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&paths, &mut StdinConfirm) {
        Ok(Outcome::Completed) => ExitCode::SUCCESS,
        Ok(Outcome::Declined) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("  [!!] {e}");
            ExitCode::FAILURE
        }
    }
}
