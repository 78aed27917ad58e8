//! tracker - expression engine for tabletop bookkeeping
//!
//! Usage:
//!   tracker              Start interactive REPL
//!   tracker -c "stmt"    Evaluate a single statement
//!   tracker script.scr   Evaluate a script file

mod cli;
mod rcfile;
mod repl;
mod terminal;

use std::env;
use std::process::ExitCode;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use cli::{execute_command, execute_script, parse_args, print_help, print_version};
use repl::run_repl;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let cli = parse_args(&args);

    if cli.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if cli.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    if let Some(cmd) = cli.command {
        return execute_command(&cmd);
    }

    if let Some(script) = cli.script {
        return execute_script(&script);
    }

    match run_repl() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("REPL error: {}", e);
            ExitCode::FAILURE
        }
    }
}
