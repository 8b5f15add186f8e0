use std::process::ExitCode;

use clap::Parser;

use dogi::{replace_process, report_error, Outcome, EXIT_FAILURE};

mod cli;
mod commands;

use crate::cli::Cli;

fn main() -> ExitCode {
    // dotenv defaults must be in place before clap reads `env = ...` fallbacks
    if let Err(e) = dogi::config::load_env_file() {
        dogi::warn_print(&format!("{e:#}"));
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_FAILURE } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    if let Some(mode) = cli.color {
        dogi::set_color_mode(mode);
    }
    dogi::telemetry::init_tracing(cli.verbose);

    match commands::dispatch(&cli) {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::Exec(plan)) => {
            // only returns when exec failed
            let err = replace_process(&plan);
            report_error(&err);
            ExitCode::from(EXIT_FAILURE)
        }
        Err(e) => {
            report_error(&e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
