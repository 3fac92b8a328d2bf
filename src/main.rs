use clap::Parser;
use clean_folder::cli::{Cli, run};
use clean_folder::error::exit_code;
use clean_folder::output::OutputFormatter;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(exit_code::USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
