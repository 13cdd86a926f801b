mod cli;
mod commands;
mod error;
mod metadata;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

/// Logs go to stderr so stdout carries only the envelope.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();

    match commands::run(&cli).await {
        Ok(envelope) => {
            output::render(&envelope, cli.format, cli.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            let envelope = commands::error_envelope(&error)?;
            output::render(&envelope, cli.format, cli.pretty)?;
            Ok(ExitCode::from(error.exit_code()))
        }
    }
}
