mod cli;
mod commands;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use cli::{Args, print_usage};

fn main() -> Result<ExitCode> {
    // Logs go to stderr, stdout is for user messages
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let mut stdout = io::stdout().lock();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            debug!("Unusable arguments: {}", e);
            print_usage(&mut stdout).context("Failed to write usage")?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    let Some((simfile, delta)) = args.positionals() else {
        print_usage(&mut stdout).context("Failed to write usage")?;
        return Ok(ExitCode::SUCCESS);
    };

    commands::adjust::run(&mut stdout, simfile, &delta).map(ExitCode::from)
}
