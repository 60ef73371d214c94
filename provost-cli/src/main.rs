//! Provost CLI entry point

mod cli;
mod commands;
mod downloader;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, LogFormat};
use crate::output::OutputWriter;

fn init_tracing(cli: &Cli) {
    let level = cli.log_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match cli.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let writer = OutputWriter::new(cli.output);
    let result = match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, &cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}
