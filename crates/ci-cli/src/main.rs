//! Pantheon CI tools CLI

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("failed to initialize logging: {e}")))?;
    tracing::debug!("Verbose mode enabled");

    let cwd = std::env::current_dir()?;
    match cli.command {
        Commands::Install {
            root,
            source,
            config,
        } => commands::run_install(&cwd, root, source, config),
        Commands::Merge { file, dry_run } => commands::run_merge(&cwd, file, dry_run),
        Commands::Uninstall { root } => commands::run_uninstall(&cwd, root),
        Commands::DetectVersion { root } => commands::run_detect_version(&cwd, root),
    }
}
