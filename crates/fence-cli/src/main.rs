//! Geofence manager CLI
//!
//! Drives the geofence synchronization core from the command line, on a
//! headless map with file-backed storage and an emulated native engine.

mod cli;
mod commands;
mod context;
mod error;

use std::path::Path;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = fence_core::logging::init(cli.verbose) {
        eprintln!("{}: could not set up logging: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command else {
        println!("{} Geofence manager", "fence".green().bold());
        println!();
        println!("Run {} for available commands.", "fence --help".cyan());
        return Ok(());
    };

    let data_dir = context::resolve_data_dir(cli.data_dir)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute_command(&data_dir, command))
}

async fn execute_command(data_dir: &Path, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init { platform, force } => commands::run_init(data_dir, platform, force),
        Commands::Add { lat, lng } => commands::run_add(data_dir, lat, lng).await,
        Commands::List { json } => commands::run_list(data_dir, json).await,
        Commands::Show { id, json } => commands::run_show(data_dir, &id, json).await,
        Commands::Resize { id, radius } => commands::run_resize(data_dir, &id, radius).await,
        Commands::Remove { id } => commands::run_remove(data_dir, &id).await,
        Commands::Check { json } => commands::run_check(data_dir, json).await,
        Commands::Reregister => commands::run_reregister(data_dir).await,
    }
}
