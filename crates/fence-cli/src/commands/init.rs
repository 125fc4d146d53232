//! Init command implementation

use std::path::Path;

use colored::Colorize;
use fence_core::Settings;
use fence_native::Platform;

use crate::context::settings_path;
use crate::error::{CliError, Result};

/// Write a default `fence.toml` into `data_dir`.
pub fn run_init(data_dir: &Path, platform: Platform, force: bool) -> Result<()> {
    let path = settings_path(data_dir);
    if path.exists() && !force {
        return Err(CliError::user(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }
    platform.ensure_supported()?;

    let mut settings = Settings::default();
    settings.native.platform = platform;
    settings.save(&path)?;

    println!(
        "{} Geofence data initialized at {}",
        "=>".green().bold(),
        data_dir.display().to_string().cyan()
    );
    println!("   {}: {}", "Platform".dimmed(), platform);
    Ok(())
}
