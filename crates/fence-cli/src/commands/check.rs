//! Check and reregister command implementations

use std::path::Path;

use colored::Colorize;
use fence_core::{CheckStatus, ResolutionKind};

use crate::context::{open_session, report_notices};
use crate::error::{CliError, Result};

/// Compare overlays, the stored snapshot and native state.
///
/// Exits with an error when the report is not healthy.
pub async fn run_check(data_dir: &Path, json: bool) -> Result<()> {
    let (mut session, start) = open_session(data_dir).await?;
    report_notices(&mut session);
    let report = session.sync().check();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let status = match report.status {
            CheckStatus::Healthy => "healthy".green().bold(),
            CheckStatus::Missing => "missing".yellow().bold(),
            CheckStatus::Drifted => "drifted".yellow().bold(),
            CheckStatus::Broken => "broken".red().bold(),
        };
        println!("{}: {}", "Status".bold(), status);
        println!(
            "   {}: {} loaded, {} registered, {} failed",
            "Startup".dimmed(),
            start.loaded,
            start.registered,
            start.failed
        );
        for item in &report.missing {
            println!("  {} {}: {}", "?".yellow(), item.id.as_str().cyan(), item.description);
        }
        for item in &report.drifted {
            println!("  {} {}: {}", "~".yellow(), item.id.as_str().cyan(), item.description);
        }
        for message in &report.messages {
            println!("  {}", message.dimmed());
        }
    }

    if report.is_healthy() {
        Ok(())
    } else {
        Err(CliError::user(format!("Check found problems ({:?})", report.status)))
    }
}

/// Push every live geofence to the native engine again.
pub async fn run_reregister(data_dir: &Path) -> Result<()> {
    let (mut session, _) = open_session(data_dir).await?;
    session.sync_mut().reregister_all();
    let resolutions = session.flush().await;
    report_notices(&mut session);

    let mut registered = 0;
    let mut failed = 0;
    for resolution in &resolutions {
        match &resolution.kind {
            ResolutionKind::Registered => registered += 1,
            ResolutionKind::RegistrationFailed(e) => {
                failed += 1;
                println!("  {} {}: {}", "x".red(), resolution.id.as_str().cyan(), e);
            }
            _ => {}
        }
    }

    println!(
        "{} {} registered, {} failed",
        "=>".green().bold(),
        registered,
        failed
    );
    if failed > 0 {
        return Err(CliError::user(format!("{} geofences could not be registered", failed)));
    }
    Ok(())
}
