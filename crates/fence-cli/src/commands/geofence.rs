//! Geofence commands: add, list, show, resize, remove

use std::path::Path;

use colored::Colorize;
use fence_core::{GeofenceView, NativeStatus};
use fence_meta::{FenceId, LatLng};

use crate::context::{CliSession, open_session, report_notices};
use crate::error::{CliError, Result};

pub async fn run_add(data_dir: &Path, latitude: f64, longitude: f64) -> Result<()> {
    let (mut session, _) = open_session(data_dir).await?;
    let view = session
        .create_geofence(LatLng::new(latitude, longitude))
        .await?;
    report_notices(&mut session);

    println!("{} Created geofence {}", "+".green().bold(), view.id.as_str().cyan());
    print_view(&view);
    Ok(())
}

pub async fn run_list(data_dir: &Path, json: bool) -> Result<()> {
    let (mut session, _) = open_session(data_dir).await?;
    report_notices(&mut session);
    let views = session.sync().views();

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("{} (use {} to create one)", "No geofences".dimmed(), "fence add".cyan());
        return Ok(());
    }
    println!("{}:", "Geofences".bold());
    for view in &views {
        println!(
            "  {} {:<28} {:>10.1} m  {}",
            "+".green(),
            view.id.as_str().cyan(),
            view.radius,
            status_label(&view.native)
        );
    }
    Ok(())
}

pub async fn run_show(data_dir: &Path, id: &str, json: bool) -> Result<()> {
    let (mut session, _) = open_session(data_dir).await?;
    report_notices(&mut session);
    let id = FenceId::from_raw(id);
    let view = find(&session, &id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", view.id.as_str().cyan().bold());
        print_view(&view);
    }
    Ok(())
}

pub async fn run_resize(data_dir: &Path, id: &str, radius: f64) -> Result<()> {
    let (mut session, _) = open_session(data_dir).await?;
    let id = FenceId::from_raw(id);
    select(&mut session, &id)?;

    let applied = session.resize_selected(radius)?.unwrap_or(radius);
    let committed = session.commit_selected_radius().await;
    report_notices(&mut session);
    committed?;

    if applied != radius {
        println!(
            "{} Radius {} is out of range, clamped",
            "!".yellow().bold(),
            radius
        );
    }
    println!(
        "{} Resized {} to {:.1} m",
        "~".green().bold(),
        id.as_str().cyan(),
        applied
    );
    Ok(())
}

pub async fn run_remove(data_dir: &Path, id: &str) -> Result<()> {
    let (mut session, _) = open_session(data_dir).await?;
    let id = FenceId::from_raw(id);
    select(&mut session, &id)?;

    let removed = session.remove_selected().await;
    report_notices(&mut session);
    match removed? {
        Some(removed) => {
            println!("{} Removed {}", "-".red().bold(), removed.as_str().cyan());
            Ok(())
        }
        None => Err(CliError::user(format!("Geofence {} was not removed", id))),
    }
}

fn find(session: &CliSession, id: &FenceId) -> Result<GeofenceView> {
    session
        .sync()
        .get(id)
        .map(|entry| entry.view())
        .ok_or_else(|| fence_core::Error::NotFound { id: id.clone() }.into())
}

fn select(session: &mut CliSession, id: &FenceId) -> Result<()> {
    find(session, id)?;
    session
        .select_geofence(id)
        .map(|_| ())
        .ok_or_else(|| CliError::user(format!("Geofence {} cannot be selected", id)))
}

fn print_view(view: &GeofenceView) {
    println!(
        "   {}: {}, {}",
        "Center".dimmed(),
        view.center.latitude,
        view.center.longitude
    );
    println!("   {}: {:.1} m", "Radius".dimmed(), view.radius);
    println!(
        "   {}: fill {} / stroke {} ({})",
        "Style".dimmed(),
        view.style.fill_color,
        view.style.stroke_color,
        view.style.stroke_width
    );
    println!("   {}: {}", "Native".dimmed(), status_label(&view.native));
}

fn status_label(status: &NativeStatus) -> colored::ColoredString {
    match status {
        NativeStatus::Registered => "registered".green(),
        NativeStatus::Failed { .. } => status.to_string().red(),
        other => other.label().yellow(),
    }
}
