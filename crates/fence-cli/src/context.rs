//! Data directory layout and session setup
//!
//! Every command runs as a fresh app launch: settings are loaded, the
//! snapshot is reloaded onto a headless map and the emulated native engine
//! is initialized from its journal.

use std::path::{Path, PathBuf};

use colored::Colorize;
use fence_core::{Notice, Session, Settings, StartReport};
use fence_native::EmulatedGateway;
use fence_overlay::{HeadlessEngine, HeadlessMap, MapEngine};
use fence_store::FileKvStore;

use crate::error::{CliError, Result};

pub const SETTINGS_FILE: &str = "fence.toml";
pub const NATIVE_STATE_FILE: &str = "native.json";

pub type CliSession = Session<HeadlessMap, FileKvStore, EmulatedGateway>;

/// Resolve the data directory from the flag or the platform default.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => dirs::data_dir()
            .map(|dir| dir.join("fence"))
            .ok_or_else(|| CliError::user("Cannot determine a data directory; pass --data-dir")),
    }
}

pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SETTINGS_FILE)
}

pub fn load_settings(data_dir: &Path) -> Result<Settings> {
    Ok(Settings::load(&settings_path(data_dir))?)
}

/// Open and start a session over `data_dir`.
pub async fn open_session(data_dir: &Path) -> Result<(CliSession, StartReport)> {
    let settings = load_settings(data_dir)?;
    std::fs::create_dir_all(data_dir)?;

    let map = HeadlessEngine.create_map(&settings.map.element_id, settings.camera())?;
    let store = FileKvStore::new(data_dir);
    let gateway = EmulatedGateway::new(
        settings.native.platform,
        data_dir.join(NATIVE_STATE_FILE),
    )?;

    let mut session = Session::new(&settings, map, store, gateway)?;
    let report = session.start().await?;
    tracing::debug!(data_dir = %data_dir.display(), loaded = report.loaded, "Session opened");
    Ok((session, report))
}

/// Print queued notices to stderr.
pub fn report_notices(session: &mut CliSession) {
    for notice in session.sync_mut().take_notices() {
        let label = match notice {
            Notice::PersistenceRecovered => "note".green().bold(),
            _ => "warning".yellow().bold(),
        };
        eprintln!("{}: {}", label, notice);
    }
}
