//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fence_native::Platform;

/// Geofence manager - draw, persist and monitor circular geofences
#[derive(Parser, Debug)]
#[command(name = "fence")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding fence.toml, the geofence snapshot and native state
    #[arg(long, global = true, env = "FENCE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Write a default fence.toml
    Init {
        /// Native platform to target
        #[arg(short, long, default_value = "android")]
        platform: Platform,

        /// Overwrite an existing fence.toml
        #[arg(long)]
        force: bool,
    },

    /// Create a geofence centered at a coordinate
    ///
    /// Examples:
    ///   fence add --lat 10 --lng 20
    ///   fence add --lat -33.86 --lng 151.21
    Add {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },

    /// List every geofence
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show one geofence
    Show {
        /// Geofence id, e.g. "10|20"
        #[arg(allow_hyphen_values = true)]
        id: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Change a geofence's radius and update native monitoring
    Resize {
        /// Geofence id, e.g. "10|20"
        #[arg(allow_hyphen_values = true)]
        id: String,

        /// New radius in meters
        #[arg(allow_hyphen_values = true)]
        radius: f64,
    },

    /// Stop monitoring a geofence and delete it
    Remove {
        /// Geofence id, e.g. "10|20"
        #[arg(allow_hyphen_values = true)]
        id: String,
    },

    /// Check overlays, storage and native state for drift
    Check {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Register every stored geofence with the native engine again
    Reregister,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_add_with_negative_coordinates() {
        let cli = Cli::parse_from(["fence", "add", "--lat", "-33.5", "--lng", "151.25"]);
        assert_eq!(
            cli.command,
            Some(Commands::Add {
                lat: -33.5,
                lng: 151.25
            })
        );
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["fence", "list", "--data-dir", "/tmp/x", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn parse_init_platform() {
        let cli = Cli::parse_from(["fence", "init", "--platform", "ios"]);
        assert_eq!(
            cli.command,
            Some(Commands::Init {
                platform: Platform::Ios,
                force: false
            })
        );
    }
}
