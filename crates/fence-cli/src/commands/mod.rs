//! Command implementations for fence-cli

pub mod check;
pub mod geofence;
pub mod init;

pub use check::{run_check, run_reregister};
pub use geofence::{run_add, run_list, run_remove, run_resize, run_show};
pub use init::run_init;
