//! Startup requirement validation for faultstat.
//!
//! This module checks that the process table can be read before the first
//! sample is taken.

use nix::unistd::geteuid;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Validate all runtime requirements
pub fn validate_requirements(proc_root: &Path) -> Result<(), ValidationError> {
    debug!("Validating runtime requirements...");

    check_user_privileges();
    check_proc_access(proc_root)?;

    debug!("All runtime requirements validated");
    Ok(())
}

/// Warns when other users' processes may be hidden.
fn check_user_privileges() {
    if !geteuid().is_root() {
        warn!("Not running as root - page faults of other users' processes may be unreadable");
    } else {
        debug!("Running as root (uid=0)");
    }
}

/// The process table must be enumerable.
fn check_proc_access(proc_root: &Path) -> Result<(), ValidationError> {
    match fs::read_dir(proc_root) {
        Ok(_) => {
            info!("Process table: {}", proc_root.display());
        }
        Err(e) => {
            error!("Cannot read process table {}: {}", proc_root.display(), e);
            return Err(ValidationError::ProcNotReadable(format!(
                "{}: {}",
                proc_root.display(),
                e
            )));
        }
    }

    // init's stat is readable by everyone on a normal system
    let init_stat = proc_root.join("1").join("stat");
    if let Err(e) = fs::metadata(&init_stat) {
        warn!("Could not read {}: {}", init_stat.display(), e);
    }

    Ok(())
}

/// Validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Process table not readable: {0}")]
    ProcNotReadable(String),
}
