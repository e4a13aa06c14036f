//! Error type shared by the sampling engine.
//!
//! Per-process failures (a process exiting mid-scan, an unreadable status
//! file) never reach this type: the scanner absorbs them. What is left is
//! fatal for the current tick and ends the run.

use std::io;
use std::path::PathBuf;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read process table {}: {source}", path.display())]
    ProcTable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("out of memory {0}")]
    OutOfMemory(&'static str),

    #[error("signal registration failed: {0}")]
    Signal(#[source] io::Error),

    #[error("terminal I/O failed: {0}")]
    Display(#[from] io::Error),

    #[error("invalid process filter: {0}")]
    Filter(String),

    #[error("invalid sample interval {0}s, must be 1.0 or more seconds")]
    InvalidInterval(f64),
}
