//! faultstat library
//!
//! Samples every process's minor and major page fault counters and swap
//! usage from the process table, computes per-tick deltas, ranks processes
//! by a selectable metric and renders the ranking as a full-screen
//! dashboard, plain periodic text or JSON.
//!
//! # Layout
//!
//! - [`pool`]: recycling store for per-tick sample records
//! - [`cache`]: pid and uid identity caches
//! - [`process`]: process table parsing, filtering and scanning
//! - [`ranking`]: delta computation and stable descending ranking
//! - [`display`], [`render`], [`format`]: output
//! - [`sampler`]: the sampling loop, driven by [`cadence`], [`input`] and
//!   [`signals`]
//!
//! # Usage
//!
//! ```no_run
//! use faultstat::cache::IdentityOptions;
//! use faultstat::display::PlainDisplay;
//! use faultstat::input::NoKeys;
//! use faultstat::process::Scanner;
//! use faultstat::sampler::{SampleCount, Sampler, SamplerConfig};
//! use faultstat::RunContext;
//!
//! # async fn demo() -> faultstat::Result<()> {
//! let scanner = Scanner::new("/proc", IdentityOptions::default(), None);
//! let config = SamplerConfig {
//!     count: SampleCount::Finite(3),
//!     ..SamplerConfig::default()
//! };
//! let sampler = Sampler::new(
//!     scanner,
//!     RunContext::default(),
//!     Box::new(PlainDisplay::stdout()),
//!     Box::new(NoKeys),
//!     config,
//! )?;
//! let (_tasks, events) = faultstat::signals::install()?;
//! let summary = sampler.run(events).await?;
//! println!("{} ticks", summary.ticks);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cadence;
pub mod context;
pub mod display;
pub mod error;
pub mod format;
pub mod input;
pub mod pool;
pub mod process;
pub mod ranking;
pub mod render;
pub mod sampler;
pub mod signals;

// Re-export main types for convenience
pub use context::{OutputFormat, RunContext};
pub use error::{Error, Result};
pub use ranking::{DumpMode, SortMetric};
pub use sampler::{RunSummary, SampleCount, Sampler, SamplerConfig};
