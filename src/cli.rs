//! CLI arguments for faultstat.
//!
//! This module defines the command-line interface using clap: display
//! switches, the process filter, output mode, configuration file handling
//! and the positional DURATION and COUNT.

use clap::{ArgGroup, Parser, ValueEnum};
use faultstat::SortMetric;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, Default, ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Yaml,
    Json,
    Toml,
}

/// Ranking key selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    MajorMinor,
    Major,
    Minor,
    DeltaMajorMinor,
    DeltaMajor,
    DeltaMinor,
    Swap,
}

impl From<SortArg> for SortMetric {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::MajorMinor => SortMetric::MajorMinor,
            SortArg::Major => SortMetric::Major,
            SortArg::Minor => SortMetric::Minor,
            SortArg::DeltaMajorMinor => SortMetric::DeltaMajorMinor,
            SortArg::DeltaMajor => SortMetric::DeltaMajor,
            SortArg::DeltaMinor => SortMetric::DeltaMinor,
            SortArg::Swap => SortMetric::Swap,
        }
    }
}

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

/// Main CLI arguments structure
#[derive(Parser, Debug, Default)]
#[command(
    name = "faultstat",
    about = "Report per-process page fault activity",
    long_about = "Report per-process page fault activity.\n\n\
                  Samples the minor and major page fault counters and swap usage of every \
                  process, then shows the change per interval ranked by a selectable metric, \
                  either as plain periodic text, JSON, or a full-screen top-like dashboard.\n\n\
                  Without DURATION a single snapshot of absolute counts is printed.",
    author = "Michael Moll <exporter@herakles.now>",
    version,
    long_version = LONG_VERSION,
    group(ArgGroup::new("command_style").args(["comm", "long", "short"])),
    after_help = "Dashboard keys: q/Esc quit, a toggle arrows, t toggle totals, s next sort order"
)]
pub struct Args {
    /// Show page fault change with up/down arrows
    #[arg(short = 'a', long)]
    pub arrows: bool,

    /// Get command name from processes comm field
    #[arg(short = 'c', long)]
    pub comm: bool,

    /// Strip directory basename off command information
    #[arg(short = 'd', long)]
    pub strip_dirname: bool,

    /// Show long command information
    #[arg(short = 'l', long)]
    pub long: bool,

    /// Show short command information
    #[arg(short = 's', long)]
    pub short: bool,

    /// Monitor only these pids and/or process names (comma-separated)
    #[arg(short = 'p', long, value_name = "LIST")]
    pub pids: Option<String>,

    /// Top mode, show only changes in page faults
    #[arg(short = 't', long)]
    pub top: bool,

    /// Top mode, show top total page faults
    #[arg(short = 'T', long)]
    pub top_totals: bool,

    /// Output page fault information in JSON format
    #[arg(short = 'j', long, conflicts_with_all = ["top", "top_totals"])]
    pub json: bool,

    /// Initial ranking key
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,

    /// Process table location
    #[arg(long, value_name = "DIR")]
    pub proc_root: Option<PathBuf>,

    /// Log level (default: warn)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Seconds between samples (1.0 or more)
    #[arg(value_name = "DURATION")]
    pub duration: Option<f64>,

    /// Number of samples, 0 for continuous
    #[arg(value_name = "COUNT")]
    pub count: Option<u64>,
}
