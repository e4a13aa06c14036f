//! Configuration management for faultstat.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use faultstat::cache::IdentityOptions;
use faultstat::format::pid_max_digits;
use faultstat::process::{CommandStyle, ProcessFilter, DEFAULT_PROC_ROOT};
use faultstat::sampler::{DEFAULT_PREALLOC_PERCENT, MIN_INTERVAL_SECS};
use faultstat::{OutputFormat, RunContext, SampleCount, SamplerConfig, SortMetric};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// Default configuration constants
pub const DEFAULT_INTERVAL_SECS: f64 = 1.0;
pub const DEFAULT_LOG_LEVEL: &str = "warn";
pub const MAX_PREALLOC_PERCENT: u32 = 1000;

/// Effective configuration: file values overlaid with CLI values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // Sampling
    pub interval_seconds: Option<f64>,
    /// 0 means continuous
    pub count: Option<u64>,

    // Command column
    pub command_style: Option<CommandStyle>,
    pub strip_dirname: Option<bool>,

    // Output
    pub arrows: Option<bool>,
    pub top: Option<bool>,
    pub top_totals: Option<bool>,
    pub json: Option<bool>,
    pub sort: Option<SortMetric>,

    /// Pids and/or process names to monitor
    #[serde(alias = "pids")]
    pub filter: Option<Vec<String>>,

    pub proc_root: Option<PathBuf>,

    // Logging
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,

    /// Spare pool records after the first sample, in percent of its size
    pub prealloc_percent: Option<u32>,
}

impl Config {
    pub fn is_json(&self) -> bool {
        self.json.unwrap_or(false)
    }

    pub fn is_top(&self) -> bool {
        self.top.unwrap_or(false) || self.top_totals.unwrap_or(false)
    }

    pub fn interval(&self) -> f64 {
        self.interval_seconds.unwrap_or(DEFAULT_INTERVAL_SECS)
    }

    pub fn proc_root(&self) -> PathBuf {
        self.proc_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Number of ticks to render. Without an interval, a dashboard or JSON
    /// output the run is a single absolute snapshot.
    pub fn sample_count(&self) -> SampleCount {
        let continuous = self.is_top() || self.interval_seconds.is_some();
        match self.count {
            Some(0) => SampleCount::Forever,
            Some(n) if continuous || self.is_json() => SampleCount::Finite(n),
            _ if self.is_json() => SampleCount::Finite(1),
            _ if continuous => SampleCount::Forever,
            _ => SampleCount::Once,
        }
    }

    pub fn filter(&self) -> faultstat::Result<Option<ProcessFilter>> {
        match &self.filter {
            Some(tokens) => Ok(Some(ProcessFilter::from_tokens(tokens)?)),
            None => Ok(None),
        }
    }

    pub fn identity_options(&self) -> IdentityOptions {
        IdentityOptions {
            style: self.command_style.unwrap_or_default(),
            strip_dirname: self.strip_dirname.unwrap_or(false),
        }
    }

    pub fn run_context(&self) -> RunContext {
        RunContext {
            arrows: self.arrows.unwrap_or(false),
            totals: self.top_totals.unwrap_or(false),
            top: self.is_top(),
            sort: self.sort.unwrap_or_default(),
            format: if self.is_json() {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            pid_width: pid_max_digits(&self.proc_root()),
            ..RunContext::default()
        }
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            interval: Duration::from_secs_f64(self.interval()),
            count: self.sample_count(),
            prealloc_percent: self.prealloc_percent.unwrap_or(DEFAULT_PREALLOC_PERCENT),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let interval = cfg.interval();
    if !interval.is_finite() || interval < MIN_INTERVAL_SECS {
        return Err(faultstat::Error::InvalidInterval(interval).into());
    }

    if let Some(pct) = cfg.prealloc_percent {
        if pct > MAX_PREALLOC_PERCENT {
            return Err(format!(
                "prealloc_percent {} is too large, maximum is {}",
                pct, MAX_PREALLOC_PERCENT
            )
            .into());
        }
    }

    match cfg.log_level() {
        "off" | "error" | "warn" | "info" | "debug" | "trace" => {}
        other => {
            return Err(format!(
                "Invalid log_level '{}', expected off, error, warn, info, debug or trace",
                other
            )
            .into());
        }
    }

    if cfg.is_json() && cfg.is_top() {
        return Err("json output cannot be combined with top mode".into());
    }

    cfg.filter()?;

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    // Positionals
    if let Some(duration) = args.duration {
        config.interval_seconds = Some(duration);
    }
    if let Some(count) = args.count {
        config.count = Some(count);
    }

    // Command column
    if args.comm {
        config.command_style = Some(CommandStyle::Comm);
    } else if args.long {
        config.command_style = Some(CommandStyle::Long);
    } else if args.short {
        config.command_style = Some(CommandStyle::Short);
    }
    if args.strip_dirname {
        config.strip_dirname = Some(true);
    }

    // Output
    if args.arrows {
        config.arrows = Some(true);
    }
    if args.top {
        config.top = Some(true);
    }
    if args.top_totals {
        config.top_totals = Some(true);
    }
    if args.json {
        config.json = Some(true);
        config.top = Some(false);
        config.top_totals = Some(false);
    }
    if let Some(sort) = args.sort {
        config.sort = Some(sort.into());
    }

    // Parse comma-separated filter list
    if let Some(list) = &args.pids {
        config.filter = Some(
            list.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        );
    }

    if let Some(root) = &args.proc_root {
        config.proc_root = Some(root.clone());
    }
    if let Some(level) = args.log_level {
        config.log_level = Some(level.as_str().to_string());
    }

    Ok(config)
}

/// Enhanced configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        if !p.exists() {
            return Err(format!("Config file not found: {}", p.display()).into());
        }
        p.to_path_buf()
    } else {
        // Try default locations
        let defaults = [
            "/etc/faultstat/faultstat.yaml",
            "/etc/faultstat/faultstat.yml",
            "/etc/faultstat/faultstat.json",
            "./faultstat.yaml",
            "./faultstat.yml",
            "./faultstat.json",
            "./faultstat.toml",
        ];

        match defaults.iter().map(Path::new).find(|p| p.exists()) {
            Some(p) => p.to_path_buf(),
            None => return Ok(Config::default()),
        }
    };

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    println!("{output}");
    Ok(())
}
