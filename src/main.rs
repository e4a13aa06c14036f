//! faultstat - version 0.1.0
//!
//! Per-process page fault monitor with tracing logging.
//! This is the main entry point that resolves configuration, sets up logging
//! and runs the sampling loop.

mod cli;
mod config;
mod prompt;
mod startup_checks;

use anyhow::{anyhow, Context};
use clap::Parser;
use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{debug, info, Level};

use cli::Args;
use config::{resolve_config, show_config, validate_effective_config, Config};
use faultstat::display::{Display, PlainDisplay, TopDisplay};
use faultstat::input::default_key_source;
use faultstat::process::Scanner;
use faultstat::{signals, Sampler};

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config) -> anyhow::Result<()> {
    let log_level = match config.log_level() {
        "off" => return Ok(()),
        "error" => Level::ERROR,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::WARN,
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            let subscriber = builder.with_ansi(false).with_writer(Mutex::new(file)).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            let subscriber = builder.with_writer(io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    info!("Logging initialized with level: {}", log_level);
    Ok(())
}

/// Prompts run only for a bare invocation from a terminal.
fn should_prompt(argc: usize, config: &Config) -> bool {
    argc == 1 && io::stdin().is_terminal() && !config.is_json()
}

async fn run(args: Args, argc: usize) -> anyhow::Result<()> {
    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args).map_err(|e| anyhow!("{e}"))?;

        if args.check_config {
            validate_effective_config(&config).map_err(|e| anyhow!("Configuration invalid: {e}"))?;
            println!("Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format).map_err(|e| anyhow!("{e}"));
    }

    let mut config = resolve_config(&args).map_err(|e| anyhow!("{e}"))?;

    if should_prompt(argc, &config) {
        prompt::apply_prompts(&mut config, &mut io::stdin().lock(), &mut io::stdout())?;
    }

    validate_effective_config(&config).map_err(|e| anyhow!("Configuration invalid: {e}"))?;

    setup_logging(&config)?;

    info!("Starting faultstat {}", env!("CARGO_PKG_VERSION"));

    let proc_root = config.proc_root();
    startup_checks::validate_requirements(&proc_root)?;

    let scanner = Scanner::new(&proc_root, config.identity_options(), config.filter()?);
    let ctx = config.run_context();
    let display: Box<dyn Display> = if ctx.top {
        Box::new(TopDisplay::stdout())
    } else {
        Box::new(PlainDisplay::stdout())
    };

    let sampler = Sampler::new(
        scanner,
        ctx,
        display,
        default_key_source(),
        config.sampler_config(),
    )?;

    let (_signal_tasks, events) = signals::install()?;
    let summary = sampler.run(events).await?;

    debug!(
        "Rendered {} ticks{}",
        summary.ticks,
        if summary.stopped { ", stopped early" } else { "" }
    );
    Ok(())
}

/// Main application entry point.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let argc = std::env::args_os().len();
    let args = Args::parse();

    match run(args, argc).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
