//! `vedit`: a modal terminal text editor.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use vedit::app::{open_buffer, App};
use vedit::config::Config;
use vedit::registry::Registry;

/// A modal, vi-like text editor.
#[derive(Debug, Parser)]
#[command(name = "vedit", version, about)]
struct Args {
    /// File to open. Created on the first `:w` if it does not exist.
    path: Option<PathBuf>,

    /// Configuration file to use instead of the default location.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file. Nothing is logged without it.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path, default_filter: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("failed to install log subscriber")
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(log_file) = &args.log_file {
        init_logging(log_file, &config.log.filter)?;
    }
    let theme = config.theme.to_theme().context("invalid theme")?;

    let state = open_buffer(args.path.as_deref());
    let mut app = App::new(state, Arc::new(Registry::new()), config.engine);
    app.run_in_terminal(theme)
        .context("terminal error while editing")?;
    Ok(())
}
