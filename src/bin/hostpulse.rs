//! hostpulse - terminal dashboard for live host telemetry.
//!
//! Run: `hostpulse`, or `hostpulse --refresh 500 --theme mono`.

use anyhow::{Context, Result};
use clap::Parser;
use hostpulse::monitor::{App, Config};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// hostpulse: live CPU, memory, network, disk and process dashboard
#[derive(Parser, Debug)]
#[command(name = "hostpulse")]
#[command(version)]
#[command(about = "Terminal dashboard for live host telemetry", long_about = None)]
struct Cli {
    /// Sampling period in milliseconds (overrides the config file)
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Config file path
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Theme name (overrides the config file)
    #[arg(short, long)]
    theme: Option<String>,

    /// Log file path
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable mouse capture
    #[arg(long)]
    no_mouse: bool,

    /// Sample on the UI thread instead of a background worker
    #[arg(long)]
    inline_sampling: bool,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hostpulse").join("config.yaml"))
}

fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join("hostpulse").join("hostpulse.log"))
}

/// Initializes the tracing subscriber. The terminal owns stdout, so logs
/// go to a file; without a usable path logging stays off.
fn init_logging(path: Option<PathBuf>, verbose: u8) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hostpulse={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

/// File, then CLI overrides, then validation.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config.as_ref() {
        Some(path) => Config::load(path)?,
        None => match default_config_path() {
            Some(path) => Config::load_or_default(path)?,
            None => Config::default(),
        },
    };

    if let Some(ms) = cli.refresh {
        config.global.poll_period_ms = ms;
    }
    if let Some(theme) = &cli.theme {
        config.theme.clone_from(theme);
    }
    if cli.no_mouse {
        config.global.mouse = false;
    }
    if cli.inline_sampling {
        config.global.background_sampling = false;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file.clone().or_else(default_log_path), cli.verbose)?;

    let config = load_config(&cli).context("invalid configuration")?;
    let mut app = App::new(config)?;
    app.run()?;

    Ok(())
}
