//! Terminal demo of multi-step navigation through a tabbed screen hierarchy.

mod app;
mod model;
mod screens;
mod state;

use anyhow::Context as _;
use clap::Parser;
use nav_nexus::{ConflictPolicy, RouterConfig};
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Router configuration (TOML). Without one, conflicting routes are rejected.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the log; the terminal belongs to the UI.
    #[arg(long, default_value = "nav-demo.log")]
    log_file: PathBuf,

    /// Simulated screen transition length in milliseconds.
    #[arg(long, default_value_t = 150)]
    transition_ms: u64,

    #[arg(long, default_value_t = LevelFilter::Debug)]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_file = File::create(&args.log_file)
        .with_context(|| format!("Failed to create {}", args.log_file.display()))?;
    WriteLogger::init(args.log_level, Config::default(), log_file)?;

    let config = match &args.config {
        Some(path) => RouterConfig::load(path)?,
        None => RouterConfig::default().on_conflict(ConflictPolicy::Reject),
    };
    log::info!("Starting with {:?}", config);

    let rt = Runtime::new().context("Failed to start tokio")?;
    rt.block_on(async move {
        let app = app::App::new(config, Duration::from_millis(args.transition_ms));
        app.run().await
    })
}
