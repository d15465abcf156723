#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter connecting the engine's stdio protocol to the
//! orchestrator.
//!
//! Snapshots arrive on stdin, one JSON object per line, and each one is
//! answered with a single batch line on stdout. Logs go to stderr.

mod config;
mod driver;

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env, Target};
use log::info;

use crate::config::Settings;

/// Command-line arguments accepted by the client.
#[derive(Debug, Parser)]
#[command(name = "tidebot", about = "Per-tick decision client for the grid engine")]
struct Args {
    /// TOML configuration file; the bundled defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// First identifier considered for locally requested spawns.
    #[arg(long)]
    first_spawn_id: Option<u64>,
    /// Report units without a resolvable template as failures.
    #[arg(long)]
    strict_templates: bool,
    /// Never request new units.
    #[arg(long)]
    no_spawn: bool,
    /// Log filter, taking precedence over `RUST_LOG`.
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(first_spawn_id) = self.first_spawn_id {
            settings.orchestrator.first_spawn_id = first_spawn_id;
        }
        if self.strict_templates {
            settings.templates.strict = true;
        }
        if self.no_spawn {
            settings.spawning.enabled = false;
        }
    }
}

/// Entry point for the Tidebot command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::bundled()?,
    };
    args.apply(&mut settings);

    let mut orchestrator = settings.build()?;
    info!(
        "tidebot ready: spawn ids from {}, spawning {}",
        settings.orchestrator.first_spawn_id,
        if settings.spawning.enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    driver::run(&mut orchestrator, stdin.lock(), stdout.lock())
}

fn init_logging(filter: Option<&str>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(filter) = filter {
        let _ = builder.parse_filters(filter);
    }
    let _ = builder.target(Target::Stderr);
    builder.init();
}
