//! gitmark - a static site generator that dates documents from git history.

mod build;
mod cli;
mod compiler;
mod config;
mod data;
mod logger;
mod utils;
mod watch;

use anyhow::Result;
use build::{Mode, Pipeline};
use clap::Parser;
use cli::Cli;
use config::SiteConfig;
use data::ContentCache;
use std::process::ExitCode;
use watch::watch_for_changes_blocking;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config: &'static SiteConfig = match SiteConfig::load(&cli) {
        Ok(config) => Box::leak(Box::new(config)),
        Err(e) => {
            log!("error"; "{e:#}");
            return ExitCode::FAILURE;
        }
    };

    if config.config_path.exists() {
        log!("build"; "config {}", config.config_path.display());
    } else {
        log!("build"; "no {}, using defaults", cli.config.display());
    }

    // Opened once and closed on every exit path.
    let cache = data::cache::open(&config.build.cache);
    let result = run(&cli, config, cache.as_ref());
    let closed = cache.close();

    if let Err(e) = &closed {
        log!("error"; "failed to close cache: {e:#}");
    }
    match result {
        Ok(()) if closed.is_ok() => ExitCode::SUCCESS,
        Ok(()) => ExitCode::FAILURE,
        Err(e) => {
            log!("error"; "{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &'static SiteConfig, cache: &dyn ContentCache) -> Result<()> {
    let pipeline = Pipeline::new(config, cache)?;

    if !cli.is_dev() {
        return pipeline.run(Mode::Production);
    }

    // A broken document should not stop the watcher from starting.
    if let Err(e) = pipeline.run(Mode::Development) {
        log!("error"; "{e:#}");
    }
    watch_for_changes_blocking(&pipeline)
}
