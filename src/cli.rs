//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gitmark static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root (the git work tree), defaults to the current directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Content directory path (relative to project root)
    #[arg(short, long)]
    pub content: Option<PathBuf>,

    /// Production output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file name (default: gitmark.toml)
    #[arg(short = 'C', long, default_value = "gitmark.toml")]
    pub config: PathBuf,

    /// Bypass the persistent content cache for this run
    #[arg(long)]
    pub no_cache: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum Commands {
    /// Build the production site from committed documents, then exit
    Build,

    /// Build development (with drafts) and production sites, rebuild on change
    Dev {
        /// Override the debounce window in milliseconds
        #[arg(short, long)]
        debounce: Option<u64>,
    },
}

impl Cli {
    pub const fn is_dev(&self) -> bool {
        matches!(self.command, Commands::Dev { .. })
    }
}
