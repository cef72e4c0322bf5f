//! Site configuration management for `gitmark.toml`.
//!
//! # Sections
//!
//! | Section          | Purpose                                          |
//! |------------------|--------------------------------------------------|
//! | `[site]`         | Title and the shared head/header/footer fragments|
//! | `[build]`        | Source and output directories, minify, cache     |
//! | `[images]`       | Local vs externally hosted image base path       |
//! | `[watch]`        | Debounce window for development rebuilds         |
//! | `[variables]`    | `{{ name }}` substitutions available to documents|
//!
//! The configuration is loaded once, leaked to `&'static` in `main`, and
//! never mutated afterwards.

mod build;
pub mod defaults;
mod error;
mod site;
mod watch;

pub use build::{BuildConfig, CacheConfig};
pub use error::ConfigError;
pub use site::{ImagesConfig, SiteSection};
pub use watch::WatchConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Variable name reserved for the per-target image base path.
pub const IMAGE_BASE_PATH_VAR: &str = "imageBasePath";

/// Root configuration structure representing gitmark.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    /// User-defined template variables
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load the config file named on the command line (defaults apply when
    /// it does not exist), apply CLI overrides and normalize paths.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli, root);
        config.validate()?;
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Update configuration with CLI arguments
    fn update_with_cli(&mut self, cli: &Cli, root: &Path) {
        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());
        if cli.no_cache {
            self.build.cache.enable = false;
        }
        if let Commands::Dev { debounce } = cli.command {
            Self::update_option(&mut self.watch.debounce_ms, debounce.as_ref());
        }

        self.config_path = Self::normalize_path(&root.join(&cli.config));
        self.update_path_with_root(root);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve every directory against the root and make it absolute.
    pub fn update_path_with_root(&mut self, root: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        let build = &mut self.build;
        build.content = Self::normalize_path(&root.join(&build.content));
        build.styles = Self::normalize_path(&root.join(&build.styles));
        build.assets = Self::normalize_path(&root.join(&build.assets));
        build.output = Self::normalize_path(&root.join(&build.output));
        build.dev_output = Self::normalize_path(&root.join(&build.dev_output));

        let cache = PathBuf::from(shellexpand::tilde(&build.cache.path.to_string_lossy()).as_ref());
        build.cache.path = Self::normalize_path(&root.join(cache));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration state after paths have been resolved
    pub fn validate(&self) -> Result<()> {
        if !self.build.content.is_dir() {
            bail!(ConfigError::Validation(format!(
                "[build.content] `{}` is not a directory",
                self.build.content.display()
            )));
        }

        if self.build.output == self.build.dev_output {
            bail!(ConfigError::Validation(
                "[build.output] and [build.dev_output] must differ".into()
            ));
        }

        // Each build empties its output directory, and writes under a
        // watched directory would retrigger the watcher.
        let build = &self.build;
        for output in [&build.output, &build.dev_output] {
            if build.content.starts_with(output) || self.get_root().starts_with(output) {
                bail!(ConfigError::Validation(format!(
                    "output directory `{}` would contain the sources",
                    output.display()
                )));
            }
            for source in [&build.content, &build.styles, &build.assets] {
                if output.starts_with(source) {
                    bail!(ConfigError::Validation(format!(
                        "output directory `{}` is inside source directory `{}`",
                        output.display(),
                        source.display()
                    )));
                }
            }
        }

        if self.watch.debounce_ms == 0 {
            bail!(ConfigError::Validation(
                "[watch.debounce_ms] must be greater than zero".into()
            ));
        }

        if self.variables.contains_key(IMAGE_BASE_PATH_VAR) {
            bail!(ConfigError::Validation(format!(
                "[variables.{IMAGE_BASE_PATH_VAR}] is reserved, set [images] instead"
            )));
        }

        Ok(())
    }
}
