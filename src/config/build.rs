//! `[build]` section configuration.
//!
//! Source directories, the two output directories, minification and the
//! persistent cache.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in gitmark.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// content = "src/documents"   # Markdown documents tracked by git
/// output = "build"            # Production output (committed documents only)
/// dev_output = ".local-dev-build"
/// minify = false
///
/// [build.cache]
/// enable = true
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Markdown source directory, must live inside the git work tree.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Stylesheets, copied to `<output>/styles`.
    #[serde(default = "defaults::build::styles")]
    #[educe(Default = defaults::build::styles())]
    pub styles: PathBuf,

    /// Static assets, copied to `<output>/assets`.
    #[serde(default = "defaults::build::assets")]
    #[educe(Default = defaults::build::assets())]
    pub assets: PathBuf,

    /// Production output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Development output directory (drafts included).
    #[serde(default = "defaults::build::dev_output")]
    #[educe(Default = defaults::build::dev_output())]
    pub dev_output: PathBuf,

    /// Minify HTML output.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// `[build.cache]` section - persistent memoization of git queries and renders.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Database file, relative to the project root.
    #[serde(default = "defaults::build::cache::path")]
    #[educe(Default = defaults::build::cache::path())]
    pub path: PathBuf,
}
