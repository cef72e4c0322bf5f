//! Site building orchestration.
//!
//! # Architecture
//!
//! ```text
//! Pipeline::run(mode)
//!     │
//!     └── build(target)            once per target, development first
//!             │
//!             ├── load()           committed (+ drafts for development)
//!             ├── check_names()    no two pages share an output file
//!             ├── render_all()     substitute + markdown, parallel
//!             └── write()          empty output, index.html, pages, static trees
//! ```
//!
//! Nothing touches the output directory until every document has rendered,
//! so a failing document leaves the previous build in place.

use crate::{
    compiler::{
        assets::copy_tree,
        documents::DocumentLoader,
        highlight::Highlighter,
        markdown::Markdown,
        pages::{document_page, home_page},
        variables::{Variables, site_variables, substitute},
    },
    config::SiteConfig,
    data::{CacheKey, ContentCache, Document, cache::get_or_insert_with},
    log,
    logger::timed,
    utils::{date::now_ms, git::Repo, minify::minify_page},
};
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::{fmt, fs, path::Path, time::Instant};

/// Output name of the home page, unavailable to documents.
const HOME_PAGE: &str = "index.html";

/// One of the two output sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Drafts included, local image paths.
    Development,
    /// Committed documents only, hosted image paths.
    Production,
}

impl Target {
    pub fn output(self, config: &SiteConfig) -> &Path {
        match self {
            Self::Development => &config.build.dev_output,
            Self::Production => &config.build.output,
        }
    }

    pub fn image_base_path(self, config: &SiteConfig) -> &str {
        match self {
            Self::Development => &config.images.local,
            Self::Production => config.images.production(),
        }
    }

    pub const fn includes_drafts(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}

/// What a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Development output, then production output.
    Development,
    Production,
}

impl Mode {
    pub const fn targets(self) -> &'static [Target] {
        match self {
            Self::Development => &[Target::Development, Target::Production],
            Self::Production => &[Target::Production],
        }
    }
}

/// Everything a build needs, created once per process.
pub struct Pipeline<'a> {
    config: &'static SiteConfig,
    repo: Repo,
    cache: &'a dyn ContentCache,
    highlighter: Highlighter,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'static SiteConfig, cache: &'a dyn ContentCache) -> Result<Self> {
        let repo = Repo::discover(&config.build.content)?;
        log!("git"; "repository at {}", repo.root().display());

        Ok(Self {
            config,
            repo,
            cache,
            highlighter: Highlighter::new(),
        })
    }

    pub fn config(&self) -> &'static SiteConfig {
        self.config
    }

    /// Build every target of `mode`, stopping at the first failure.
    pub fn run(&self, mode: Mode) -> Result<()> {
        for &target in mode.targets() {
            self.build(target)?;
        }
        Ok(())
    }

    pub fn build(&self, target: Target) -> Result<()> {
        self.build_at(target, now_ms())
    }

    /// Build with drafts dated `now`.
    fn build_at(&self, target: Target, now: i64) -> Result<()> {
        let start = Instant::now();
        let output = target.output(self.config);

        let docs = timed("load documents", || self.load(target, now))?;
        check_names(&docs)?;
        let vars = site_variables(self.config, target.image_base_path(self.config));
        let bodies = timed("render pages", || self.render_all(&docs, &vars))?;
        timed("write pages", || self.write(output, &docs, &bodies))?;

        log!(
            "build";
            "{target}: {} documents in {}ms → {}",
            docs.len(),
            start.elapsed().as_millis(),
            output.display()
        );
        Ok(())
    }

    fn load(&self, target: Target, now: i64) -> Result<Vec<Document>> {
        let loader = DocumentLoader::new(&self.repo, self.cache, &self.config.build.content)?;
        let committed = loader.committed()?;

        if !target.includes_drafts() {
            return Ok(committed);
        }

        let drafts = loader.drafts(now)?;
        if !drafts.is_empty() {
            log!("docs"; "{} drafts", drafts.len());
        }
        Ok(merge_drafts(drafts, committed))
    }

    /// Rendered bodies, index-aligned with `docs`.
    fn render_all(&self, docs: &[Document], vars: &Variables) -> Result<Vec<String>> {
        let markdown = Markdown::new(&self.highlighter);

        docs.par_iter()
            .map(|doc| {
                self.render(&markdown, doc, vars)
                    .with_context(|| format!("Failed to render `{}`", doc.file_path.display()))
            })
            .collect()
    }

    fn render(&self, markdown: &Markdown<'_>, doc: &Document, vars: &Variables) -> Result<String> {
        let source = substitute(&doc.markdown_body, vars)?;

        // Drafts change on every save; only published bodies are worth keeping.
        if doc.draft {
            return Ok(markdown.render(&source)?);
        }

        let key = CacheKey::render(&source);
        get_or_insert_with(self.cache, &key, || Ok(markdown.render(&source)?))
    }

    fn write(&self, output: &Path, docs: &[Document], bodies: &[String]) -> Result<()> {
        if output.exists() {
            fs::remove_dir_all(output)
                .with_context(|| format!("Failed to clear `{}`", output.display()))?;
        }
        fs::create_dir_all(output)
            .with_context(|| format!("Failed to create `{}`", output.display()))?;

        self.write_page(&output.join(HOME_PAGE), &home_page(self.config, docs))?;
        for (doc, body) in docs.iter().zip(bodies) {
            let html = document_page(self.config, doc, body);
            self.write_page(&output.join(doc.slug()), &html)?;
        }

        let build = &self.config.build;
        copy_tree(&build.styles, &output.join("styles"))?;
        copy_tree(&build.assets, &output.join("assets"))?;
        Ok(())
    }

    fn write_page(&self, path: &Path, html: &str) -> Result<()> {
        fs::write(path, minify_page(html, self.config))
            .with_context(|| format!("Failed to write `{}`", path.display()))
    }
}

/// Fail when two documents would be written to the same file, or when a
/// document would replace the home page.
fn check_names(docs: &[Document]) -> Result<()> {
    let mut seen: FxHashMap<String, &Path> = FxHashMap::default();

    for doc in docs {
        let slug = doc.slug();
        if slug == HOME_PAGE {
            bail!(
                "`{}` would be written to `{HOME_PAGE}` and replace the home page",
                doc.file_path.display()
            );
        }
        if let Some(other) = seen.insert(slug, &doc.file_path) {
            bail!(
                "`{}` and `{}` would both be written to `{}`",
                other.display(),
                doc.file_path.display(),
                doc.slug()
            );
        }
    }
    Ok(())
}

/// Drafts first, then committed, stably ordered newest first.
fn merge_drafts(drafts: Vec<Document>, committed: Vec<Document>) -> Vec<Document> {
    let mut docs = drafts;
    docs.extend(committed);
    docs.sort_by(|a, b| b.date_added.cmp(&a.date_added));
    docs
}
