//! Enumerate documents and attach their history.
//!
//! # Sources
//!
//! - **Committed**: markdown files in the index below the content directory.
//!   Dates come from `git log`, the body from the latest commit touching the
//!   file (not the work tree), so unpublished edits never leak.
//! - **Drafts**: markdown files `git status` reports as new or changed,
//!   read from the work tree. Only the development build includes them.
//!
//! History lookups and bodies go through the [`ContentCache`].

use crate::data::{
    CacheKey, ContentCache, Document,
    cache::{get_or_insert_json, get_or_insert_with},
};
use crate::log;
use crate::utils::{
    git::{self, DiffFilter, HistoryError, Provenance, Repo, Revision},
    slug::is_markdown,
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct DocumentLoader<'a> {
    repo: &'a Repo,
    cache: &'a dyn ContentCache,
    /// Content directory, relative to the repository root.
    content: PathBuf,
}

impl<'a> DocumentLoader<'a> {
    /// `content` is an absolute path inside the repository's work tree.
    pub fn new(repo: &'a Repo, cache: &'a dyn ContentCache, content: &Path) -> Result<Self> {
        let content = repo.relative(content)?.to_path_buf();
        Ok(Self {
            repo,
            cache,
            content,
        })
    }

    /// Committed documents, newest first (ties broken by path).
    pub fn committed(&self) -> Result<Vec<Document>> {
        let Some(head) = self.repo.head_id() else {
            log!("docs"; "no commits yet");
            return Ok(Vec::new());
        };

        let files: Vec<PathBuf> = self
            .repo
            .tracked_files(&self.content)?
            .into_iter()
            .filter(|p| is_markdown(p))
            .collect();

        let results: Vec<Result<Option<Document>>> = files
            .par_iter()
            .map(|path| self.load_committed(path, &head))
            .collect();

        let mut docs = Vec::with_capacity(results.len());
        for result in results {
            if let Some(doc) = result? {
                docs.push(doc);
            }
        }

        sort_newest_first(&mut docs);
        Ok(docs)
    }

    /// Uncommitted documents, sorted by path, all dated `now`.
    pub fn drafts(&self, now: i64) -> Result<Vec<Document>> {
        let mut files: Vec<PathBuf> = git::dirty_files(self.repo, &self.content)?
            .into_iter()
            .filter(|p| is_markdown(p))
            .collect();
        files.sort();

        files
            .into_iter()
            .map(|path| {
                let abs = self.repo.root().join(&path);
                let markdown_body = fs::read_to_string(&abs)
                    .with_context(|| format!("Failed to read draft `{}`", abs.display()))?;

                Ok(Document {
                    file_path: path,
                    date_added: now,
                    date_modified: None,
                    draft: true,
                    markdown_body,
                })
            })
            .collect()
    }

    fn load_committed(&self, path: &Path, head: &str) -> Result<Option<Document>> {
        if !self.repo.root().join(path).is_file() {
            log!("docs"; "skipping {}: tracked but missing from disk", path.display());
            return Ok(None);
        }

        let provenance = match git::provenance(|filter| self.revision(path, head, filter)) {
            Ok(provenance) => provenance,
            Err(e) if is_not_found(&e) => {
                log!("docs"; "skipping {}: staged but not committed", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let markdown_body = self.body(path, &provenance)?;
        Ok(Some(Document {
            file_path: path.to_path_buf(),
            date_added: provenance.date_added,
            date_modified: provenance.date_modified,
            draft: false,
            markdown_body,
        }))
    }

    fn revision(&self, path: &Path, head: &str, filter: DiffFilter) -> Result<Revision> {
        let key = CacheKey::history(filter, head, path);
        get_or_insert_json(self.cache, &key, || git::latest_change(self.repo, path, filter))
    }

    fn body(&self, path: &Path, provenance: &Provenance) -> Result<String> {
        let rev = &provenance.revision.id;
        let key = CacheKey::blob(rev, path);
        get_or_insert_with(self.cache, &key, || self.repo.show(rev, path))
    }
}

/// Descending `date_added`, ties broken by path so output is deterministic.
pub fn sort_newest_first(docs: &mut [Document]) {
    docs.sort_by(|a, b| {
        b.date_added
            .cmp(&a.date_added)
            .then_with(|| a.file_path.cmp(&b.file_path))
    });
}

fn is_not_found(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<HistoryError>(),
        Some(HistoryError::NotFound { .. })
    )
}
