//! Turning repository content into pages.
//!
//! - **documents**: enumerate committed documents and drafts with provenance
//! - **variables**: `{{ name }}` substitution outside fenced code
//! - **markdown**: markdown to HTML, **highlight** for fenced code
//! - **pages**: wrap rendered bodies into full pages, build the home page
//! - **assets**: copy styles and static assets
//!
//! # Flow
//!
//! ```text
//! DocumentLoader ──► substitute() ──► Markdown::render() ──► document_page()
//!       │                                                        │
//!       ▼                                                        ▼
//!   Document[] ───────────────────────► home_page()          page files
//! ```

pub mod assets;
pub mod documents;
pub mod highlight;
pub mod markdown;
pub mod pages;
pub mod variables;

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Collect all files from a directory recursively.
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}
