//! Output file names and display titles derived from document paths.

use std::path::Path;

/// Prefix that keeps draft pages visibly apart from published ones.
pub const DRAFT_PREFIX: &str = "DRAFT--";

/// Output file name for a document.
///
/// `src/documents/my-post.md` → `my-post.html`, or `DRAFT--my-post.html`
/// for drafts.
pub fn slug(path: &Path, draft: bool) -> String {
    let stem = stem(path);
    if draft {
        format!("{DRAFT_PREFIX}{stem}.html")
    } else {
        format!("{stem}.html")
    }
}

/// Human readable title: the file stem with dashes turned into spaces.
///
/// The result is HTML-escaped and safe to embed in markup.
pub fn title(path: &Path) -> String {
    let raw = stem(path).replace('-', " ");
    quick_xml::escape::escape(raw.as_str()).into_owned()
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether a path names a markdown document.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}
