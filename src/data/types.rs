use crate::utils::slug;
use std::path::PathBuf;

/// A markdown file plus the provenance derived from history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Repository-relative path, unique within one load.
    pub file_path: PathBuf,
    /// Milliseconds since the epoch of the commit that added the file
    /// (load time for drafts).
    pub date_added: i64,
    pub date_modified: Option<i64>,
    /// Present in the work tree only.
    pub draft: bool,
    pub markdown_body: String,
}

impl Document {
    /// Output file name, see [`slug::slug`].
    pub fn slug(&self) -> String {
        slug::slug(&self.file_path, self.draft)
    }

    /// Display title derived from the file name.
    pub fn title(&self) -> String {
        slug::title(&self.file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str, draft: bool) -> Document {
        Document {
            file_path: PathBuf::from(path),
            date_added: 0,
            date_modified: None,
            draft,
            markdown_body: String::new(),
        }
    }

    #[test]
    fn test_slug() {
        assert_eq!(doc("src/documents/my-post.md", false).slug(), "my-post.html");
        assert_eq!(doc("src/documents/my-post.md", true).slug(), "DRAFT--my-post.html");
    }

    #[test]
    fn test_title() {
        assert_eq!(doc("src/documents/my-post.md", true).title(), "my post");
    }
}
