use anyhow::{Context, Result, anyhow};
use gix::{ThreadSafeRepository, bstr::ByteSlice};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

/// Handle to the repository that holds the documents.
///
/// Wraps a [`ThreadSafeRepository`] so rayon workers can each take a
/// thread-local view.
pub struct Repo {
    inner: ThreadSafeRepository,
    root: PathBuf,
}

impl Repo {
    /// Open the repository containing `path`, searching parent directories.
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = gix::discover(path)
            .with_context(|| format!("`{}` is not inside a git repository", path.display()))?;
        let root = repo
            .path()
            .parent()
            .ok_or_else(|| anyhow!("Invalid repository path"))?;
        let root = root
            .canonicalize()
            .with_context(|| format!("Failed to resolve `{}`", root.display()))?;

        Ok(Self {
            inner: repo.into_sync(),
            root,
        })
    }

    /// Work tree root; every repository-relative path is joined onto this.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Express an absolute path relative to the work tree root.
    pub fn relative<'a>(&self, path: &'a Path) -> Result<&'a Path> {
        path.strip_prefix(&self.root).with_context(|| {
            format!(
                "`{}` is outside the repository at `{}`",
                path.display(),
                self.root.display()
            )
        })
    }

    /// Paths recorded in the index below `dir` (repository-relative).
    ///
    /// Conflicted entries appear once per stage in the index and are
    /// collapsed here.
    pub fn tracked_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let repo = self.inner.to_thread_local();
        let index = repo.index_or_empty().context("Failed to read git index")?;

        let mut prefix = to_index_path(dir);
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }

        let files: BTreeSet<PathBuf> = index
            .entries()
            .iter()
            .map(|entry| entry.path(&index))
            .filter(|path| path.starts_with(prefix.as_bytes()))
            .map(|path| PathBuf::from(path.to_str_lossy().into_owned()))
            .collect();

        Ok(files.into_iter().collect())
    }

    /// File content as of `rev` (equivalent of `git show <rev>:<path>`).
    pub fn show(&self, rev: &str, path: &Path) -> Result<String> {
        let repo = self.inner.to_thread_local();
        let revspec = format!("{rev}:{}", to_index_path(path));

        let id = repo
            .rev_parse_single(revspec.as_str())
            .with_context(|| format!("Failed to resolve `{revspec}`"))?;
        let mut object = id
            .object()
            .with_context(|| format!("Failed to read `{revspec}`"))?;

        String::from_utf8(std::mem::take(&mut object.data))
            .with_context(|| format!("`{revspec}` is not valid UTF-8"))
    }

    /// Commit id `HEAD` points at, or `None` in a repository with no commits.
    pub fn head_id(&self) -> Option<String> {
        let repo = self.inner.to_thread_local();
        repo.head_id().ok().map(|id| id.to_string())
    }
}

/// Index paths always use `/`, whatever the platform separator.
fn to_index_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
