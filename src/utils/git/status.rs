//! Uncommitted files from `git status`.

use super::Repo;
use crate::exec;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Files under `dir` that differ from `HEAD` and still exist in the work
/// tree: untracked, added, modified, renamed.
///
/// Paths are repository-relative. A clean tree yields an empty list.
pub fn dirty_files(repo: &Repo, dir: &Path) -> Result<Vec<PathBuf>> {
    let output = exec!(
        repo.root();
        ["git"];
        "status",
        "--porcelain=v1",
        "-z",
        "--untracked-files=all",
        "--",
        dir
    )?;

    Ok(parse_porcelain(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `git status --porcelain=v1 -z` output.
///
/// Each record is `XY PATH`, NUL terminated. Renames and copies are followed
/// by an extra record holding the source path, which is skipped. Records
/// whose status mentions a deletion are dropped.
pub fn parse_porcelain(output: &str) -> Vec<PathBuf> {
    let mut records = output.split('\0').filter(|r| !r.is_empty());
    let mut files = Vec::new();

    while let Some(record) = records.next() {
        let (Some(status), Some(path)) = (record.get(..2), record.get(3..)) else {
            continue;
        };

        if status.contains(['R', 'C']) {
            records.next();
        }
        if status.contains('D') || path.is_empty() {
            continue;
        }
        files.push(PathBuf::from(path));
    }

    files
}
