//! Per-file provenance from `git log`.

use super::Repo;
use crate::exec;
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use thiserror::Error;

/// `[%ct][%H]` → commit seconds and hash.
static LOG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(\d+)\]\[([0-9a-f]+)\]$").expect("valid regex"));

/// Which kinds of change a history query matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffFilter {
    /// The commit that introduced the file.
    Added,
    /// The latest commit that introduced or changed the file.
    AddedOrModified,
}

impl DiffFilter {
    pub const fn as_arg(self) -> &'static str {
        match self {
            Self::Added => "A",
            Self::AddedOrModified => "AM",
        }
    }
}

impl fmt::Display for DiffFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// A commit that touched a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Commit time in milliseconds since the epoch.
    pub timestamp: i64,
    /// Full commit hash.
    pub id: String,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("no commit matching --diff-filter={filter} for `{}`", path.display())]
    NotFound { path: PathBuf, filter: DiffFilter },

    #[error("unexpected `git log` output for `{}`: {output:?}", path.display())]
    Malformed { path: PathBuf, output: String },
}

/// Where a committed file came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub date_added: i64,
    /// Only set when the latest change is a different commit time than the add.
    pub date_modified: Option<i64>,
    /// Latest commit touching the file; its content is the published body.
    pub revision: Revision,
}

impl Provenance {
    pub fn new(added: &Revision, latest: Revision) -> Self {
        let date_modified = (added.timestamp != latest.timestamp).then_some(latest.timestamp);
        Self {
            date_added: added.timestamp,
            date_modified,
            revision: latest,
        }
    }
}

/// Most recent commit matching `filter` that touched `path`.
///
/// `path` is relative to the repository root. Command failures surface as
/// `anyhow` errors; an empty or unparsable log as [`HistoryError`].
pub fn latest_change(repo: &Repo, path: &Path, filter: DiffFilter) -> Result<Revision> {
    let output = exec!(
        repo.root();
        ["git"];
        "log",
        "--format=[%ct][%H]",
        format!("--diff-filter={filter}"),
        "-n1",
        "--",
        path
    )?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_log(&stdout, path, filter)?)
}

/// Add date, optional modify date and latest revision of one file.
///
/// `lookup` answers a single history query, usually [`latest_change`]
/// behind a cache.
pub fn provenance(mut lookup: impl FnMut(DiffFilter) -> Result<Revision>) -> Result<Provenance> {
    let added = lookup(DiffFilter::Added)?;
    let latest = lookup(DiffFilter::AddedOrModified)?;
    Ok(Provenance::new(&added, latest))
}

fn parse_log(stdout: &str, path: &Path, filter: DiffFilter) -> Result<Revision, HistoryError> {
    let line = stdout.trim();
    if line.is_empty() {
        return Err(HistoryError::NotFound {
            path: path.to_path_buf(),
            filter,
        });
    }

    let malformed = || HistoryError::Malformed {
        path: path.to_path_buf(),
        output: line.to_owned(),
    };

    let caps = LOG_LINE.captures(line).ok_or_else(malformed)?;
    let seconds: i64 = caps[1].parse().map_err(|_| malformed())?;

    Ok(Revision {
        timestamp: seconds * 1000,
        id: caps[2].to_owned(),
    })
}
