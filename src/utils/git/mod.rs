//! Git access: repository handle, per-file history and working-tree status.
//!
//! Index and object reads go through `gix`; history and status queries shell
//! out to the `git` executable via [`exec!`](crate::exec).

mod history;
mod repo;
mod status;

pub use history::{DiffFilter, HistoryError, Provenance, Revision, latest_change, provenance};
pub use repo::Repo;
pub use status::dirty_files;

#[cfg(test)]
pub(crate) mod testing {
    //! Throwaway repositories with deterministic commit dates.

    use std::{fs, path::Path, process::Command};
    use tempfile::TempDir;

    /// Initialize an empty repository.
    pub fn init() -> TempDir {
        let dir = TempDir::new().unwrap();
        git(dir.path(), &["init", "-q"], None);
        dir
    }

    /// Write a file relative to the repository root, creating parents.
    pub fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Stage everything and commit at the given Unix time (seconds).
    pub fn commit_all(root: &Path, message: &str, seconds: i64) {
        git(root, &["add", "-A"], None);
        git(root, &["commit", "-q", "-m", message], Some(seconds));
    }

    /// Run git with a fixed identity, failing the test on a non-zero exit.
    pub fn git(root: &Path, args: &[&str], seconds: Option<i64>) {
        let mut command = Command::new("git");
        command.current_dir(root).args([
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "init.defaultBranch=main",
        ]);
        if let Some(seconds) = seconds {
            let date = format!("{seconds} +0000");
            command
                .env("GIT_AUTHOR_DATE", &date)
                .env("GIT_COMMITTER_DATE", &date);
        }

        let output = command.args(args).output().unwrap();
        assert!(
            output.status.success(),
            "git {args:?}: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
}
