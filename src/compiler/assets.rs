use super::collect_all_files;
use crate::log;
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Copy every file under `src` into `dst`, keeping relative paths.
///
/// A missing `src` is logged and skipped. Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        log!("build"; "skipping {}: not found", src.display());
        return Ok(0);
    }

    let files = collect_all_files(src);
    for file in &files {
        let rel = file.strip_prefix(src)?;
        let dest = dst.join(rel);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(file, &dest)
            .with_context(|| format!("Failed to copy `{}`", file.display()))?;
    }

    Ok(files.len())
}
