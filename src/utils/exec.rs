//! External command execution utilities.
//!
//! Provides a macro and functions for running commands (mostly `git`) with
//! captured output and consistent error reporting.

use crate::log;
use anyhow::{Context, Result};
use std::{ffi::OsString, path::Path, process::Command, process::Output};

// ============================================================================
// Macros
// ============================================================================

/// Run an external command with arguments and capture its output.
///
/// # Examples
/// ```ignore
/// exec!(root; ["git"]; "log", "-n1", "--", path)?;
/// ```
#[macro_export]
macro_rules! exec {
    ($root:expr; $cmd:expr; $($arg:expr),* $(,)?) => {{
        $crate::utils::exec::exec(
            $root,
            &$crate::utils::exec::to_cmd_vec($cmd),
            &$crate::utils::exec::filter_args(&[$($crate::utils::exec::to_os($arg)),*]),
        )
    }};
}

// ============================================================================
// Argument Conversion
// ============================================================================

/// Convert to OsString.
#[inline]
pub fn to_os<S: Into<OsString>>(s: S) -> OsString {
    s.into()
}

/// Trait for converting to command vector.
pub trait ToCmd {
    fn to_cmd(self) -> Vec<OsString>;
}

impl<const N: usize> ToCmd for [&str; N] {
    #[inline]
    fn to_cmd(self) -> Vec<OsString> {
        self.into_iter().map(OsString::from).collect()
    }
}

/// Convert command to Vec<OsString>.
#[inline]
pub fn to_cmd_vec<C: ToCmd>(cmd: C) -> Vec<OsString> {
    cmd.to_cmd()
}

/// Filter out empty args.
#[inline]
pub fn filter_args(args: &[OsString]) -> Vec<OsString> {
    args.iter().filter(|a| !a.is_empty()).cloned().collect()
}

// ============================================================================
// Command Execution
// ============================================================================

/// Execute a command in `root` and capture its output.
///
/// Anything the command writes to stderr on success is logged (git uses it
/// for warnings) but does not fail the call.
///
/// # Errors
/// Returns error if command fails to execute or returns non-zero exit code.
pub fn exec(root: &Path, cmd: &[OsString], args: &[OsString]) -> Result<Output> {
    let (name, mut command) = prepare(root, cmd, args)?;

    let output = command
        .output()
        .with_context(|| format!("Failed to execute `{name}`"))?;

    check_output(&name, &output)?;
    Ok(output)
}

/// Prepare a Command from components.
fn prepare(root: &Path, cmd: &[OsString], args: &[OsString]) -> Result<(String, Command)> {
    let name = cmd
        .first()
        .and_then(|s| s.to_str())
        .context("Empty command")?
        .to_owned();

    let mut command = Command::new(&cmd[0]);
    command.args(&cmd[1..]).args(args).current_dir(root);

    Ok((name, command))
}

/// Fail on non-zero exit, otherwise log stderr lines as warnings.
fn check_output(name: &str, output: &Output) -> Result<()> {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();

    if !output.status.success() {
        let mut msg = format!("Command `{name}` failed with {}", output.status);
        if !stderr.is_empty() {
            msg.push('\n');
            msg.push_str(stderr);
        }
        anyhow::bail!(msg);
    }

    for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
        log!(name; "{line}");
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
