//! Terminal logging with colored module prefixes.
//!
//! ```ignore
//! log!("docs"; "loaded {} documents", count);
//! let pages = timed("render pages", || render_all(&docs));
//! ```

use colored::{ColoredString, Colorize};
use crossterm::{
    execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{Write, stdout},
    sync::OnceLock,
    time::Instant,
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Length of brackets around module name plus the trailing space: "[] "
const PREFIX_OVERHEAD: usize = 3;

#[inline]
const fn calc_prefix_len(module_len: usize) -> usize {
    module_len + PREFIX_OVERHEAD
}

/// Get terminal width, cached after first call.
/// Falls back to 120 columns if detection fails (e.g. output is piped).
fn get_terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a message with a colored module prefix.
///
/// Single-line messages are truncated to the terminal width; multi-line
/// messages (command stderr, error chains) are printed as-is.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module, &module.to_ascii_lowercase());
    let width = get_terminal_width() as usize;

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();

    let message = if message.contains('\n') {
        message
    } else {
        truncate_str(message, width.saturating_sub(calc_prefix_len(module.len())))
    };

    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Run `f` and log how long it took under the `build` prefix.
pub fn timed<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    log!("build"; "{label} took {}ms", start.elapsed().as_millis());
    result
}

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "watch" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        "warn" => prefix.bright_magenta().bold(),
        "git" | "cache" => prefix.bright_blue().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to fit within `max_len` bytes on a UTF-8 boundary.
#[inline]
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_prefix_len() {
        // "docs" -> "[docs] "
        assert_eq!(calc_prefix_len(4), 7);
        assert_eq!(calc_prefix_len(0), 3);
    }

    #[test]
    fn test_truncate_str_fits() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_str_cuts() {
        assert_eq!(truncate_str("hello world", 5), "hello");
        assert_eq!(truncate_str("hello", 0), "");
    }

    #[test]
    fn test_truncate_str_unicode_boundary() {
        // "日本" is 6 bytes; byte 4 falls inside the second character
        assert_eq!(truncate_str("日本", 4), "日");
        assert_eq!(truncate_str("a日b", 2), "a");
    }

    #[test]
    fn test_timed_returns_value() {
        let value = timed("noop", || 41 + 1);
        assert_eq!(value, 42);
    }
}
