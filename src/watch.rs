//! File system watcher for development rebuilds.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐            ┌───────────┐  quiet for   ┌──────────────────────┐
//! │ notify   │──┐         │ Debouncer │  debounce_ms │ Pipeline::run(Dev)   │
//! │ events   │  ├─ mpsc ─▶│ (pending) │─────────────▶│ on the loop thread   │
//! └──────────┘  │         └───────────┘              └──────────────────────┘
//! ┌──────────┐  │
//! │ Ctrl-C   │──┘ Shutdown
//! └──────────┘
//! ```
//!
//! Rebuilds run on the loop thread, so they never overlap. Events that arrive
//! meanwhile wait in the channel and coalesce into one follow-up rebuild.

use crate::{
    build::{Mode, Pipeline},
    config::SiteConfig,
    log,
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{self, RecvTimeoutError},
    time::{Duration, Instant},
};

/// How long to block when nothing is pending.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Messages the loop thread waits on.
enum WatchEvent {
    Fs(notify::Result<Event>),
    Shutdown,
}

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

// =============================================================================
// Debounce State
// =============================================================================

/// Collects changed paths until no event has arrived for `window`.
///
/// Every accepted event restarts the window. Time is passed in so the
/// behavior is testable without sleeping.
struct Debouncer {
    window: Duration,
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self {
            window,
            pending: FxHashSet::default(),
            last_event: None,
        }
    }

    fn add(&mut self, paths: impl IntoIterator<Item = PathBuf>, now: Instant) {
        let mut accepted = false;
        for path in paths {
            if !is_temp_file(&path) {
                self.pending.insert(path);
                accepted = true;
            }
        }
        if accepted {
            self.last_event = Some(now);
        }
    }

    fn ready(&self, now: Instant) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| now.saturating_duration_since(t) >= self.window)
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        let mut paths: Vec<PathBuf> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    /// Time until the window closes, or the idle timeout with nothing pending.
    fn timeout(&self, now: Instant) -> Duration {
        match self.last_event {
            Some(t) if !self.pending.is_empty() => {
                self.window.saturating_sub(now.saturating_duration_since(t))
            }
            _ => IDLE_TIMEOUT,
        }
    }
}

// =============================================================================
// Event Handler
// =============================================================================

/// Rebuild both targets. Failures are logged and the loop keeps going.
fn rebuild(pipeline: &Pipeline<'_>, paths: &[PathBuf]) {
    let root = pipeline.config().get_root();
    let changed: Vec<String> = paths
        .iter()
        .map(|p| p.strip_prefix(root).unwrap_or(p).display().to_string())
        .collect();
    log!("watch"; "changed: {}", changed.join(", "));

    if let Err(e) = pipeline.run(Mode::Development) {
        log!("error"; "rebuild failed: {e:#}");
    }
}

// =============================================================================
// Watcher Setup
// =============================================================================

fn setup_watchers(watcher: &mut impl Watcher, config: &SiteConfig) -> Result<()> {
    let root = config.get_root();
    let build = &config.build;
    let mut watched = Vec::new();

    for dir in [&build.content, &build.styles, &build.assets] {
        if !dir.exists() {
            continue;
        }
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
        watched.push(format!("{}/", dir.strip_prefix(root).unwrap_or(dir).display()));
    }

    log!("watch"; "watching {}", watched.join(", "));
    Ok(())
}

// =============================================================================
// Public API
// =============================================================================

/// Watch sources and rebuild after each burst of changes until Ctrl-C.
pub fn watch_for_changes_blocking(pipeline: &Pipeline<'_>) -> Result<()> {
    let config = pipeline.config();
    let (tx, rx) = mpsc::channel();

    let fs_tx = tx.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = fs_tx.send(WatchEvent::Fs(res));
    })
    .context("Failed to create file watcher")?;
    setup_watchers(&mut watcher, config)?;

    ctrlc::set_handler(move || {
        let _ = tx.send(WatchEvent::Shutdown);
    })
    .context("Failed to install Ctrl-C handler")?;

    let mut debouncer = Debouncer::new(config.watch.debounce());

    loop {
        match rx.recv_timeout(debouncer.timeout(Instant::now())) {
            Ok(WatchEvent::Fs(Ok(event))) if is_relevant(&event) => {
                debouncer.add(event.paths, Instant::now());
            }
            Ok(WatchEvent::Fs(Ok(_))) => {}
            Ok(WatchEvent::Fs(Err(e))) => log!("watch"; "error: {e}"),
            Ok(WatchEvent::Shutdown) => {
                log!("watch"; "shutting down");
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                if debouncer.ready(Instant::now()) {
                    rebuild(pipeline, &debouncer.take());
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}
