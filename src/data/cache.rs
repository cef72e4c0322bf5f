//! Persistent memoization for git queries and markdown rendering.
//!
//! # Keys
//!
//! Every key spells out all inputs that determine its value, so entries never
//! go stale and are never invalidated:
//!
//! | Namespace | Inputs                           | Value                 |
//! |-----------|----------------------------------|-----------------------|
//! | `history` | diff filter, `HEAD` id, path     | JSON [`Revision`]     |
//! | `blob`    | commit id, path                  | file content          |
//! | `render`  | blake3 of the substituted source | rendered HTML         |
//!
//! `HEAD` is part of history keys because a new commit can change the answer
//! for any path. Blob and render keys are content-addressed.
//!
//! Bump [`KEY_VERSION`] whenever a value format or the renderer output
//! changes, which orphans every older entry.
//!
//! [`Revision`]: crate::utils::git::Revision

use crate::config::CacheConfig;
use crate::log;
use crate::utils::git::DiffFilter;
use anyhow::{Context, Result};
use parking_lot::RwLock;
use redb::{Database, Durability, TableDefinition};
use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use std::{fmt, path::Path};

const KEY_VERSION: u32 = 1;

const TABLE: TableDefinition<&str, &str> = TableDefinition::new("gitmark");

/// A fully qualified cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn history(filter: DiffFilter, head: &str, path: &Path) -> Self {
        Self(format!("v{KEY_VERSION}:history:{filter}:{head}:{}", path.display()))
    }

    pub fn blob(rev: &str, path: &Path) -> Self {
        Self(format!("v{KEY_VERSION}:blob:{rev}:{}", path.display()))
    }

    pub fn render(markdown: &str) -> Self {
        let digest = blake3::hash(markdown.as_bytes());
        Self(format!("v{KEY_VERSION}:render:{}", digest.to_hex()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Durable string store shared by every build in the process.
pub trait ContentCache: Send + Sync {
    /// A miss is `Ok(None)`.
    fn get(&self, key: &CacheKey) -> Result<Option<String>>;

    fn set(&self, key: &CacheKey, value: &str) -> Result<()>;

    /// Flush and release the store. Called once, on every exit path.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Return the cached value for `key`, or compute and store it.
pub fn get_or_insert_with(
    cache: &dyn ContentCache,
    key: &CacheKey,
    compute: impl FnOnce() -> Result<String>,
) -> Result<String> {
    if let Some(value) = cache.get(key)? {
        return Ok(value);
    }
    let value = compute()?;
    cache.set(key, &value)?;
    Ok(value)
}

/// JSON flavored [`get_or_insert_with`].
///
/// An entry that no longer deserializes is logged and recomputed.
pub fn get_or_insert_json<T: Serialize + DeserializeOwned>(
    cache: &dyn ContentCache,
    key: &CacheKey,
    compute: impl FnOnce() -> Result<T>,
) -> Result<T> {
    if let Some(raw) = cache.get(key)? {
        match serde_json::from_str(&raw) {
            Ok(value) => return Ok(value),
            Err(e) => log!("cache"; "discarding unreadable entry {key}: {e}"),
        }
    }
    let value = compute()?;
    cache.set(key, &serde_json::to_string(&value)?)?;
    Ok(value)
}

/// Open the store selected by `[build.cache]`.
///
/// A database that cannot be opened (another process holds the lock, the
/// file is corrupt) degrades to an in-memory cache for this run.
pub fn open(config: &CacheConfig) -> Box<dyn ContentCache> {
    if !config.enable {
        log!("cache"; "disabled");
        return Box::new(NoCache);
    }

    match RedbCache::open(&config.path) {
        Ok(cache) => Box::new(cache),
        Err(e) => {
            log!("warn"; "cache unavailable, keeping it in memory: {e:#}");
            Box::new(MemoryCache::new())
        }
    }
}

// ============================================================================
// redb
// ============================================================================

/// Cache backed by a single redb file.
pub struct RedbCache {
    db: Database,
}

impl RedbCache {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create `{}`", parent.display()))?;
        }
        let db = Database::create(path)
            .with_context(|| format!("Failed to open cache `{}`", path.display()))?;

        // Create the table up front so readers never see it missing.
        let txn = db.begin_write()?;
        txn.open_table(TABLE)?;
        txn.commit()?;

        log!("cache"; "using {}", path.display());
        Ok(Self { db })
    }
}

impl ContentCache for RedbCache {
    fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TABLE)?;
        Ok(table.get(key.as_str())?.map(|v| v.value().to_owned()))
    }

    fn set(&self, key: &CacheKey, value: &str) -> Result<()> {
        let mut txn = self.db.begin_write()?;
        txn.set_durability(Durability::Eventual);
        {
            let mut table = txn.open_table(TABLE)?;
            table.insert(key.as_str(), value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        // An immediate commit makes every earlier eventual commit durable.
        let mut txn = self.db.begin_write()?;
        txn.set_durability(Durability::Immediate);
        txn.commit().context("Failed to flush cache")?;
        drop(self.db);
        log!("cache"; "closed");
        Ok(())
    }
}

// ============================================================================
// In-memory and disabled
// ============================================================================

/// Process-local cache, lost on exit.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<FxHashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ContentCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        Ok(self.entries.read().get(key.as_str()).cloned())
    }

    fn set(&self, key: &CacheKey, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.as_str().to_owned(), value.to_owned());
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Always misses; used for `--no-cache`.
pub struct NoCache;

impl ContentCache for NoCache {
    fn get(&self, _key: &CacheKey) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &CacheKey, _value: &str) -> Result<()> {
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::git::Revision;
    use tempfile::TempDir;

    #[test]
    fn test_keys_separate_namespaces() {
        let path = Path::new("docs/a.md");
        let added = CacheKey::history(DiffFilter::Added, "abc", path);
        let latest = CacheKey::history(DiffFilter::AddedOrModified, "abc", path);
        let blob = CacheKey::blob("abc", path);

        assert_ne!(added, latest);
        assert_ne!(added, blob);
        assert_eq!(blob.as_str(), "v1:blob:abc:docs/a.md");
    }

    #[test]
    fn test_render_key_is_content_addressed() {
        assert_eq!(CacheKey::render("# hi"), CacheKey::render("# hi"));
        assert_ne!(CacheKey::render("# hi"), CacheKey::render("# ho"));
    }

    #[test]
    fn test_redb_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/cache.redb");
        let key = CacheKey::blob("abc", Path::new("a.md"));

        let cache = Box::new(RedbCache::open(&path).unwrap());
        assert_eq!(cache.get(&key).unwrap(), None);
        cache.set(&key, "body").unwrap();
        cache.close().unwrap();

        let cache = Box::new(RedbCache::open(&path).unwrap());
        assert_eq!(cache.get(&key).unwrap().as_deref(), Some("body"));
        cache.close().unwrap();
    }

    #[test]
    fn test_open_disabled() {
        let dir = TempDir::new().unwrap();
        let config = CacheConfig {
            enable: false,
            path: dir.path().join("cache.redb"),
        };

        open(&config).close().unwrap();
        assert!(!config.path.exists());
    }

    #[test]
    fn test_open_enabled_creates_file() {
        let dir = TempDir::new().unwrap();
        let config = CacheConfig {
            enable: true,
            path: dir.path().join("cache.redb"),
        };

        open(&config).close().unwrap();
        assert!(config.path.exists());
    }

    #[test]
    fn test_memory_cache() {
        let cache = MemoryCache::new();
        let key = CacheKey::render("x");

        assert!(cache.is_empty());
        cache.set(&key, "<p>x</p>").unwrap();
        assert_eq!(cache.get(&key).unwrap().as_deref(), Some("<p>x</p>"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_no_cache_always_misses() {
        let cache = NoCache;
        let key = CacheKey::render("x");
        cache.set(&key, "v").unwrap();
        assert_eq!(cache.get(&key).unwrap(), None);
    }

    #[test]
    fn test_get_or_insert_with_computes_once() {
        let cache = MemoryCache::new();
        let key = CacheKey::render("x");
        let mut calls = 0;

        for _ in 0..2 {
            let value = get_or_insert_with(&cache, &key, || {
                calls += 1;
                Ok("v".to_owned())
            })
            .unwrap();
            assert_eq!(value, "v");
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_get_or_insert_with_does_not_store_errors() {
        let cache = MemoryCache::new();
        let key = CacheKey::render("x");

        assert!(get_or_insert_with(&cache, &key, || anyhow::bail!("boom")).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_or_insert_json_recovers_from_garbage() {
        let cache = MemoryCache::new();
        let key = CacheKey::history(DiffFilter::Added, "abc", Path::new("a.md"));
        cache.set(&key, "not json").unwrap();

        let rev = get_or_insert_json(&cache, &key, || {
            Ok(Revision {
                timestamp: 5,
                id: "abc".into(),
            })
        })
        .unwrap();

        assert_eq!(rev.timestamp, 5);
        let stored: Revision = serde_json::from_str(&cache.get(&key).unwrap().unwrap()).unwrap();
        assert_eq!(stored, rev);
    }
}
