use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const FAVORITES_KEY: &str = "bluesbook_favorites";
pub const RECENTS_KEY: &str = "bluesbook_recent";
pub const MAX_RECENTS: usize = 10;

const STORAGE_DIR: &str = "bluesbook";

/// Durable key/value port for the preference store. Values are JSON arrays of
/// id strings, one value per named key.
pub trait StorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One JSON file per key under the XDG cache directory.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// `None` when no cache directory can be resolved; the store then runs
    /// in-memory for the session.
    pub fn new() -> Option<Self> {
        storage_dir().map(|dir| Self { dir })
    }

    pub fn at(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read {key}")),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("create {:?}", self.dir))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("write {key}"))?;
        fs::rename(&tmp, &path).with_context(|| format!("swap {key}"))?;
        Ok(())
    }
}

/// In-memory double for tests; `fail_writes` simulates a full or unavailable
/// backing store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pub values: HashMap<String, String>,
    pub fail_writes: bool,
}

impl MemoryBackend {
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut backend = Self::default();
        backend.values.insert(key.to_string(), value.to_string());
        backend
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("storage backend unavailable");
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Favorites set plus a bounded most-recent-first recency list. Every
/// mutation is written through immediately. Storage failures are logged and
/// swallowed: favorites are a convenience, not critical path, so a broken or
/// malformed backing store degrades to empty state instead of erroring.
#[derive(Debug)]
pub struct PreferenceStore<B: StorageBackend> {
    backend: B,
    favorites: Vec<String>,
    recents: Vec<String>,
}

impl<B: StorageBackend> PreferenceStore<B> {
    pub fn new(backend: B) -> Self {
        let favorites = load_ids(&backend, FAVORITES_KEY);
        let mut recents = load_ids(&backend, RECENTS_KEY);
        recents.truncate(MAX_RECENTS);
        Self {
            backend,
            favorites,
            recents,
        }
    }

    /// Adds the id if absent, removes it if present. Returns whether the id
    /// is a favorite afterwards.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        let now_favorite = if let Some(pos) = self.favorites.iter().position(|f| f == id) {
            self.favorites.remove(pos);
            false
        } else {
            self.favorites.push(id.to_string());
            true
        };
        self.persist(FAVORITES_KEY);
        now_favorite
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f == id)
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    /// Moves the id to the front (no duplicates) and truncates to the 10
    /// most recent.
    pub fn add_recent(&mut self, id: &str) {
        if let Some(pos) = self.recents.iter().position(|r| r == id) {
            self.recents.remove(pos);
        }
        self.recents.insert(0, id.to_string());
        self.recents.truncate(MAX_RECENTS);
        self.persist(RECENTS_KEY);
    }

    /// Most-recent-first.
    pub fn recents(&self) -> &[String] {
        &self.recents
    }

    pub fn clear(&mut self) {
        self.favorites.clear();
        self.recents.clear();
        self.persist(FAVORITES_KEY);
        self.persist(RECENTS_KEY);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    fn persist(&mut self, key: &str) {
        let ids = match key {
            FAVORITES_KEY => &self.favorites,
            _ => &self.recents,
        };
        let json = match serde_json::to_string(ids) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(key, "failed to serialize preferences: {err}");
                return;
            }
        };
        if let Err(err) = self.backend.write(key, &json) {
            tracing::warn!(key, "failed to persist preferences: {err:#}");
        }
    }
}

fn load_ids<B: StorageBackend>(backend: &B, key: &str) -> Vec<String> {
    let raw = match backend.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!(key, "failed to read preferences: {err:#}");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(ids) => ids,
        Err(err) => {
            tracing::warn!(key, "malformed preference payload, resetting: {err}");
            Vec::new()
        }
    }
}

fn storage_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(STORAGE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(STORAGE_DIR))
}
