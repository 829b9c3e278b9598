//! Durable key-value backends for the session.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// String key-value storage that outlives the process.
///
/// Multi-key writes and removals must be observed all-or-nothing by
/// concurrent readers.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()>;

    fn remove_many(&self, keys: &[&str]) -> Result<()>;
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-process store, for tests and for embedding where durability is
/// provided elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        read_lock(&self.entries).get(key).cloned()
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut map = write_lock(&self.entries);
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = write_lock(&self.entries);
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// JSON object file holding every entry.
///
/// The file is read once on open and rewritten whole (temp file + rename) on
/// every change. If the rewrite fails the in-memory copy still changes, so
/// the session keeps working for this run and only durability is lost.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open `session.json` inside the given cache directory
    pub fn in_dir(cache_dir: &Path) -> Self {
        Self::open(cache_dir.join(SESSION_FILE))
    }

    /// Open a store file. A missing, unreadable or corrupt file starts empty.
    pub fn open(path: PathBuf) -> Self {
        let entries = match Self::load(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding unreadable session file");
                HashMap::new()
            }
        };
        debug!(path = %path.display(), keys = entries.len(), "Session file opened");
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<HashMap<String, String>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(path).context("Failed to read session file")?;
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&contents).context("Failed to parse session file")
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| SESSION_FILE.to_string());
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path).context("Failed to remove session file")?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.temp_path();
        let mut tmp_file = Self::create_private(&tmp_path)
            .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        tmp_file.write_all(contents.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path).context("Failed to replace session file")?;
        Ok(())
    }

    /// The file holds a bearer token, so keep it owner-only where possible
    #[cfg(unix)]
    fn create_private(path: &Path) -> std::io::Result<File> {
        use std::os::unix::fs::OpenOptionsExt;
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
    }

    #[cfg(not(unix))]
    fn create_private(path: &Path) -> std::io::Result<File> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        read_lock(&self.entries).get(key).cloned()
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut map = write_lock(&self.entries);
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        self.persist(&map)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = write_lock(&self.entries);
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() == before {
            return Ok(());
        }
        self.persist(&map)
    }
}
