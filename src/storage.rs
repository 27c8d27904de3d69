//! Key/value preferences, the terminal stand-in for browser local storage.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error};

pub mod keys {
    pub const FAVORITES: &str = "favorites";
    pub const FAVORITE_TEAM_THEME: &str = "favoriteTeamTheme";
    pub const SELECTED_UI_THEME: &str = "selectedUITheme";
    pub const AUTO_TEAM_THEME: &str = "autoTeamTheme";
}

/// String-valued storage. Writes never fail from the caller's point of view.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

type Entries = BTreeMap<String, String>;

fn lock(entries: &Mutex<Entries>) -> MutexGuard<'_, Entries> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<Entries>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        lock(&self.entries).insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        lock(&self.entries).remove(key);
    }
}

/// A JSON object on disk, loaded once and rewritten in full on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        debug!(path = %path.display(), keys = entries.len(), "opened preferences");
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &Entries) {
        if let Err(err) = write_entries(&self.path, entries) {
            error!(path = %self.path.display(), "failed to write preferences: {err:#}");
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}

fn load_entries(path: &Path) -> Entries {
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse preferences file: {err}");
                Entries::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Entries::default(),
        Err(err) => {
            error!("failed to read preferences file: {err}");
            Entries::default()
        }
    }
}

fn write_entries(path: &Path, entries: &Entries) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_vec_pretty(entries)?;
    fs::write(path, payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(keys::FAVORITES), None);
        storage.set(keys::FAVORITES, "[147]");
        assert_eq!(storage.get(keys::FAVORITES).as_deref(), Some("[147]"));
        storage.remove(keys::FAVORITES);
        assert_eq!(storage.get(keys::FAVORITES), None);
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let storage = FileStorage::open(&path);
        storage.set(keys::SELECTED_UI_THEME, "night");
        storage.set(keys::FAVORITES, "[147,111]");
        storage.remove(keys::FAVORITES);
        drop(storage);

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get(keys::SELECTED_UI_THEME).as_deref(), Some("night"));
        assert_eq!(reopened.get(keys::FAVORITES), None);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, b"{not json").unwrap();

        let storage = FileStorage::open(&path);
        assert_eq!(storage.get(keys::FAVORITES), None);

        storage.set(keys::AUTO_TEAM_THEME, "off");
        assert_eq!(
            FileStorage::open(&path).get(keys::AUTO_TEAM_THEME).as_deref(),
            Some("off")
        );
    }
}
