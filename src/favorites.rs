use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::storage::{keys, Storage};

/// Favorite team ids, persisted as a JSON array under [`keys::FAVORITES`].
///
/// Nothing is cached: every read parses the stored list and every mutation
/// writes the whole list back.
pub struct FavoritesStore {
    storage: Arc<dyn Storage>,
    write_lock: Mutex<()>,
}

impl FavoritesStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Distinct ids in stored order. Missing or unreadable data reads as empty.
    pub fn list(&self) -> Vec<u32> {
        let Some(raw) = self.storage.get(keys::FAVORITES) else {
            return Vec::new();
        };
        let ids: Vec<u32> = match serde_json::from_str(&raw) {
            Ok(ids) => ids,
            Err(err) => {
                warn!("ignoring unreadable favorites ({err}): {raw:?}");
                return Vec::new();
            }
        };

        let mut distinct = Vec::with_capacity(ids.len());
        for id in ids {
            if !distinct.contains(&id) {
                distinct.push(id);
            }
        }
        distinct
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.list().contains(&id)
    }

    /// Removes `id` if present, appends it otherwise. Returns the new membership.
    pub fn toggle(&self, id: u32) -> bool {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut ids = self.list();
        let now_favorite = match ids.iter().position(|&x| x == id) {
            Some(pos) => {
                ids.remove(pos);
                false
            }
            None => {
                ids.push(id);
                true
            }
        };
        self.write(&ids);
        debug!(team_id = id, favorite = now_favorite, "toggled favorite");
        now_favorite
    }

    fn write(&self, ids: &[u32]) {
        match serde_json::to_string(ids) {
            Ok(raw) => self.storage.set(keys::FAVORITES, &raw),
            Err(err) => warn!("failed to encode favorites: {err}"),
        }
    }
}
