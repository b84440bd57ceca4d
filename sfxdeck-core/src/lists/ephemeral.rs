//! Guest lists kept in tab-local storage.
//!
//! All lists live in one JSON blob under [`GUEST_LISTS_KEY`], serialised as
//! `[{id, name, sounds}]`. The storage lives as long as the tab and is never
//! synchronised to the server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::catalog::{Sound, Variant, DEFAULT_AUDIO_PREFIX};
use crate::error::{Error, Result};
use crate::identity::{key_of, PlaybackKey, SoundId, VariantId};
use crate::lists::backend::ListBackend;
use crate::lists::types::{
    validate_name, BackendKind, ListEntry, ListId, ListSummary, ListUpdate, SessionList,
    GUEST_ID_PREFIX,
};

/// Well-known storage key for the guest list blob.
pub const GUEST_LISTS_KEY: &str = "dnd_guest_lists";

/// Key/value storage scoped to one browsing session (like `sessionStorage`).
pub trait TabStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: String) -> Result<()>;
    fn remove_item(&self, key: &str);
}

/// In-process tab storage; cleared when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TabStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: String) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| Error::Storage("Failed to acquire storage lock".to_string()))?;
        items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        if let Ok(mut items) = self.items.lock() {
            items.remove(key);
        }
    }
}

static TAB_LISTS: OnceLock<Arc<EphemeralListBackend<MemoryStorage>>> = OnceLock::new();

/// Returns the process-wide guest list store.
pub fn tab_lists() -> Arc<EphemeralListBackend<MemoryStorage>> {
    Arc::clone(TAB_LISTS.get_or_init(|| Arc::new(EphemeralListBackend::new(MemoryStorage::new()))))
}

/// Guest list backend over a [`TabStorage`].
pub struct EphemeralListBackend<S: TabStorage> {
    storage: S,
    key: String,
    audio_prefix: String,
    /// Serialises read-modify-write cycles on the blob.
    write_lock: Mutex<()>,
}

impl<S: TabStorage> EphemeralListBackend<S> {
    /// Creates a backend using the well-known storage key.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, GUEST_LISTS_KEY)
    }

    /// Creates a backend storing its blob under `key`.
    pub fn with_key(storage: S, key: &str) -> Self {
        Self {
            storage,
            key: key.to_string(),
            audio_prefix: DEFAULT_AUDIO_PREFIX.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    /// Sets the prefix used to derive playable URLs for new entries.
    pub fn set_audio_prefix(&mut self, prefix: &str) {
        self.audio_prefix = prefix.to_string();
    }

    /// All guest lists in creation order. A corrupt blob reads as empty.
    pub fn all(&self) -> Vec<SessionList> {
        let Some(raw) = self.storage.get_item(&self.key) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<SessionList>>(&raw) {
            Ok(lists) => lists,
            Err(e) => {
                tracing::warn!("Ignoring unreadable guest lists blob: {}", e);
                Vec::new()
            }
        }
    }

    /// Looks up one guest list.
    pub fn get_by_id(&self, id: &str) -> Option<SessionList> {
        self.all().into_iter().find(|l| l.id.as_str() == id)
    }

    /// Creates a guest list with a fresh `guest-` id.
    pub fn create_list(&self, name: &str) -> Result<SessionList> {
        let name = validate_name(name)?;
        let _guard = self.lock()?;
        let mut lists = self.all();

        let mut stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let id = loop {
            let candidate = format!("{}{}", GUEST_ID_PREFIX, stamp);
            if !lists.iter().any(|l| l.id.as_str() == candidate) {
                break candidate;
            }
            stamp += 1;
        };

        let list = SessionList::new(ListId::Ephemeral(id), &name);
        lists.push(list.clone());
        self.save(&lists)?;
        tracing::info!("Created guest list {} ({})", list.id, list.name);
        Ok(list)
    }

    /// Applies a partial update. Returns `None` when the id is unknown.
    pub fn update(&self, id: &str, update: ListUpdate) -> Result<Option<SessionList>> {
        let _guard = self.lock()?;
        self.update_unlocked(id, update)
    }

    /// Adds a sound (or one variant). Duplicate keys leave the list unchanged.
    pub fn add_sound(&self, id: &str, sound: &Sound, variant: Option<&Variant>) -> Result<SessionList> {
        let _guard = self.lock()?;
        let mut list = self.require(id)?;
        let key = key_of(sound, variant);
        if list.contains(&key) {
            tracing::debug!("Guest list {} already holds {}", id, key);
            return Ok(list);
        }
        list.sounds.push(ListEntry::from_catalog(sound, variant, &self.audio_prefix)?);
        self.store_sounds(id, list.sounds)
    }

    /// Removes the entry for `(sound_id, variant_id)`; absent keys are a no-op.
    pub fn remove_sound(
        &self,
        id: &str,
        sound_id: SoundId,
        variant_id: Option<VariantId>,
    ) -> Result<SessionList> {
        let _guard = self.lock()?;
        let mut list = self.require(id)?;
        if !list.remove_key(&PlaybackKey::new(sound_id, variant_id)) {
            return Ok(list);
        }
        self.store_sounds(id, list.sounds)
    }

    /// Reorders a guest list's entries.
    pub fn reorder_sounds(&self, id: &str, order: &[PlaybackKey]) -> Result<SessionList> {
        let _guard = self.lock()?;
        let mut list = self.require(id)?;
        list.reorder(order);
        self.store_sounds(id, list.sounds)
    }

    /// Deletes a guest list. Unknown ids are ignored.
    pub fn delete_list(&self, id: &str) -> Result<()> {
        let _guard = self.lock()?;
        let mut lists = self.all();
        let before = lists.len();
        lists.retain(|l| l.id.as_str() != id);
        if lists.len() != before {
            self.save(&lists)?;
            tracing::info!("Deleted guest list {}", id);
        }
        Ok(())
    }

    /// Drops every guest list (end of the tab's life).
    pub fn clear(&self) {
        self.storage.remove_item(&self.key);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| Error::Storage("Failed to acquire guest list lock".to_string()))
    }

    fn require(&self, id: &str) -> Result<SessionList> {
        self.get_by_id(id).ok_or_else(|| not_found(id))
    }

    fn store_sounds(&self, id: &str, sounds: Vec<ListEntry>) -> Result<SessionList> {
        let update = ListUpdate {
            name: None,
            sounds: Some(sounds),
        };
        self.update_unlocked(id, update)?.ok_or_else(|| not_found(id))
    }

    fn update_unlocked(&self, id: &str, update: ListUpdate) -> Result<Option<SessionList>> {
        let mut lists = self.all();
        let Some(list) = lists.iter_mut().find(|l| l.id.as_str() == id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            list.name = name;
        }
        if let Some(sounds) = update.sounds {
            list.sounds = sounds;
        }
        let updated = list.clone();
        self.save(&lists)?;
        Ok(Some(updated))
    }

    fn save(&self, lists: &[SessionList]) -> Result<()> {
        let blob = serde_json::to_string(lists)?;
        self.storage.set_item(&self.key, blob)
    }
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!(
        "List {} not found. It may have been cleared; guest lists last until the tab is closed.",
        id
    ))
}

fn expect_ephemeral(id: &ListId) -> Result<&str> {
    match id {
        ListId::Ephemeral(raw) => Ok(raw),
        ListId::Remote(raw) => Err(not_found(raw)),
    }
}

#[async_trait]
impl<S: TabStorage> ListBackend for EphemeralListBackend<S> {
    fn kind(&self) -> BackendKind {
        BackendKind::Ephemeral
    }

    async fn list_all(&self) -> Result<Vec<ListSummary>> {
        Ok(self.all().iter().map(SessionList::summary).collect())
    }

    async fn get(&self, id: &ListId) -> Result<SessionList> {
        self.require(expect_ephemeral(id)?)
    }

    async fn create(&self, name: &str) -> Result<SessionList> {
        self.create_list(name)
    }

    async fn rename(&self, id: &ListId, name: &str) -> Result<SessionList> {
        let name = validate_name(name)?;
        let raw = expect_ephemeral(id)?;
        let update = ListUpdate {
            name: Some(name),
            sounds: None,
        };
        self.update(raw, update)?.ok_or_else(|| not_found(raw))
    }

    async fn delete(&self, id: &ListId) -> Result<()> {
        match id {
            ListId::Ephemeral(raw) => self.delete_list(raw),
            // A remote id never names a guest list, so there is nothing to delete.
            ListId::Remote(_) => Ok(()),
        }
    }

    async fn add_item(
        &self,
        id: &ListId,
        sound: &Sound,
        variant: Option<&Variant>,
    ) -> Result<SessionList> {
        self.add_sound(expect_ephemeral(id)?, sound, variant)
    }

    async fn remove_item(
        &self,
        id: &ListId,
        sound_id: SoundId,
        variant_id: Option<VariantId>,
    ) -> Result<SessionList> {
        self.remove_sound(expect_ephemeral(id)?, sound_id, variant_id)
    }

    async fn reorder(&self, id: &ListId, order: &[PlaybackKey]) -> Result<SessionList> {
        self.reorder_sounds(expect_ephemeral(id)?, order)
    }
}
