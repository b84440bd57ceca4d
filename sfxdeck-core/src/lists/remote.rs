//! Session lists stored on the server for signed-in users.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::catalog::{Sound, Variant, DEFAULT_AUDIO_PREFIX};
use crate::error::{Error, Result};
use crate::identity::{key_of, option_label, PlaybackKey, SoundId, VariantId};
use crate::lists::backend::ListBackend;
use crate::lists::types::{
    validate_name, BackendKind, EntrySound, ListEntry, ListId, ListSummary, SessionList,
};

const LISTS_PATH: &str = "/api/session-lists";

/// List as the server serialises it.
#[derive(Debug, Deserialize)]
struct RemoteList {
    id: ListId,
    name: String,
    #[serde(default)]
    sounds: Vec<RemoteEntry>,
}

/// List entry as the server serialises it: a junction row with the full sound
/// nested under `sound`.
#[derive(Debug, Deserialize)]
struct RemoteEntry {
    sound_id: SoundId,
    #[serde(default)]
    sound_variant_id: Option<VariantId>,
    #[serde(default)]
    sound: Option<Sound>,
    #[serde(default)]
    variant_url: Option<String>,
    #[serde(default)]
    variant_label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListsBody {
    #[serde(default)]
    session_lists: Vec<RemoteList>,
}

#[derive(Serialize)]
struct NameBody<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct AddBody {
    sound_id: SoundId,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound_variant_id: Option<VariantId>,
}

#[derive(Serialize)]
struct ReorderBody {
    sound_ids: Vec<SoundId>,
}

impl RemoteEntry {
    fn into_entry(self, audio_prefix: &str) -> ListEntry {
        let sound = self.sound.unwrap_or_else(|| Sound {
            id: self.sound_id,
            ..Default::default()
        });

        // The server leaves the label null when the variant has none.
        let variant_label = self.sound_variant_id.map(|vid| {
            match self.variant_label.clone().filter(|l| !l.is_empty()) {
                Some(label) => label,
                None => sound
                    .variants
                    .iter()
                    .enumerate()
                    .find(|(_, v)| v.id == vid)
                    .map(|(i, v)| option_label(v, i))
                    .unwrap_or_else(|| "Option 1".to_string()),
            }
        });

        ListEntry {
            sound: EntrySound {
                id: self.sound_id,
                name: sound.name.clone(),
                category_name: sound.category_label().to_string(),
                file_path: sound.file_path.clone(),
                url: sound.playable_url(audio_prefix),
                variants: sound.variants,
            },
            sound_variant_id: self.sound_variant_id,
            variant_url: self.variant_url,
            variant_label,
        }
    }
}

impl RemoteList {
    fn into_list(self, audio_prefix: &str) -> SessionList {
        let id = match self.id {
            ListId::Ephemeral(raw) | ListId::Remote(raw) => ListId::Remote(raw),
        };
        SessionList {
            id,
            name: self.name,
            sounds: self
                .sounds
                .into_iter()
                .map(|e| e.into_entry(audio_prefix))
                .collect(),
        }
    }
}

/// Backend talking to the session-list API.
#[derive(Clone)]
pub struct RemoteListBackend {
    api: ApiClient,
    audio_prefix: String,
}

impl RemoteListBackend {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            audio_prefix: DEFAULT_AUDIO_PREFIX.to_string(),
        }
    }

    /// Sets the prefix used to derive playable URLs from `file_path`.
    pub fn with_audio_prefix(mut self, prefix: &str) -> Self {
        self.audio_prefix = prefix.to_string();
        self
    }

    fn list_path(id: &str) -> String {
        format!("{}/{}", LISTS_PATH, id)
    }

    async fn fetch(&self, id: &str) -> Result<SessionList> {
        let list: RemoteList = self.api.get(&Self::list_path(id), &[]).await?;
        Ok(list.into_list(&self.audio_prefix))
    }
}

fn expect_remote(id: &ListId) -> Result<&str> {
    match id {
        ListId::Remote(raw) => Ok(raw),
        ListId::Ephemeral(raw) => Err(Error::NotFound(format!("Session list {} not found", raw))),
    }
}

#[async_trait]
impl ListBackend for RemoteListBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn list_all(&self) -> Result<Vec<ListSummary>> {
        let body: ListsBody = self.api.get(LISTS_PATH, &[]).await?;
        Ok(body
            .session_lists
            .into_iter()
            .map(|l| l.into_list(&self.audio_prefix).summary())
            .collect())
    }

    async fn get(&self, id: &ListId) -> Result<SessionList> {
        self.fetch(expect_remote(id)?).await
    }

    async fn create(&self, name: &str) -> Result<SessionList> {
        let name = validate_name(name)?;
        let list: RemoteList = self
            .api
            .send(Method::POST, LISTS_PATH, Some(&NameBody { name: &name }))
            .await?;
        let list = list.into_list(&self.audio_prefix);
        tracing::info!("Created session list {} ({})", list.id, list.name);
        Ok(list)
    }

    async fn rename(&self, id: &ListId, name: &str) -> Result<SessionList> {
        let name = validate_name(name)?;
        let raw = expect_remote(id)?;
        let list: RemoteList = self
            .api
            .send(Method::PUT, &Self::list_path(raw), Some(&NameBody { name: &name }))
            .await?;
        Ok(list.into_list(&self.audio_prefix))
    }

    async fn delete(&self, id: &ListId) -> Result<()> {
        let raw = expect_remote(id)?;
        self.api
            .send_discarding::<()>(Method::DELETE, &Self::list_path(raw), None)
            .await?;
        tracing::info!("Deleted session list {}", raw);
        Ok(())
    }

    async fn add_item(
        &self,
        id: &ListId,
        sound: &Sound,
        variant: Option<&Variant>,
    ) -> Result<SessionList> {
        let raw = expect_remote(id)?;
        let current = self.fetch(raw).await?;
        let key = key_of(sound, variant);
        if current.contains(&key) {
            tracing::debug!("Session list {} already holds {}", raw, key);
            return Ok(current);
        }

        let body = AddBody {
            sound_id: sound.id,
            sound_variant_id: variant.map(|v| v.id),
        };
        let path = format!("{}/sounds", Self::list_path(raw));
        match self.api.send_discarding(Method::POST, &path, Some(&body)).await {
            Ok(()) => {}
            // Another view added the same key between our read and the write.
            Err(Error::Validation(message)) => {
                let latest = self.fetch(raw).await?;
                if !latest.contains(&key) {
                    return Err(Error::Validation(message));
                }
                return Ok(latest);
            }
            Err(e) => return Err(e),
        }
        self.fetch(raw).await
    }

    async fn remove_item(
        &self,
        id: &ListId,
        sound_id: SoundId,
        variant_id: Option<VariantId>,
    ) -> Result<SessionList> {
        let raw = expect_remote(id)?;
        let current = self.fetch(raw).await?;
        let key = PlaybackKey::new(sound_id, variant_id);
        if !current.contains(&key) {
            return Ok(current);
        }

        let mut path = format!("{}/sounds/{}", Self::list_path(raw), sound_id);
        if let Some(variant_id) = variant_id {
            path.push_str(&format!("?variant_id={}", variant_id));
        }
        match self.api.send_discarding::<()>(Method::DELETE, &path, None).await {
            Ok(()) => {}
            // Already removed elsewhere; the re-read below reflects that.
            Err(Error::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        self.fetch(raw).await
    }

    async fn reorder(&self, id: &ListId, order: &[PlaybackKey]) -> Result<SessionList> {
        let raw = expect_remote(id)?;
        // The server positions one entry per sound id, so two entries of
        // one sound can't be placed independently.
        let mut sound_ids: Vec<SoundId> = Vec::with_capacity(order.len());
        for key in order {
            if sound_ids.contains(&key.sound) {
                return Err(Error::Validation(format!(
                    "Sound {} has more than one entry; server lists order entries by sound",
                    key.sound
                )));
            }
            sound_ids.push(key.sound);
        }
        let path = format!("{}/sounds/reorder", Self::list_path(raw));
        let list: RemoteList = self
            .api
            .send(Method::PUT, &path, Some(&ReorderBody { sound_ids }))
            .await?;
        Ok(list.into_list(&self.audio_prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_list_decodes_server_shape() {
        let raw = r#"{
            "id": 7,
            "user_id": 1,
            "name": "Dungeon",
            "created_at": null,
            "sounds": [
                {
                    "id": 100, "session_list_id": 7, "sound_id": 3, "sound_variant_id": 4,
                    "sort_order": 1,
                    "sound": {
                        "id": 3, "name": "Door", "category_id": 2, "category_name": "Foley",
                        "file_path": "foley/door.mp3", "url": "/static/audio/foley/door.mp3",
                        "duration_seconds": 1.5, "is_active": true,
                        "variants": [{"id": 4, "file_path": "foley/door_creak.mp3", "url": "/static/audio/foley/door_creak.mp3", "label": null}]
                    },
                    "variant_url": "/static/audio/foley/door_creak.mp3",
                    "variant_label": null
                }
            ]
        }"#;
        let list: RemoteList = serde_json::from_str(raw).unwrap();
        let list = list.into_list(DEFAULT_AUDIO_PREFIX);

        assert_eq!(list.id, ListId::Remote("7".to_string()));
        assert_eq!(list.sounds.len(), 1);
        let entry = &list.sounds[0];
        assert_eq!(entry.key(), PlaybackKey::new(SoundId(3), Some(VariantId(4))));
        assert_eq!(entry.sound.category_name, "Foley");
        assert_eq!(entry.variant_label.as_deref(), Some("Option 1"));
        assert_eq!(entry.play_url(DEFAULT_AUDIO_PREFIX), "/static/audio/foley/door_creak.mp3");
    }

    #[test]
    fn test_entry_without_nested_sound_keeps_key() {
        let entry: RemoteEntry =
            serde_json::from_str(r#"{"sound_id": 12, "sound_variant_id": null, "sound": null}"#).unwrap();
        let entry = entry.into_entry(DEFAULT_AUDIO_PREFIX);
        assert_eq!(entry.key(), PlaybackKey::base(SoundId(12)));
        assert!(entry.variant_label.is_none());
    }

    #[tokio::test]
    async fn test_guest_id_is_rejected_before_network() {
        let api = ApiClient::with_client(reqwest::Client::new(), "http://127.0.0.1:9");
        let backend = RemoteListBackend::new(api);
        let result = backend.get(&ListId::parse("guest-1")).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_add_body_omits_missing_variant() {
        let body = AddBody {
            sound_id: SoundId(5),
            sound_variant_id: None,
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"sound_id":5}"#);
    }
}
