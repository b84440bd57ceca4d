//! List identity and list contents shared by both backends.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::{Sound, Variant};
use crate::error::{Error, Result};
use crate::identity::{option_label, PlaybackKey, SoundId, VariantId};

/// Prefix carried by every locally generated list id.
pub const GUEST_ID_PREFIX: &str = "guest-";

/// Which backend owns a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Ephemeral,
}

/// A list reference, tagged with its backend when it is first obtained.
///
/// Parsing is the one place that inspects the id's shape; everything
/// downstream matches on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListId {
    /// Server-issued opaque id.
    Remote(String),
    /// Tab-local id, always starting with [`GUEST_ID_PREFIX`].
    Ephemeral(String),
}

impl ListId {
    /// Tags a raw id by its shape.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with(GUEST_ID_PREFIX) {
            ListId::Ephemeral(raw.to_string())
        } else {
            ListId::Remote(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ListId::Remote(id) | ListId::Ephemeral(id) => id,
        }
    }

    pub fn backend(&self) -> BackendKind {
        match self {
            ListId::Remote(_) => BackendKind::Remote,
            ListId::Ephemeral(_) => BackendKind::Ephemeral,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, ListId::Ephemeral(_))
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(ListId::parse(s))
    }
}

impl Serialize for ListId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ListId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // The server sends integers, the guest blob sends strings.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(u64),
            Str(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => ListId::Remote(n.to_string()),
            RawId::Str(s) => ListId::parse(&s),
        })
    }
}

/// `{id, name}` row for list pickers and the list index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSummary {
    pub id: ListId,
    pub name: String,
}

/// Sound display metadata denormalised into a list entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntrySound {
    pub id: SoundId,
    pub name: String,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<Variant>,
}

/// One `(sound, variant?)` row of a session list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    #[serde(flatten)]
    pub sound: EntrySound,
    #[serde(default)]
    pub sound_variant_id: Option<VariantId>,
    #[serde(default)]
    pub variant_url: Option<String>,
    #[serde(default)]
    pub variant_label: Option<String>,
}

impl ListEntry {
    /// Builds an entry from catalog data, resolving URLs now so the list can
    /// render without the catalog. Fails when `variant` is not one of the
    /// sound's variants.
    pub fn from_catalog(sound: &Sound, variant: Option<&Variant>, audio_prefix: &str) -> Result<Self> {
        let variant_label = match variant {
            Some(v) => {
                let index = sound.variants.iter().position(|c| c.id == v.id).ok_or_else(|| {
                    Error::Validation(format!("Variant {} does not belong to {}", v.id, sound.name))
                })?;
                Some(option_label(v, index))
            }
            None => None,
        };

        Ok(Self {
            sound: EntrySound {
                id: sound.id,
                name: sound.name.clone(),
                category_name: sound.category_label().to_string(),
                file_path: sound.file_path.clone(),
                url: sound.playable_url(audio_prefix),
                variants: sound.variants.clone(),
            },
            sound_variant_id: variant.map(|v| v.id),
            variant_url: variant.and_then(|v| v.playable_url(audio_prefix)),
            variant_label,
        })
    }

    pub fn key(&self) -> PlaybackKey {
        PlaybackKey::new(self.sound.id, self.sound_variant_id)
    }

    /// True when the entry targets one specific recording.
    pub fn pins_variant(&self) -> bool {
        self.sound_variant_id.is_some() || self.variant_url.is_some()
    }

    /// URL to play for this entry.
    pub fn play_url(&self, audio_prefix: &str) -> String {
        if let Some(url) = self.variant_url.as_deref().filter(|u| !u.is_empty()) {
            return url.to_string();
        }
        if !self.sound.url.is_empty() {
            return self.sound.url.clone();
        }
        format!("{}{}", audio_prefix, self.sound.file_path)
    }

    /// `"Name – Label"` for variant entries, the sound name otherwise.
    pub fn display_name(&self) -> String {
        match self.variant_label.as_deref() {
            Some(label) if !label.is_empty() => format!("{} \u{2013} {}", self.sound.name, label),
            _ => self.sound.name.clone(),
        }
    }

    /// Rebuilds a catalog-shaped sound from the denormalised metadata.
    pub fn to_sound(&self) -> Sound {
        Sound {
            id: self.sound.id,
            name: self.sound.name.clone(),
            category_name: Some(self.sound.category_name.clone()).filter(|c| !c.is_empty()),
            file_path: self.sound.file_path.clone(),
            url: Some(self.sound.url.clone()).filter(|u| !u.is_empty()),
            is_active: true,
            variants: self.sound.variants.clone(),
            ..Default::default()
        }
    }
}

/// A named, ordered session list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionList {
    pub id: ListId,
    pub name: String,
    #[serde(default)]
    pub sounds: Vec<ListEntry>,
}

impl SessionList {
    pub fn new(id: ListId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            sounds: Vec::new(),
        }
    }

    pub fn summary(&self) -> ListSummary {
        ListSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    pub fn contains(&self, key: &PlaybackKey) -> bool {
        self.sounds.iter().any(|e| e.key() == *key)
    }

    pub fn entry(&self, key: &PlaybackKey) -> Option<&ListEntry> {
        self.sounds.iter().find(|e| e.key() == *key)
    }

    pub fn keys(&self) -> Vec<PlaybackKey> {
        self.sounds.iter().map(ListEntry::key).collect()
    }

    /// Appends an entry unless its key is already present. Returns true when
    /// the entry was added.
    pub fn push_unique(&mut self, entry: ListEntry) -> bool {
        if self.contains(&entry.key()) {
            return false;
        }
        self.sounds.push(entry);
        true
    }

    /// Removes the entry with exactly this key. Returns true when one was removed.
    pub fn remove_key(&mut self, key: &PlaybackKey) -> bool {
        let before = self.sounds.len();
        self.sounds.retain(|e| e.key() != *key);
        self.sounds.len() != before
    }

    /// Moves the named entries to the front in the given order; the rest keep
    /// their relative order after them. Unknown keys are ignored.
    pub fn reorder(&mut self, order: &[PlaybackKey]) {
        let mut remaining = std::mem::take(&mut self.sounds);
        let mut ordered = Vec::with_capacity(remaining.len());
        for key in order {
            if let Some(pos) = remaining.iter().position(|e| e.key() == *key) {
                ordered.push(remaining.remove(pos));
            }
        }
        ordered.append(&mut remaining);
        self.sounds = ordered;
    }
}

/// Partial update of a list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListUpdate {
    pub name: Option<String>,
    pub sounds: Option<Vec<ListEntry>>,
}

/// Trims a list name and rejects empty names.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("Enter a list name".to_string()));
    }
    Ok(trimmed.to_string())
}
