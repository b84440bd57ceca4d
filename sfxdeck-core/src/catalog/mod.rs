//! Catalog types (sounds, variants, categories) and the catalog API client.

mod client;

pub use client::CatalogClient;

use serde::{Deserialize, Serialize};

use crate::identity::{SoundId, VariantId};

/// Path prefix under which the server publishes audio files.
pub const DEFAULT_AUDIO_PREFIX: &str = "/static/audio/";

/// A catalog entry: one logical clip, possibly with alternate recordings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sound {
    pub id: SoundId,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

fn default_true() -> bool {
    true
}

impl Sound {
    /// URL of the sound's base audio: its own `url`, else `audio_prefix + file_path`.
    pub fn playable_url(&self, audio_prefix: &str) -> String {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!("{}{}", audio_prefix, self.file_path),
        }
    }

    /// Looks up a variant by id.
    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Category name for display, empty when unknown.
    pub fn category_label(&self) -> &str {
        self.category_name.as_deref().unwrap_or("")
    }
}

/// One alternate recording of a sound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl Variant {
    /// URL of this recording, if the variant carries one.
    pub fn playable_url(&self, audio_prefix: &str) -> Option<String> {
        match (self.url.as_deref(), self.file_path.as_deref()) {
            (Some(url), _) if !url.is_empty() => Some(url.to_string()),
            (_, Some(path)) if !path.is_empty() => Some(format!("{}{}", audio_prefix, path)),
            _ => None,
        }
    }
}

/// Resolves the URL to play: variant URL, else the sound's URL, else the
/// path derived from the sound's file path.
pub fn resolve_play_url(sound: &Sound, variant: Option<&Variant>, audio_prefix: &str) -> String {
    variant
        .and_then(|v| v.playable_url(audio_prefix))
        .unwrap_or_else(|| sound.playable_url(audio_prefix))
}

/// Sound category as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub sound_count: u64,
}

/// Signed-in account as returned by the current-user lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Filter for the sound listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoundQuery {
    pub category_id: Option<u64>,
    pub search: Option<String>,
}

impl SoundQuery {
    /// Query parameters, omitting empty values and trimming the search text.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.category_id {
            params.push(("category_id", id.to_string()));
        }
        if let Some(q) = self.search.as_deref().map(str::trim) {
            if !q.is_empty() {
                params.push(("q", q.to_string()));
            }
        }
        params
    }
}
