//! Client configuration loaded from `sfxdeck.yaml`.

use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_AUDIO_PREFIX;
use crate::engines::DEFAULT_CLIP_CAPACITY;
use crate::lists::GUEST_LISTS_KEY;
use crate::variant_popover::Viewport;

/// Complete client configuration. Every section is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Path of the file this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<std::path::PathBuf>,
}

/// Where the catalog and list API live.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path prefix for audio files (`file_path` is appended to it).
    #[serde(default = "default_audio_prefix")]
    pub audio_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            audio_prefix: default_audio_prefix(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_audio_prefix() -> String {
    DEFAULT_AUDIO_PREFIX.to_string()
}

/// Tab storage settings for guest lists.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_guest_lists_key")]
    pub guest_lists_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            guest_lists_key: default_guest_lists_key(),
        }
    }
}

fn default_guest_lists_key() -> String {
    GUEST_LISTS_KEY.to_string()
}

/// Variant popover geometry, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct OverlayConfig {
    /// Popover width; also the right-edge clamp.
    #[serde(default = "default_overlay_width")]
    pub width: f64,
    /// Minimum distance from the viewport's left and right edges.
    #[serde(default = "default_edge_margin")]
    pub edge_margin: f64,
    /// Gap between the trigger and the popover.
    #[serde(default = "default_gap")]
    pub gap: f64,
    /// Space needed below the trigger before the popover flips above it.
    #[serde(default = "default_min_space_below")]
    pub min_space_below: f64,
    /// Viewport assumed until the host reports its size.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
}

impl OverlayConfig {
    pub fn initial_viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            width: default_overlay_width(),
            edge_margin: default_edge_margin(),
            gap: default_gap(),
            min_space_below: default_min_space_below(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

fn default_overlay_width() -> f64 {
    280.0
}

fn default_edge_margin() -> f64 {
    8.0
}

fn default_gap() -> f64 {
    6.0
}

fn default_min_space_below() -> f64 {
    200.0
}

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_viewport_height() -> f64 {
    800.0
}

/// Playback settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// How often the shell polls the engine for end-of-clip events.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Local directory mirroring the server's audio prefix.
    #[serde(default)]
    pub audio_root: Option<std::path::PathBuf>,
    /// Clips kept in memory before the least recently fetched is dropped.
    #[serde(default = "default_clip_cache_size")]
    pub clip_cache_size: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            audio_root: None,
            clip_cache_size: default_clip_cache_size(),
        }
    }
}

fn default_clip_cache_size() -> usize {
    DEFAULT_CLIP_CAPACITY
}

fn default_poll_interval_ms() -> u64 {
    50
}
