//! Fetching and caching clip bytes by URL.
//!
//! Clips under the server's audio prefix can be read straight from a local
//! audio root (a checkout of the server's `static/audio` directory). Anything
//! else is downloaded from the server. Downloads use blocking reqwest on a
//! plain OS thread: reqwest::blocking owns a runtime and panics when created
//! inside tokio.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use reqwest::blocking::Client;

use crate::catalog::DEFAULT_AUDIO_PREFIX;
use crate::error::{Error, Result};

/// Clip bytes shared between cache and decoder.
pub type ClipBytes = Arc<[u8]>;

/// Clips kept in memory by default.
pub const DEFAULT_CLIP_CAPACITY: usize = 64;

/// Cached clips plus their fetch order, oldest first.
#[derive(Default)]
struct Clips {
    by_url: HashMap<String, ClipBytes>,
    order: VecDeque<String>,
}

impl Clips {
    fn insert(&mut self, url: &str, bytes: ClipBytes, capacity: usize) {
        if self.by_url.insert(url.to_string(), bytes).is_none() {
            self.order.push_back(url.to_string());
        }
        while self.order.len() > capacity {
            if let Some(oldest) = self.order.pop_front() {
                tracing::debug!("Evicting clip: {}", oldest);
                self.by_url.remove(&oldest);
            }
        }
    }
}

/// URL-keyed cache of fetched clips, bounded to `capacity` entries.
pub struct ClipCache {
    base_url: String,
    audio_prefix: String,
    audio_root: Option<PathBuf>,
    capacity: usize,
    clips: RwLock<Clips>,
}

impl ClipCache {
    /// Creates a cache resolving relative URLs against `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            audio_prefix: DEFAULT_AUDIO_PREFIX.to_string(),
            audio_root: None,
            capacity: DEFAULT_CLIP_CAPACITY,
            clips: RwLock::new(Clips::default()),
        }
    }

    /// Number of clips kept before the oldest is dropped. At least one.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    pub fn set_audio_prefix(&mut self, prefix: &str) {
        self.audio_prefix = prefix.to_string();
    }

    /// Serves clips under the audio prefix from `root` instead of the network.
    pub fn set_audio_root<P: AsRef<Path>>(&mut self, root: P) {
        self.audio_root = Some(root.as_ref().to_path_buf());
    }

    /// Number of cached clips.
    pub fn len(&self) -> usize {
        self.clips.read().map_or(0, |c| c.by_url.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the clip for `url`, fetching it on a miss.
    pub fn get_or_fetch(&self, url: &str) -> Result<ClipBytes> {
        if let Some(bytes) = self.clips.read().ok().and_then(|c| c.by_url.get(url).cloned()) {
            tracing::debug!("Clip cache hit: {}", url);
            return Ok(bytes);
        }

        let bytes: ClipBytes = match self.local_path(url) {
            Some(path) => std::fs::read(&path)
                .map_err(|e| Error::Playback(format!("Failed to read {}: {}", path.display(), e)))?
                .into(),
            None => fetch_on_thread(&self.absolute_url(url))?.into(),
        };

        if bytes.is_empty() {
            return Err(Error::Playback(format!("Clip {} is empty", url)));
        }

        if let Ok(mut clips) = self.clips.write() {
            clips.insert(url, Arc::clone(&bytes), self.capacity);
        }
        Ok(bytes)
    }

    /// Path under the audio root for URLs carrying the audio prefix.
    fn local_path(&self, url: &str) -> Option<PathBuf> {
        let root = self.audio_root.as_ref()?;
        let relative = url.strip_prefix(self.audio_prefix.as_str())?;
        let relative = urlencoding::decode(relative).ok()?;
        // Refuse to leave the audio root.
        if Path::new(&*relative)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return None;
        }
        Some(root.join(&*relative))
    }

    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }
}

/// Downloads `url` on a dedicated OS thread and waits for the bytes.
fn fetch_on_thread(url: &str) -> Result<Vec<u8>> {
    let url_owned = url.to_string();
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(fetch_clip(&url_owned));
    });

    rx.recv()
        .map_err(|_| Error::Playback("Download thread failed".to_string()))?
        .map_err(Error::Playback)
}

/// Downloads one clip.
pub fn fetch_clip(url: &str) -> std::result::Result<Vec<u8>, String> {
    tracing::info!("Fetching clip: {}", url);

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| format!("Failed to download audio: {}", e))?;
    if !response.status().is_success() {
        return Err(format!("Audio request returned {}", response.status()));
    }

    let bytes = response
        .bytes()
        .map_err(|e| format!("Failed to read audio bytes: {}", e))?;
    Ok(bytes.to_vec())
}
