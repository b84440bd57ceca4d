//! Application state shared by every command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sfxdeck_core::api::ApiClient;
use sfxdeck_core::catalog::CatalogClient;
use sfxdeck_core::config::{ClientConfig, ConfigLoader};
use sfxdeck_core::engines::{ClipCache, KiraAudioBackend};
use sfxdeck_core::lists::{
    EphemeralListBackend, ListBackend, ListStore, MemoryStorage, RemoteListBackend,
};
use sfxdeck_core::playback::PlaybackCoordinator;

/// Connection to one server plus the local playback engine.
pub struct AppState {
    pub config: ClientConfig,
    pub catalog: CatalogClient,
    pub store: Arc<ListStore>,
    coordinator: Option<PlaybackCoordinator<KiraAudioBackend>>,
}

/// Loads the config from `path`, or searches the working directory and the
/// user config directory when no path is given.
pub fn load_config(path: Option<PathBuf>, server: Option<String>) -> Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ConfigLoader::new_with_dirs(Vec::new())
            .load_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ConfigLoader::new_with_dirs(search_dirs()).load()?,
    };
    if let Some(base_url) = server {
        config.server.base_url = base_url;
    }
    if let Some(source) = &config.source_path {
        tracing::info!("Using config {}", source.display());
    }
    Ok(config)
}

fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(home) = std::env::var_os("HOME") {
        dirs.push(PathBuf::from(home).join(".config").join("sfxdeck"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    dirs
}

impl AppState {
    /// Builds the clients and asks the server who is signed in.
    ///
    /// `guest` skips the lookup and keeps every list in this process.
    pub async fn connect(config: ClientConfig, guest: bool) -> Result<Self> {
        let api = ApiClient::new(&config.server.base_url)?;
        let catalog = CatalogClient::new(api.clone());

        let signed_in = if guest {
            false
        } else {
            match catalog.current_user().await {
                Ok(Some(user)) => {
                    tracing::info!(
                        "Signed in as {}",
                        user.username.as_deref().unwrap_or("user")
                    );
                    true
                }
                Ok(None) => false,
                Err(e) => {
                    tracing::warn!("User lookup failed, continuing as guest: {}", e);
                    false
                }
            }
        };

        let remote: Arc<dyn ListBackend> = Arc::new(
            RemoteListBackend::new(api).with_audio_prefix(&config.server.audio_prefix),
        );
        let mut ephemeral =
            EphemeralListBackend::with_key(MemoryStorage::new(), &config.storage.guest_lists_key);
        ephemeral.set_audio_prefix(&config.server.audio_prefix);
        let ephemeral: Arc<dyn ListBackend> = Arc::new(ephemeral);

        Ok(Self {
            store: Arc::new(ListStore::new(remote, ephemeral, signed_in)),
            catalog,
            config,
            coordinator: None,
        })
    }

    /// The playback coordinator, created on first use so list commands never
    /// open the audio device.
    pub fn coordinator(&mut self) -> &mut PlaybackCoordinator<KiraAudioBackend> {
        let config = &self.config;
        self.coordinator
            .get_or_insert_with(|| build_coordinator(config))
    }
}

fn build_coordinator(config: &ClientConfig) -> PlaybackCoordinator<KiraAudioBackend> {
    let mut clips = ClipCache::new(&config.server.base_url);
    clips.set_audio_prefix(&config.server.audio_prefix);
    clips.set_capacity(config.playback.clip_cache_size);
    if let Some(root) = &config.playback.audio_root {
        clips.set_audio_root(root);
    }
    PlaybackCoordinator::new(KiraAudioBackend::new(clips)).with_audio_prefix(&config.server.audio_prefix)
}
