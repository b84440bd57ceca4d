//! Shared kira audio manager.
//!
//! One `AudioManager` drives the output device for the whole process. It is
//! created on first use and kept behind a mutex; when no device can be
//! opened the slot holds `None` and playback reports `NoAudioDevice`.

use std::sync::{Mutex, OnceLock};

use kira::{AudioManager, AudioManagerSettings, DefaultBackend};

static AUDIO_MANAGER: OnceLock<Option<Mutex<AudioManager<DefaultBackend>>>> = OnceLock::new();

fn manager() -> Option<&'static Mutex<AudioManager<DefaultBackend>>> {
    AUDIO_MANAGER
        .get_or_init(|| match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(manager) => Some(Mutex::new(manager)),
            Err(e) => {
                tracing::warn!("Failed to initialize audio output: {}", e);
                None
            }
        })
        .as_ref()
}

/// Returns whether an audio output device could be opened.
pub fn is_audio_available() -> bool {
    manager().is_some()
}

/// Runs `f` with the shared manager. Returns `None` when no device is
/// available or the manager lock is poisoned.
pub fn with_audio_manager<R>(f: impl FnOnce(&mut AudioManager<DefaultBackend>) -> R) -> Option<R> {
    let mut guard = manager()?.lock().ok()?;
    Some(f(&mut guard))
}
