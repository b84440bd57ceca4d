//! The single playback state value.

use crate::identity::PlaybackKey;

/// What a surface shows for its key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// `{active_key, status}`. `active_key` is `None` exactly when idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub active_key: Option<PlaybackKey>,
    pub status: PlaybackStatus,
}

impl PlaybackState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn playing(key: PlaybackKey) -> Self {
        Self {
            active_key: Some(key),
            status: PlaybackStatus::Playing,
        }
    }

    pub fn paused(key: PlaybackKey) -> Self {
        Self {
            active_key: Some(key),
            status: PlaybackStatus::Paused,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active_key.is_none()
    }

    /// Status shown for `key`: the live status when it is the active key,
    /// idle otherwise.
    pub fn status_of(&self, key: &PlaybackKey) -> PlaybackStatus {
        match self.active_key {
            Some(active) if active == *key => self.status,
            _ => PlaybackStatus::Idle,
        }
    }
}
