//! kira-backed audio engine for the playback coordinator.

use std::io::Cursor;

use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::sound::PlaybackState;
use kira::Tween;

use crate::engines::audio_output::{is_audio_available, with_audio_manager};
use crate::engines::clip_cache::{ClipBytes, ClipCache};
use crate::error::{Error, Result};
use crate::playback::{AudioBackend, AudioEvent, AudioInstance};

/// Decodes clip bytes into kira sound data.
pub fn decode_clip(bytes: ClipBytes, url: &str) -> Result<StaticSoundData> {
    StaticSoundData::from_cursor(Cursor::new(bytes))
        .map_err(|e| Error::Playback(format!("Failed to decode {}: {}", url, e)))
}

/// Audio backend that plays clips through the shared kira manager. Clip
/// bytes are cached by the [`ClipCache`]; each load decodes afresh.
pub struct KiraAudioBackend {
    clips: ClipCache,
    available: bool,
}

impl KiraAudioBackend {
    pub fn new(clips: ClipCache) -> Self {
        let available = is_audio_available();
        if !available {
            tracing::warn!("No audio output device detected. Sound playback will be disabled.");
        }

        Self {
            clips,
            available,
        }
    }

    /// Returns whether an audio output device is available.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Clips currently held in memory.
    pub fn cached_clips(&self) -> usize {
        self.clips.len()
    }

    fn sound_data(&self, url: &str) -> Result<StaticSoundData> {
        decode_clip(self.clips.get_or_fetch(url)?, url)
    }
}

impl AudioBackend for KiraAudioBackend {
    type Instance = KiraInstance;

    fn load(&self, url: &str) -> Result<KiraInstance> {
        if !self.available {
            return Err(Error::NoAudioDevice);
        }
        Ok(KiraInstance::new(self.sound_data(url)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Observed {
    Idle,
    Playing,
    Paused,
    Ended,
}

/// One clip on the kira manager. The sound handle exists from the first
/// `play` until `halt`.
pub struct KiraInstance {
    data: StaticSoundData,
    handle: Option<StaticSoundHandle>,
    observed: Observed,
}

impl KiraInstance {
    fn new(data: StaticSoundData) -> Self {
        Self {
            data,
            handle: None,
            observed: Observed::Idle,
        }
    }
}

impl AudioInstance for KiraInstance {
    fn play(&mut self) -> Result<()> {
        match self.handle.as_mut() {
            Some(handle) => handle.resume(Tween::default()),
            None => {
                let handle = with_audio_manager(|mgr| mgr.play(self.data.clone()))
                    .ok_or(Error::NoAudioDevice)?
                    .map_err(|e| Error::Playback(format!("{}", e)))?;
                self.handle = Some(handle);
            }
        }
        self.observed = Observed::Playing;
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.pause(Tween::default());
            self.observed = Observed::Paused;
        }
    }

    fn halt(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.stop(Tween::default());
        }
        self.observed = Observed::Idle;
    }

    fn poll_event(&mut self) -> Option<AudioEvent> {
        let handle = self.handle.as_ref()?;
        let now = match handle.state() {
            PlaybackState::Playing | PlaybackState::Resuming => Observed::Playing,
            PlaybackState::Pausing | PlaybackState::Paused | PlaybackState::WaitingToResume => {
                Observed::Paused
            }
            PlaybackState::Stopped => Observed::Ended,
            PlaybackState::Stopping => return None,
        };
        if now == self.observed {
            return None;
        }
        self.observed = now;
        Some(match now {
            Observed::Playing => AudioEvent::Playing,
            Observed::Paused => AudioEvent::Paused,
            Observed::Ended | Observed::Idle => AudioEvent::Ended,
        })
    }
}

impl Drop for KiraInstance {
    fn drop(&mut self) {
        self.halt();
    }
}
