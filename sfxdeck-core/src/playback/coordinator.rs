//! Single-active-audio playback coordinator.
//!
//! The coordinator owns the one live audio instance and the shared
//! [`PlaybackState`]. Every transition re-syncs the whole [`SurfaceBoard`],
//! so a sound shown in the browse grid and in a list sidebar always agree.

use crate::catalog::{resolve_play_url, Sound, Variant, DEFAULT_AUDIO_PREFIX};
use crate::error::Result;
use crate::identity::{key_of, PlaybackKey};
use crate::lists::ListEntry;
use crate::playback::engine::{AudioBackend, AudioEvent, AudioInstance};
use crate::playback::state::{PlaybackState, PlaybackStatus};
use crate::playback::surfaces::{Binding, SurfaceBoard, SurfaceId, SurfaceKind};

/// Generation number of an audio instance. Events tagged with an older
/// generation belong to a torn-down instance and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u64);

struct LiveInstance<I> {
    id: InstanceId,
    key: PlaybackKey,
    instance: I,
}

/// Owns playback state and the live audio instance.
pub struct PlaybackCoordinator<B: AudioBackend> {
    backend: B,
    audio_prefix: String,
    state: PlaybackState,
    live: Option<LiveInstance<B::Instance>>,
    generation: u64,
    surfaces: SurfaceBoard,
}

impl<B: AudioBackend> PlaybackCoordinator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            audio_prefix: DEFAULT_AUDIO_PREFIX.to_string(),
            state: PlaybackState::idle(),
            live: None,
            generation: 0,
            surfaces: SurfaceBoard::new(),
        }
    }

    pub fn with_audio_prefix(mut self, prefix: &str) -> Self {
        self.audio_prefix = prefix.to_string();
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn surfaces(&self) -> &SurfaceBoard {
        &self.surfaces
    }

    /// Generation of the live instance, if any.
    pub fn live_instance(&self) -> Option<InstanceId> {
        self.live.as_ref().map(|l| l.id)
    }

    /// Mounts a surface showing the current state.
    pub fn mount(&mut self, kind: SurfaceKind, binding: Binding) -> SurfaceId {
        self.surfaces.mount(kind, binding, &self.state)
    }

    pub fn unmount(&mut self, id: SurfaceId) -> bool {
        self.surfaces.unmount(id)
    }

    pub fn unmount_kind(&mut self, kind: SurfaceKind) -> usize {
        self.surfaces.unmount_kind(kind)
    }

    /// Plays `sound` (or one of its variants), replacing whatever was live.
    ///
    /// Load and start failures are not returned; they reset the state to idle.
    pub fn play(&mut self, sound: &Sound, variant: Option<&Variant>) {
        let key = key_of(sound, variant);
        let url = resolve_play_url(sound, variant, &self.audio_prefix);
        self.start(key, &url);
    }

    /// Plays a stored list entry using its denormalised URL.
    pub fn play_entry(&mut self, entry: &ListEntry) {
        let url = entry.play_url(&self.audio_prefix);
        self.start(entry.key(), &url);
    }

    /// Pauses or resumes the live instance when it plays `key`. Never starts
    /// a new instance.
    pub fn toggle(&mut self, key: &PlaybackKey) {
        let Some(live) = self.live.as_mut() else {
            return;
        };
        if live.key != *key {
            return;
        }

        match self.state.status {
            PlaybackStatus::Playing => {
                live.instance.pause();
                self.state = PlaybackState::paused(*key);
            }
            PlaybackStatus::Paused => match live.instance.play() {
                Ok(()) => self.state = PlaybackState::playing(*key),
                Err(e) => {
                    tracing::debug!("Resume of {} failed: {}", key, e);
                    self.teardown();
                    self.state = PlaybackState::idle();
                }
            },
            PlaybackStatus::Idle => return,
        }
        self.surfaces.sync(&self.state);
    }

    /// Tears down the live instance (page navigation).
    pub fn stop(&mut self) {
        self.teardown();
        self.state = PlaybackState::idle();
        self.surfaces.sync(&self.state);
    }

    /// Drains pending events from the live instance.
    pub fn poll(&mut self) {
        loop {
            let Some(live) = self.live.as_mut() else {
                return;
            };
            let id = live.id;
            let Some(event) = live.instance.poll_event() else {
                return;
            };
            self.dispatch(id, event);
        }
    }

    /// Applies an engine event. Events from superseded instances are ignored.
    pub fn dispatch(&mut self, instance: InstanceId, event: AudioEvent) {
        let Some(key) = self.live.as_ref().filter(|l| l.id == instance).map(|l| l.key) else {
            tracing::debug!("Ignoring {:?} from stale instance {:?}", event, instance);
            return;
        };

        match event {
            AudioEvent::Playing => self.state = PlaybackState::playing(key),
            AudioEvent::Paused => self.state = PlaybackState::paused(key),
            AudioEvent::Ended => {
                self.teardown();
                self.state = PlaybackState::idle();
            }
            AudioEvent::Failed(reason) => {
                tracing::debug!("Playback of {} failed: {}", key, reason);
                self.teardown();
                self.state = PlaybackState::idle();
            }
        }
        self.surfaces.sync(&self.state);
    }

    fn start(&mut self, key: PlaybackKey, url: &str) {
        self.teardown();
        self.generation += 1;
        let id = InstanceId(self.generation);

        match self.load_and_play(url) {
            Ok(instance) => {
                self.live = Some(LiveInstance { id, key, instance });
                self.state = PlaybackState::playing(key);
            }
            Err(e) => {
                tracing::debug!("Could not play {} from {}: {}", key, url, e);
                self.state = PlaybackState::idle();
            }
        }
        self.surfaces.sync(&self.state);
    }

    fn load_and_play(&self, url: &str) -> Result<B::Instance> {
        let mut instance = self.backend.load(url)?;
        instance.play()?;
        Ok(instance)
    }

    fn teardown(&mut self) {
        if let Some(mut live) = self.live.take() {
            live.instance.halt();
        }
    }
}

impl<B: AudioBackend> Drop for PlaybackCoordinator<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
