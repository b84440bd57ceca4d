//! Audio engine seam used by the playback coordinator.

use crate::error::Result;

/// Lifecycle notifications from a live instance.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// Playback started or resumed.
    Playing,
    /// Playback paused before the end.
    Paused,
    /// Reached the end of the clip.
    Ended,
    /// Decoding or output failed mid-playback.
    Failed(String),
}

/// One loaded audio clip.
pub trait AudioInstance: Send {
    /// Starts playback, or resumes after a pause.
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    /// Stops playback and rewinds to the start.
    fn halt(&mut self);

    /// Next lifecycle event, if one happened since the last call.
    fn poll_event(&mut self) -> Option<AudioEvent>;
}

/// Creates audio instances for playable URLs.
pub trait AudioBackend: Send + Sync {
    type Instance: AudioInstance;

    /// Loads the clip at `url`. Fails when the clip cannot be fetched or decoded.
    fn load(&self, url: &str) -> Result<Self::Instance>;
}
