//! Audio engine: clip fetching and kira playback.

pub mod audio_output;
mod clip_cache;
mod sound;

pub use clip_cache::{fetch_clip, ClipBytes, ClipCache, DEFAULT_CLIP_CAPACITY};
pub use sound::{decode_clip, KiraAudioBackend, KiraInstance};
