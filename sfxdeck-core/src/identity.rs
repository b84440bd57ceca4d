//! Playback identity: how a sound and an optional variant form one key.
//!
//! A [`PlaybackKey`] is the only safe way to ask "is this the thing that is
//! playing". The same sound can be rendered in the browse grid and in a list
//! sidebar at the same time, so object identity says nothing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{Sound, Variant};

/// Globally unique catalog id of a sound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundId(pub u64);

/// Variant id, unique only within its parent sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(pub u64);

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite identity `(sound, variant | base audio)`.
///
/// `variant == None` is the sound's own audio and never equals a key naming
/// a concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackKey {
    pub sound: SoundId,
    pub variant: Option<VariantId>,
}

impl PlaybackKey {
    pub fn new(sound: SoundId, variant: Option<VariantId>) -> Self {
        Self { sound, variant }
    }

    /// Key for the sound's base audio.
    pub fn base(sound: SoundId) -> Self {
        Self { sound, variant: None }
    }
}

impl fmt::Display for PlaybackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant {
            Some(v) => write!(f, "{}:{}", self.sound, v),
            None => write!(f, "{}", self.sound),
        }
    }
}

/// Computes the playback key for a sound and an optional variant.
pub fn key_of(sound: &Sound, variant: Option<&Variant>) -> PlaybackKey {
    PlaybackKey::new(sound.id, variant.map(|v| v.id))
}

/// Returns true when the sound offers a real choice between recordings.
///
/// Empty and single-element variant lists play immediately.
pub fn has_choice(sound: &Sound) -> bool {
    sound.variants.len() > 1
}

/// Display label for the variant at `index` (zero-based).
pub fn option_label(variant: &Variant, index: usize) -> String {
    match variant.label.as_deref() {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => format!("Option {}", index + 1),
    }
}
