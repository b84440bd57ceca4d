//! Rendered representations of sounds and their play/pause appearance.
//!
//! A page can show the same sound in several places at once (a browse grid
//! card, a pinned-list sidebar row, a session list card). The board keeps
//! every mounted surface so the coordinator can re-sync all of them after
//! each state change.

use std::collections::BTreeMap;

use crate::identity::{PlaybackKey, SoundId};
use crate::playback::state::{PlaybackState, PlaybackStatus};

/// Handle to a mounted surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(u64);

/// Page region a surface belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Browse grid card.
    GridCard,
    /// Pinned-list sidebar row on the browse page.
    SidebarRow,
    /// Sound card on a session list page.
    ListCard,
}

/// What a surface displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Exactly one playback key.
    Key(PlaybackKey),
    /// Every recording of one sound (a browse card whose variants are chosen
    /// from a popover).
    Sound(SoundId),
}

impl Binding {
    pub fn matches(&self, key: &PlaybackKey) -> bool {
        match self {
            Binding::Key(k) => k == key,
            Binding::Sound(id) => key.sound == *id,
        }
    }
}

#[derive(Debug, Clone)]
struct Surface {
    kind: SurfaceKind,
    binding: Binding,
    appearance: PlaybackStatus,
}

/// All currently mounted surfaces.
#[derive(Debug, Default)]
pub struct SurfaceBoard {
    next_id: u64,
    surfaces: BTreeMap<SurfaceId, Surface>,
}

impl SurfaceBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts a surface already showing the appearance for `state`.
    pub fn mount(&mut self, kind: SurfaceKind, binding: Binding, state: &PlaybackState) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        let appearance = appearance_for(&binding, state);
        self.surfaces.insert(
            id,
            Surface {
                kind,
                binding,
                appearance,
            },
        );
        id
    }

    /// Removes a surface. Returns false when it was not mounted.
    pub fn unmount(&mut self, id: SurfaceId) -> bool {
        self.surfaces.remove(&id).is_some()
    }

    /// Drops every surface of a kind (a re-rendered page region).
    pub fn unmount_kind(&mut self, kind: SurfaceKind) -> usize {
        let before = self.surfaces.len();
        self.surfaces.retain(|_, s| s.kind != kind);
        before - self.surfaces.len()
    }

    pub fn clear(&mut self) {
        self.surfaces.clear();
    }

    pub fn appearance(&self, id: SurfaceId) -> Option<PlaybackStatus> {
        self.surfaces.get(&id).map(|s| s.appearance)
    }

    pub fn binding(&self, id: SurfaceId) -> Option<Binding> {
        self.surfaces.get(&id).map(|s| s.binding)
    }

    /// Surfaces currently showing `status`.
    pub fn showing(&self, status: PlaybackStatus) -> Vec<SurfaceId> {
        self.surfaces
            .iter()
            .filter(|(_, s)| s.appearance == status)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Surfaces whose binding matches `key`.
    pub fn displaying(&self, key: &PlaybackKey) -> Vec<SurfaceId> {
        self.surfaces
            .iter()
            .filter(|(_, s)| s.binding.matches(key))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Re-syncs every surface to `state`: surfaces for other keys go idle,
    /// then every surface displaying the active key takes its status.
    pub fn sync(&mut self, state: &PlaybackState) {
        for surface in self.surfaces.values_mut() {
            let shows_active = state.active_key.map_or(false, |k| surface.binding.matches(&k));
            if !shows_active {
                surface.appearance = PlaybackStatus::Idle;
            }
        }

        if let Some(key) = state.active_key {
            for surface in self.surfaces.values_mut() {
                if surface.binding.matches(&key) {
                    surface.appearance = state.status;
                }
            }
        }
    }
}

fn appearance_for(binding: &Binding, state: &PlaybackState) -> PlaybackStatus {
    match state.active_key {
        Some(key) if binding.matches(&key) => state.status,
        _ => PlaybackStatus::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::VariantId;

    fn key(sound: u64, variant: Option<u64>) -> PlaybackKey {
        PlaybackKey::new(SoundId(sound), variant.map(VariantId))
    }

    #[test]
    fn test_mount_applies_current_state() {
        let mut board = SurfaceBoard::new();
        let state = PlaybackState::paused(key(3, Some(4)));

        let row = board.mount(SurfaceKind::SidebarRow, Binding::Key(key(3, Some(4))), &state);
        let other = board.mount(SurfaceKind::SidebarRow, Binding::Key(key(3, None)), &state);

        assert_eq!(board.appearance(row), Some(PlaybackStatus::Paused));
        assert_eq!(board.appearance(other), Some(PlaybackStatus::Idle));
    }

    #[test]
    fn test_sync_moves_playing_between_keys() {
        let mut board = SurfaceBoard::new();
        let idle = PlaybackState::idle();
        let a = board.mount(SurfaceKind::ListCard, Binding::Key(key(1, None)), &idle);
        let b = board.mount(SurfaceKind::ListCard, Binding::Key(key(2, None)), &idle);

        board.sync(&PlaybackState::playing(key(1, None)));
        board.sync(&PlaybackState::playing(key(2, None)));

        assert_eq!(board.appearance(a), Some(PlaybackStatus::Idle));
        assert_eq!(board.appearance(b), Some(PlaybackStatus::Playing));
        assert_eq!(board.showing(PlaybackStatus::Playing), vec![b]);
    }

    #[test]
    fn test_sound_binding_follows_any_variant() {
        let mut board = SurfaceBoard::new();
        let idle = PlaybackState::idle();
        let card = board.mount(SurfaceKind::GridCard, Binding::Sound(SoundId(5)), &idle);
        let row = board.mount(SurfaceKind::SidebarRow, Binding::Key(key(5, None)), &idle);

        board.sync(&PlaybackState::playing(key(5, Some(9))));

        assert_eq!(board.appearance(card), Some(PlaybackStatus::Playing));
        assert_eq!(board.appearance(row), Some(PlaybackStatus::Idle));
    }

    #[test]
    fn test_unmount_kind_drops_region() {
        let mut board = SurfaceBoard::new();
        let idle = PlaybackState::idle();
        board.mount(SurfaceKind::SidebarRow, Binding::Key(key(1, None)), &idle);
        board.mount(SurfaceKind::SidebarRow, Binding::Key(key(2, None)), &idle);
        let card = board.mount(SurfaceKind::GridCard, Binding::Sound(SoundId(1)), &idle);

        assert_eq!(board.unmount_kind(SurfaceKind::SidebarRow), 2);
        assert_eq!(board.len(), 1);
        assert!(board.unmount(card));
        assert!(board.is_empty());
    }
}
