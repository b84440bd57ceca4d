//! Playback coordination: one live audio instance, many surfaces.

mod coordinator;
mod engine;
mod state;
mod surfaces;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{InstanceId, PlaybackCoordinator};
pub use engine::{AudioBackend, AudioEvent, AudioInstance};
pub use state::{PlaybackState, PlaybackStatus};
pub use surfaces::{Binding, SurfaceBoard, SurfaceId, SurfaceKind};
