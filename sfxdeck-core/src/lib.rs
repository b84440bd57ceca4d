//! Sfxdeck Core - Core library for the sfxdeck sound board.
//!
//! This library provides:
//! - Catalog reads (categories, sounds and their variants)
//! - A playback coordinator that keeps exactly one clip audible and mirrors
//!   its state onto every mounted surface
//! - Session lists over a signed-in server backend or tab-local guest storage
//! - The variant popover and the add-to-list flow used by the browse page
//! - Client configuration loading and validation
//! - FFI layer for embedding hosts
//!
//! # Example
//!
//! ```rust,no_run
//! use sfxdeck_core::prelude::*;
//!
//! # async fn run() -> sfxdeck_core::Result<()> {
//! let config = ConfigLoader::new(".").load()?;
//! let api = ApiClient::new(&config.server.base_url)?;
//! let catalog = CatalogClient::new(api);
//!
//! let clips = ClipCache::new(&config.server.base_url);
//! let mut coordinator = PlaybackCoordinator::new(KiraAudioBackend::new(clips));
//!
//! let sounds = catalog.sounds(&SoundQuery::default()).await?;
//! if let Some(sound) = sounds.first() {
//!     coordinator.play(sound, None);
//! }
//! # Ok(())
//! # }
//! ```

pub mod add_flow;
pub mod api;
pub mod catalog;
pub mod config;
pub mod engines;
pub mod error;
pub mod ffi;
pub mod identity;
pub mod lists;
pub mod page;
pub mod playback;
pub mod routes;
pub mod session_page;
pub mod variant_popover;

pub use error::{Error, Result};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::add_flow::{AddOutcome, AddToListFlow, ChooserOptions};
    pub use crate::api::ApiClient;
    pub use crate::catalog::{CatalogClient, Category, Sound, SoundQuery, User, Variant};
    pub use crate::config::{ClientConfig, ConfigLoader};
    pub use crate::engines::{ClipCache, KiraAudioBackend};
    pub use crate::error::{Error, Result};
    pub use crate::identity::{PlaybackKey, SoundId, VariantId};
    pub use crate::lists::{
        tab_lists, ListBackend, ListEntry, ListId, ListStore, ListSummary, RemoteListBackend,
        SessionList,
    };
    pub use crate::page::BrowsePage;
    pub use crate::session_page::{SessionPage, SessionView};
    pub use crate::playback::{
        AudioBackend, Binding, PlaybackCoordinator, PlaybackState, PlaybackStatus, SurfaceKind,
    };
    pub use crate::variant_popover::{ListenerTable, VariantPopover};
}
