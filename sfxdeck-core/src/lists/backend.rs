//! The uniform list contract both backends implement.

use async_trait::async_trait;

use crate::catalog::{Sound, Variant};
use crate::error::Result;
use crate::identity::{PlaybackKey, SoundId, VariantId};
use crate::lists::types::{BackendKind, ListId, ListSummary, SessionList};

/// Storage for session lists.
///
/// Every mutating operation returns the list as the backend now holds it, so
/// callers always render from the latest authoritative state.
#[async_trait]
pub trait ListBackend: Send + Sync {
    /// Which ids this backend owns.
    fn kind(&self) -> BackendKind;

    /// All lists as `{id, name}` rows.
    async fn list_all(&self) -> Result<Vec<ListSummary>>;

    /// One list with its entries. `NotFound` when the id does not resolve.
    async fn get(&self, id: &ListId) -> Result<SessionList>;

    /// Creates an empty list. `Validation` when the trimmed name is empty.
    async fn create(&self, name: &str) -> Result<SessionList>;

    /// Renames a list. Same validation as [`ListBackend::create`].
    async fn rename(&self, id: &ListId, name: &str) -> Result<SessionList>;

    /// Deletes a list.
    async fn delete(&self, id: &ListId) -> Result<()>;

    /// Appends `(sound, variant?)`. Adding a key that is already present
    /// succeeds with the list unchanged.
    async fn add_item(
        &self,
        id: &ListId,
        sound: &Sound,
        variant: Option<&Variant>,
    ) -> Result<SessionList>;

    /// Removes the entry with exactly this key; absent keys are a no-op.
    async fn remove_item(
        &self,
        id: &ListId,
        sound_id: SoundId,
        variant_id: Option<VariantId>,
    ) -> Result<SessionList>;

    /// Moves the named entries to the front in the given order.
    ///
    /// Server lists position entries by sound id. An order naming two
    /// entries of the same sound fails with `Validation` there.
    async fn reorder(&self, id: &ListId, order: &[PlaybackKey]) -> Result<SessionList>;
}
