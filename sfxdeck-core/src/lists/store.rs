//! The list store: one contract over the remote and guest backends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::catalog::{Sound, Variant};
use crate::error::{Error, Result};
use crate::identity::{PlaybackKey, SoundId, VariantId};
use crate::lists::backend::ListBackend;
use crate::lists::types::{validate_name, BackendKind, ListId, ListSummary, SessionList};

/// Routes each list operation to the backend that owns the id.
///
/// Operations on an existing list dispatch on the [`ListId`] tag only.
/// Operations that have no id yet (`list_all`, `create`) follow the
/// signed-in flag.
pub struct ListStore {
    remote: Arc<dyn ListBackend>,
    ephemeral: Arc<dyn ListBackend>,
    signed_in: AtomicBool,
}

impl ListStore {
    pub fn new(remote: Arc<dyn ListBackend>, ephemeral: Arc<dyn ListBackend>, signed_in: bool) -> Self {
        Self {
            remote,
            ephemeral,
            signed_in: AtomicBool::new(signed_in),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }

    pub fn set_signed_in(&self, signed_in: bool) {
        self.signed_in.store(signed_in, Ordering::SeqCst);
    }

    /// Backend a new list is created in for the current user.
    pub fn session_kind(&self) -> BackendKind {
        if self.is_signed_in() {
            BackendKind::Remote
        } else {
            BackendKind::Ephemeral
        }
    }

    fn backend(&self, kind: BackendKind) -> &dyn ListBackend {
        match kind {
            BackendKind::Remote => self.remote.as_ref(),
            BackendKind::Ephemeral => self.ephemeral.as_ref(),
        }
    }

    fn owner(&self, id: &ListId) -> &dyn ListBackend {
        self.backend(id.backend())
    }

    /// Lists visible to the current user. An expired session flips the store
    /// to signed-out and answers with the guest lists.
    pub async fn list_all(&self) -> Result<Vec<ListSummary>> {
        if !self.is_signed_in() {
            return self.ephemeral.list_all().await;
        }
        match self.remote.list_all().await {
            Err(Error::AuthRequired) => {
                tracing::info!("Session expired, showing guest lists");
                self.set_signed_in(false);
                self.ephemeral.list_all().await
            }
            other => other,
        }
    }

    pub async fn get(&self, id: &ListId) -> Result<SessionList> {
        self.owner(id).get(id).await
    }

    /// Creates a list in the backend for the current user.
    pub async fn create(&self, name: &str) -> Result<SessionList> {
        let name = validate_name(name)?;
        self.backend(self.session_kind()).create(&name).await
    }

    /// Creates a list, falling back to a guest list when the server says the
    /// session is gone.
    pub async fn create_for_session(&self, name: &str) -> Result<SessionList> {
        let name = validate_name(name)?;
        if !self.is_signed_in() {
            return self.ephemeral.create(&name).await;
        }
        match self.remote.create(&name).await {
            Err(Error::AuthRequired) => {
                tracing::info!("Session expired, creating \"{}\" as a guest list", name);
                self.set_signed_in(false);
                self.ephemeral.create(&name).await
            }
            other => other,
        }
    }

    pub async fn rename(&self, id: &ListId, name: &str) -> Result<SessionList> {
        let name = validate_name(name)?;
        self.owner(id).rename(id, &name).await
    }

    pub async fn delete(&self, id: &ListId) -> Result<()> {
        self.owner(id).delete(id).await
    }

    pub async fn add_item(
        &self,
        id: &ListId,
        sound: &Sound,
        variant: Option<&Variant>,
    ) -> Result<SessionList> {
        self.owner(id).add_item(id, sound, variant).await
    }

    pub async fn remove_item(
        &self,
        id: &ListId,
        sound_id: SoundId,
        variant_id: Option<VariantId>,
    ) -> Result<SessionList> {
        self.owner(id).remove_item(id, sound_id, variant_id).await
    }

    pub async fn reorder(&self, id: &ListId, order: &[PlaybackKey]) -> Result<SessionList> {
        self.owner(id).reorder(id, order).await
    }
}
