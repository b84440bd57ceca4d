//! Read-only catalog API: categories, sounds and the current user.

use serde::Deserialize;

use crate::api::ApiClient;
use crate::catalog::{Category, Sound, SoundQuery, User};
use crate::error::Result;
use crate::identity::SoundId;

#[derive(Debug, Deserialize)]
struct CategoriesBody {
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct SoundsBody {
    #[serde(default)]
    sounds: Vec<Sound>,
}

#[derive(Debug, Deserialize)]
struct MeBody {
    #[serde(default)]
    user: Option<User>,
}

/// Client for the catalog endpoints.
#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
}

impl CatalogClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Lists active categories in server order.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let body: CategoriesBody = self.api.get("/api/categories", &[]).await?;
        Ok(body.categories)
    }

    /// Lists sounds matching the query, ordered by name.
    pub async fn sounds(&self, query: &SoundQuery) -> Result<Vec<Sound>> {
        let body: SoundsBody = self.api.get("/api/sounds", &query.params()).await?;
        Ok(body.sounds)
    }

    /// Fetches one sound.
    pub async fn sound(&self, id: SoundId) -> Result<Sound> {
        self.api.get(&format!("/api/sounds/{}", id), &[]).await
    }

    /// Returns the signed-in user, or `None` for a guest.
    pub async fn current_user(&self) -> Result<Option<User>> {
        let body: MeBody = self.api.get("/auth/me", &[]).await?;
        Ok(body.user)
    }
}
