use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::favorites::FavoritesBackend;

use super::types::{Entry, ResultPage};
use super::ApiClient;

impl ApiClient {
    /// Full (non-paginated) favorites listing.
    pub async fn favorites(&self, session: &AuthSession) -> Result<Vec<Entry>, ApiError> {
        let req = self
            .client
            .get(self.url("/users/favorites"))
            .bearer_auth(&session.token);
        let response = super::check(req.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn favorites_page(
        &self,
        page: u32,
        limit: u32,
        session: &AuthSession,
    ) -> Result<ResultPage, ApiError> {
        let req = self
            .client
            .get(self.url("/users/favorites/paginated"))
            .bearer_auth(&session.token)
            .query(&[("page", page.to_string()), ("limit", limit.to_string())]);
        let response = super::check(req.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn add_favorite(&self, word_id: &str, session: &AuthSession) -> Result<(), ApiError> {
        let req = self
            .client
            .post(self.url("/users/favorites/add"))
            .bearer_auth(&session.token)
            .json(&json!({ "wordId": word_id }));
        super::check(req.send().await?).await?;
        Ok(())
    }

    // The backend expects the id in a DELETE body rather than the path.
    pub async fn remove_favorite(
        &self,
        word_id: &str,
        session: &AuthSession,
    ) -> Result<(), ApiError> {
        let req = self
            .client
            .delete(self.url("/users/favorites/remove"))
            .bearer_auth(&session.token)
            .json(&json!({ "wordId": word_id }));
        super::check(req.send().await?).await?;
        Ok(())
    }
}

/// Production [`FavoritesBackend`] over the user favorites endpoints.
pub struct ApiFavoritesBackend {
    api: Arc<ApiClient>,
    session: AuthSession,
}

impl ApiFavoritesBackend {
    pub fn new(api: Arc<ApiClient>, session: AuthSession) -> Self {
        Self { api, session }
    }
}

#[async_trait]
impl FavoritesBackend for ApiFavoritesBackend {
    async fn list(&self) -> Result<Vec<Entry>, ApiError> {
        self.api.favorites(&self.session).await
    }

    async fn list_page(&self, page: u32, limit: u32) -> Result<ResultPage, ApiError> {
        self.api.favorites_page(page, limit, &self.session).await
    }

    async fn add(&self, word_id: &str) -> Result<(), ApiError> {
        self.api.add_favorite(word_id, &self.session).await
    }

    async fn remove(&self, word_id: &str) -> Result<(), ApiError> {
        self.api.remove_favorite(word_id, &self.session).await
    }
}
