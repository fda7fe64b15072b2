use serde_json::json;

use crate::auth::AuthSession;
use crate::error::ApiError;

use super::types::UserProfile;
use super::ApiClient;

impl ApiClient {
    pub async fn profile(&self, session: &AuthSession) -> Result<UserProfile, ApiError> {
        let req = self
            .client
            .get(self.url("/users/profile"))
            .bearer_auth(&session.token);
        let response = super::check(req.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn delete_account(&self, session: &AuthSession) -> Result<(), ApiError> {
        let req = self
            .client
            .delete(self.url("/users/me"))
            .bearer_auth(&session.token);
        super::check(req.send().await?).await?;
        Ok(())
    }

    /// Admin: search user accounts by email.
    pub async fn search_users(
        &self,
        query: &str,
        session: &AuthSession,
    ) -> Result<Vec<UserProfile>, ApiError> {
        let req = self
            .client
            .get(self.url("/admin/users"))
            .bearer_auth(&session.token)
            .query(&[("q", query)]);
        let response = super::check(req.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Admin: adjusts a user's remaining search quota.
    pub async fn update_searches_left(
        &self,
        user_id: &str,
        searches_left: i64,
        session: &AuthSession,
    ) -> Result<(), ApiError> {
        let req = self
            .client
            .put(self.url("/admin/users/searches-left"))
            .bearer_auth(&session.token)
            .json(&json!({ "userId": user_id, "searchesLeft": searches_left }));
        super::check(req.send().await?).await?;
        Ok(())
    }
}
