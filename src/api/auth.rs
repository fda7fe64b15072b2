use log::info;
use serde_json::json;

use crate::auth::AuthSession;
use crate::error::ApiError;

use super::types::LoginReply;
use super::ApiClient;

impl ApiClient {
    /// Authenticates and returns the session the caller owns from here on.
    /// Token persistence is the host application's concern.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let req = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }));
        let response = super::check(req.send().await?).await?;
        let reply: LoginReply = response.json().await?;
        info!("login succeeded for {email} (role {:?})", reply.role);
        Ok(AuthSession::new(reply.token, reply.role))
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let req = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "email": email, "password": password }));
        super::check(req.send().await?).await?;
        Ok(())
    }

    /// Requests a password-reset OTP for the given address.
    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let req = self
            .client
            .post(self.url("/auth/forgot-password"))
            .json(&json!({ "email": email }));
        super::check(req.send().await?).await?;
        Ok(())
    }

    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let req = self.client.post(self.url("/auth/reset-password")).json(&json!({
            "email": email,
            "otp": otp,
            "newPassword": new_password,
        }));
        super::check(req.send().await?).await?;
        Ok(())
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        session: &AuthSession,
    ) -> Result<(), ApiError> {
        let req = self
            .client
            .put(self.url("/users/password"))
            .bearer_auth(&session.token)
            .json(&json!({
                "currentPassword": current_password,
                "newPassword": new_password,
            }));
        super::check(req.send().await?).await?;
        Ok(())
    }
}
