use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::auth::AuthSession;
use crate::error::ApiError;

pub mod auth;
pub mod favorites;
pub mod types;
pub mod users;
pub mod words;

pub use favorites::ApiFavoritesBackend;
pub use words::ApiSearchBackend;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bulk imports can carry six-figure row counts, so the upload client gets a
/// far larger window. No automatic retry; failures surface to the user.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// HTTP client for the dictionary backend.
///
/// Holds two reqwest clients: one with the default timeout for ordinary
/// search/list/mutation calls and one with an extended timeout for bulk
/// uploads. Endpoint methods live in the sibling modules (`words`,
/// `favorites`, `auth`, `users`).
pub struct ApiClient {
    client: Client,
    upload_client: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the given base URL (no trailing slash needed).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        let upload_client = Client::builder().timeout(UPLOAD_TIMEOUT).build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            client,
            upload_client,
            base_url,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) fn with_auth(req: RequestBuilder, session: Option<&AuthSession>) -> RequestBuilder {
        match session {
            Some(session) => req.bearer_auth(&session.token),
            None => req,
        }
    }
}

/// Maps non-success statuses to the error taxonomy. A 401 always means the
/// credential is gone (the session owner must re-authenticate); a 403 carrying
/// the backend's quota code becomes [`ApiError::SearchLimitReached`].
pub(crate) async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::AuthRequired);
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::FORBIDDEN && body.contains("SEARCH_LIMIT_REACHED") {
        return Err(ApiError::SearchLimitReached);
    }

    Err(ApiError::Api {
        status: status.as_u16(),
        message: body,
    })
}
