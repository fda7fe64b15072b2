use thiserror::Error;

/// Errors surfaced by the backend API client.
///
/// Transport-level failures (`Network`) and auth rejections are separated so
/// callers can block unauthenticated operations before dispatch and present
/// network problems as retryable.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend rejected the credential (HTTP 401). The caller owns the
    /// session lifecycle and should re-authenticate.
    #[error("authentication required")]
    AuthRequired,

    /// The account ran out of search quota (HTTP 403 with the backend's
    /// SEARCH_LIMIT_REACHED code).
    #[error("search limit reached")]
    SearchLimitReached,

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Errors from the handwriting recognition bridge.
#[derive(Debug, Error)]
pub enum RecognizeError {
    /// `recognize` was called before any stroke was recorded. No network
    /// request is made in this case.
    #[error("no strokes recorded")]
    EmptyGesture,

    /// The service answered but returned no usable transcription. The gesture
    /// is preserved so the user can retry without redrawing.
    #[error("recognition service returned no usable result")]
    Failed,

    #[error("recognition transport error: {0}")]
    Transport(String),
}
