pub mod api;
pub mod auth;
pub mod error;
pub mod favorites;
pub mod ink;
pub mod search;

pub use api::{ApiClient, ApiFavoritesBackend, ApiSearchBackend};
pub use auth::{AuthSession, Role};
pub use error::{ApiError, RecognizeError};
pub use favorites::{FavoritesBackend, FavoritesOverlay};
pub use ink::{GesturePhase, GestureRecorder, HttpRecognitionTransport, InkRecognizer};
pub use search::{SearchBackend, SearchPhase, SearchSession, SearchSnapshot};
