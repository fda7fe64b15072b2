use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use log::{error, warn};
use tokio::sync::Mutex;

use crate::api::types::{Entry, ResultPage};
use crate::error::ApiError;

/// Favorites endpoints as seen by the overlay. Production code uses
/// [`crate::api::ApiFavoritesBackend`]; tests substitute mocks.
#[async_trait]
pub trait FavoritesBackend: Send + Sync {
    async fn list(&self) -> Result<Vec<Entry>, ApiError>;
    async fn list_page(&self, page: u32, limit: u32) -> Result<ResultPage, ApiError>;
    async fn add(&self, word_id: &str) -> Result<(), ApiError>;
    async fn remove(&self, word_id: &str) -> Result<(), ApiError>;
}

struct OverlayState {
    ids: HashSet<String>,
    loaded: bool,
}

/// Local cache of favorited entry ids, layered over whatever result list is
/// on screen. Membership checks are O(1); favorite counts run into the
/// hundreds, so a linear scan per rendered row would not do.
///
/// The backend is the source of truth. Toggles apply optimistically and roll
/// back on failure; concurrent toggles of the same id are last-write-wins
/// locally and reconcile on the next [`reload`](FavoritesOverlay::reload).
#[derive(Clone)]
pub struct FavoritesOverlay {
    backend: Arc<dyn FavoritesBackend>,
    state: Arc<Mutex<OverlayState>>,
}

impl FavoritesOverlay {
    pub fn new(backend: Arc<dyn FavoritesBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(OverlayState {
                ids: HashSet::new(),
                loaded: false,
            })),
        }
    }

    /// Refreshes the overlay from the backend's full favorites list. Called
    /// on screen focus. On failure the previous set is kept (stale but
    /// available); before the first successful load there is nothing to keep
    /// and the set stays empty.
    pub async fn reload(&self) {
        match self.backend.list().await {
            Ok(entries) => {
                let mut state = self.state.lock().await;
                state.ids = entries.into_iter().map(|entry| entry.id).collect();
                state.loaded = true;
            }
            Err(err) => {
                let state = self.state.lock().await;
                if state.loaded {
                    warn!("favorites refresh failed, keeping cached set: {err}");
                } else {
                    warn!("initial favorites load failed: {err}");
                }
            }
        }
    }

    /// Loads one page of the favorites listing for screens that render the
    /// entries themselves, folding the returned ids into the overlay so
    /// membership stays consistent across paginated fetches.
    pub async fn load_page(&self, page: u32, limit: u32) -> Result<ResultPage, ApiError> {
        let page = self.backend.list_page(page, limit).await?;
        let mut state = self.state.lock().await;
        for entry in &page.items {
            state.ids.insert(entry.id.clone());
        }
        state.loaded = true;
        Ok(page)
    }

    /// Toggles membership for `id`. The local set flips before the network
    /// call so the UI reflects the change immediately; if the call fails the
    /// flip is rolled back and the error returned for display.
    ///
    /// Returns whether the id is a favorite after the toggle.
    pub async fn toggle(&self, id: &str) -> Result<bool, ApiError> {
        let adding = {
            let mut state = self.state.lock().await;
            let adding = !state.ids.contains(id);
            if adding {
                state.ids.insert(id.to_string());
            } else {
                state.ids.remove(id);
            }
            adding
        };

        let outcome = if adding {
            self.backend.add(id).await
        } else {
            self.backend.remove(id).await
        };

        if let Err(err) = outcome {
            error!("favorite toggle for {id} failed, rolling back: {err}");
            let mut state = self.state.lock().await;
            if adding {
                state.ids.remove(id);
            } else {
                state.ids.insert(id.to_string());
            }
            return Err(err);
        }

        Ok(adding)
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.state.lock().await.ids.contains(id)
    }

    pub async fn ids(&self) -> HashSet<String> {
        self.state.lock().await.ids.clone()
    }
}
