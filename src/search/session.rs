use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::api::types::{Entry, ResultPage};
use crate::error::ApiError;

use super::debounce::Debouncer;
use super::merge::merge_page;

/// Matches the keystroke settle window the client has always used.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(400);

/// Source of result pages for a query session. Production code uses
/// [`crate::api::ApiSearchBackend`]; tests substitute scripted backends.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn fetch_page(&self, query: &str, page: u32) -> Result<ResultPage, ApiError>;
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SearchPhase {
    Idle,
    Pending,
    Settled,
    Failed,
}

impl Default for SearchPhase {
    fn default() -> Self {
        SearchPhase::Idle
    }
}

/// Presentation view of the session at one point in time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnapshot {
    pub phase: SearchPhase,
    pub query: String,
    pub results: Vec<Entry>,
    pub has_more: bool,
    pub total_count: u64,
    pub loading_more: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
struct SessionState {
    phase: SearchPhase,
    query: String,
    results: Vec<Entry>,
    has_more: bool,
    total_count: u64,
    page: u32,
    loading_more: bool,
    /// Bumped whenever a new authoritative request starts; a response is
    /// applied only if the generation it was issued under is still current.
    generation: u64,
    error: Option<String>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: SearchPhase::Idle,
            query: String::new(),
            results: Vec::new(),
            has_more: false,
            total_count: 0,
            page: 1,
            loading_more: false,
            generation: 0,
            error: None,
        }
    }

    fn reset(&mut self) {
        self.phase = SearchPhase::Idle;
        self.query.clear();
        self.results.clear();
        self.has_more = false;
        self.total_count = 0;
        self.page = 1;
        self.loading_more = false;
        self.error = None;
    }
}

/// One logical search interaction: current query text, merged result pages,
/// loading flags, and logical cancellation of superseded requests.
///
/// At most one authoritative fetch is in flight per session. Superseded
/// requests are allowed to finish; their results are discarded by the
/// generation check, never applied out of order.
#[derive(Clone)]
pub struct SearchSession {
    backend: Arc<dyn SearchBackend>,
    state: Arc<Mutex<SessionState>>,
    debouncer: Arc<Debouncer>,
    closed: CancellationToken,
}

impl SearchSession {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self::with_quiet_period(backend, DEFAULT_QUIET_PERIOD)
    }

    pub fn with_quiet_period(backend: Arc<dyn SearchBackend>, quiet: Duration) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(SessionState::new())),
            debouncer: Arc::new(Debouncer::new(quiet)),
            closed: CancellationToken::new(),
        }
    }

    /// Debounced entry point for keystroke updates. Empty or whitespace-only
    /// text clears the session immediately, without waiting out the quiet
    /// period.
    pub async fn set_query(&self, text: &str) {
        if text.trim().is_empty() {
            self.debouncer.cancel();
            self.clear().await;
            return;
        }

        let session = self.clone();
        let text = text.to_string();
        self.debouncer
            .schedule(async move { session.start_query(&text).await });
    }

    /// Clears results and returns to Idle. Any in-flight response becomes
    /// stale and will be discarded.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.reset();
    }

    /// Issues the authoritative page-1 fetch for `text`, bypassing the
    /// debounce window. A no-op if the same text is already pending or
    /// settled.
    pub async fn start_query(&self, text: &str) {
        let query = text.trim().to_string();
        if query.is_empty() {
            self.clear().await;
            return;
        }
        if self.closed.is_cancelled() {
            return;
        }

        let generation = {
            let mut state = self.state.lock().await;
            if state.query == query
                && matches!(state.phase, SearchPhase::Pending | SearchPhase::Settled)
            {
                return;
            }
            state.generation += 1;
            state.phase = SearchPhase::Pending;
            state.query = query.clone();
            state.loading_more = false;
            state.error = None;
            state.generation
        };

        let outcome = self.backend.fetch_page(&query, 1).await;

        let mut state = self.state.lock().await;
        if self.closed.is_cancelled() || state.generation != generation {
            info!("discarding stale response for '{query}'");
            return;
        }

        match outcome {
            Ok(mut page) => {
                // The session asked for page 1; the reply metadata does not
                // get to turn a replace into an append.
                page.current_page = 1;
                let merged = merge_page(Vec::new(), page);
                state.results = merged.items;
                state.has_more = merged.has_more;
                state.total_count = merged.total_count;
                state.page = 1;
                state.phase = SearchPhase::Settled;
            }
            Err(err) => {
                // Fail closed: the user sees "no results", the log keeps the
                // diagnostic.
                warn!("search for '{query}' failed: {err}");
                state.results.clear();
                state.has_more = false;
                state.total_count = 0;
                state.page = 1;
                state.phase = SearchPhase::Failed;
                state.error = Some(err.to_string());
            }
        }
    }

    /// Fetches the next page for the settled query and appends it. Serialized
    /// per session: a call while another is pending is a no-op, so duplicate
    /// fetches and out-of-order appends cannot happen.
    pub async fn load_more(&self) {
        let (query, next_page, generation) = {
            let mut state = self.state.lock().await;
            if self.closed.is_cancelled()
                || state.phase != SearchPhase::Settled
                || !state.has_more
                || state.loading_more
            {
                return;
            }
            state.loading_more = true;
            (state.query.clone(), state.page + 1, state.generation)
        };

        let outcome = self.backend.fetch_page(&query, next_page).await;

        let mut state = self.state.lock().await;
        if self.closed.is_cancelled() || state.generation != generation {
            info!("discarding stale page {next_page} for '{query}'");
            return;
        }
        state.loading_more = false;

        match outcome {
            Ok(mut page) => {
                page.current_page = next_page;
                let merged = merge_page(std::mem::take(&mut state.results), page);
                state.results = merged.items;
                state.has_more = merged.has_more;
                state.total_count = merged.total_count;
                state.page = next_page;
            }
            Err(err) => {
                // Keep the pages the user already has; losing settled results
                // over a failed append helps nobody.
                warn!("loading page {next_page} for '{query}' failed: {err}");
                state.error = Some(err.to_string());
            }
        }
    }

    pub async fn snapshot(&self) -> SearchSnapshot {
        let state = self.state.lock().await;
        SearchSnapshot {
            phase: state.phase,
            query: state.query.clone(),
            results: state.results.clone(),
            has_more: state.has_more,
            total_count: state.total_count,
            loading_more: state.loading_more,
            error: state.error.clone(),
        }
    }

    /// Teardown: cancels the pending debounce timer and marks the session so
    /// late-arriving results are discarded instead of applied.
    pub fn close(&self) {
        self.debouncer.cancel();
        self.closed.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn page(ids: &[&str], has_more: bool, total_count: u64) -> ResultPage {
        ResultPage {
            items: ids.iter().copied().map(Entry::with_id).collect(),
            has_more,
            total_count,
            current_page: 1,
        }
    }

    #[derive(Default)]
    struct ScriptedBackend {
        pages: HashMap<(String, u32), ResultPage>,
        delays: HashMap<(String, u32), Duration>,
        failing: HashSet<String>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn with_page(mut self, query: &str, number: u32, page: ResultPage) -> Self {
            self.pages.insert((query.to_string(), number), page);
            self
        }

        fn with_delay(mut self, query: &str, number: u32, delay: Duration) -> Self {
            self.delays.insert((query.to_string(), number), delay);
            self
        }

        fn with_failure(mut self, query: &str) -> Self {
            self.failing.insert(query.to_string());
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SearchBackend for ScriptedBackend {
        async fn fetch_page(&self, query: &str, number: u32) -> Result<ResultPage, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(&(query.to_string(), number)) {
                tokio::time::sleep(*delay).await;
            }
            if self.failing.contains(query) {
                return Err(ApiError::Api {
                    status: 500,
                    message: "scripted failure".into(),
                });
            }
            Ok(self
                .pages
                .get(&(query.to_string(), number))
                .cloned()
                .unwrap_or_else(ResultPage::empty))
        }
    }

    fn result_ids(snapshot: &SearchSnapshot) -> Vec<&str> {
        snapshot
            .results
            .iter()
            .map(|entry| entry.id.as_str())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_issue_one_fetch() {
        init_logs();
        let backend = Arc::new(
            ScriptedBackend::default().with_page("school", 1, page(&["1"], false, 1)),
        );
        let session = SearchSession::new(backend.clone() as Arc<dyn SearchBackend>);

        session.set_query("scho").await;
        session.set_query("schoo").await;
        session.set_query("school").await;
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(backend.calls(), 1);
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, SearchPhase::Settled);
        assert_eq!(snapshot.query, "school");
        assert_eq!(result_ids(&snapshot), ["1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_query_clears_immediately() {
        let backend = Arc::new(
            ScriptedBackend::default().with_page("school", 1, page(&["1"], false, 1)),
        );
        let session = SearchSession::new(backend.clone() as Arc<dyn SearchBackend>);

        session.set_query("school").await;
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(session.snapshot().await.phase, SearchPhase::Settled);

        // No time passes: the clear must not wait for the debounce window.
        session.set_query("   ").await;
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, SearchPhase::Idle);
        assert!(snapshot.results.is_empty());
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_is_discarded() {
        init_logs();
        let backend = Arc::new(
            ScriptedBackend::default()
                .with_page("first", 1, page(&["old"], false, 1))
                .with_delay("first", 1, Duration::from_millis(200))
                .with_page("second", 1, page(&["new"], false, 1))
                .with_delay("second", 1, Duration::from_millis(20)),
        );
        let session = SearchSession::new(backend.clone() as Arc<dyn SearchBackend>);

        let slow = session.clone();
        tokio::spawn(async move { slow.start_query("first").await });
        tokio::time::sleep(Duration::from_millis(1)).await;

        let fast = session.clone();
        tokio::spawn(async move { fast.start_query("second").await });
        tokio::time::sleep(Duration::from_millis(500)).await;

        // "first" resolved last but was superseded; "second" must win.
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.query, "second");
        assert_eq!(result_ids(&snapshot), ["new"]);
        assert_eq!(snapshot.phase, SearchPhase::Settled);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn repeated_query_for_settled_text_is_a_noop() {
        let backend = Arc::new(
            ScriptedBackend::default().with_page("school", 1, page(&["1"], false, 1)),
        );
        let session = SearchSession::new(backend.clone() as Arc<dyn SearchBackend>);

        session.start_query("school").await;
        session.start_query("school").await;

        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn failure_fails_closed() {
        init_logs();
        let backend = Arc::new(
            ScriptedBackend::default()
                .with_page("school", 1, page(&["1"], false, 1))
                .with_failure("broken"),
        );
        let session = SearchSession::new(backend.clone() as Arc<dyn SearchBackend>);

        session.start_query("school").await;
        assert_eq!(result_ids(&session.snapshot().await), ["1"]);

        session.start_query("broken").await;
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, SearchPhase::Failed);
        assert!(snapshot.results.is_empty());
        assert!(snapshot.error.is_some());
    }

    #[tokio::test]
    async fn load_more_appends_pages_in_order() {
        let backend = Arc::new(
            ScriptedBackend::default()
                .with_page("q", 1, page(&["a", "b"], true, 4))
                .with_page("q", 2, page(&["c", "d"], false, 4)),
        );
        let session = SearchSession::new(backend.clone() as Arc<dyn SearchBackend>);

        session.start_query("q").await;
        session.load_more().await;

        let snapshot = session.snapshot().await;
        assert_eq!(result_ids(&snapshot), ["a", "b", "c", "d"]);
        assert!(!snapshot.has_more);
        assert_eq!(snapshot.total_count, 4);
        assert!(!snapshot.loading_more);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_load_more_is_serialized() {
        let backend = Arc::new(
            ScriptedBackend::default()
                .with_page("q", 1, page(&["a", "b"], true, 4))
                .with_page("q", 2, page(&["c", "d"], false, 4))
                .with_delay("q", 2, Duration::from_millis(50)),
        );
        let session = SearchSession::new(backend.clone() as Arc<dyn SearchBackend>);

        session.start_query("q").await;

        let first = session.clone();
        tokio::spawn(async move { first.load_more().await });
        tokio::time::sleep(Duration::from_millis(1)).await;

        let second = session.clone();
        tokio::spawn(async move { second.load_more().await });
        tokio::time::sleep(Duration::from_millis(200)).await;

        // One page-1 fetch plus exactly one page-2 fetch.
        assert_eq!(backend.calls(), 2);
        assert_eq!(result_ids(&session.snapshot().await), ["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn load_more_without_has_more_is_a_noop() {
        let backend = Arc::new(
            ScriptedBackend::default().with_page("q", 1, page(&["a"], false, 1)),
        );
        let session = SearchSession::new(backend.clone() as Arc<dyn SearchBackend>);

        session.start_query("q").await;
        session.load_more().await;

        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn defensive_empty_page_ends_pagination_without_clearing() {
        init_logs();
        let backend = Arc::new(
            ScriptedBackend::default().with_page("q", 1, page(&["a", "b"], true, 4)),
        );
        let session = SearchSession::new(backend.clone() as Arc<dyn SearchBackend>);

        session.start_query("q").await;
        assert_eq!(result_ids(&session.snapshot().await), ["a", "b"]);

        // Page 2 is unscripted: the backend answers with a defensive empty
        // page, which ends pagination but must not clear existing results.
        session.load_more().await;
        let snapshot = session.snapshot().await;
        assert_eq!(result_ids(&snapshot), ["a", "b"]);
        assert!(!snapshot.has_more);
        assert_eq!(snapshot.phase, SearchPhase::Settled);
    }

    #[tokio::test(start_paused = true)]
    async fn close_discards_late_results() {
        init_logs();
        let backend = Arc::new(
            ScriptedBackend::default()
                .with_page("q", 1, page(&["a"], false, 1))
                .with_delay("q", 1, Duration::from_millis(100)),
        );
        let session = SearchSession::new(backend.clone() as Arc<dyn SearchBackend>);

        let pending = session.clone();
        tokio::spawn(async move { pending.start_query("q").await });
        tokio::time::sleep(Duration::from_millis(1)).await;

        session.close();
        tokio::time::sleep(Duration::from_millis(300)).await;

        let snapshot = session.snapshot().await;
        assert!(snapshot.results.is_empty());
        assert_eq!(backend.calls(), 1);
    }
}
