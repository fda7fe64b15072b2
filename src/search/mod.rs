pub mod debounce;
pub mod merge;
pub mod session;

pub use debounce::Debouncer;
pub use merge::{merge_page, MergedResults};
pub use session::{
    SearchBackend, SearchPhase, SearchSession, SearchSnapshot, DEFAULT_QUIET_PERIOD,
};
