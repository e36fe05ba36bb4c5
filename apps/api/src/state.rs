use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ChatCompletion;
use crate::session::SessionStore;
use crate::trends::loader::TrendLoader;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Chat-completion backend. `LlmClient` in production, fakes in tests.
    pub llm: Arc<dyn ChatCompletion>,
    /// Parsed catalogs, memoized by content hash. Read-only records, shared by all sessions.
    pub loader: Arc<TrendLoader>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config, llm: Arc<dyn ChatCompletion>) -> Self {
        let loader = Arc::new(TrendLoader::new(config.dataset_cache_size));
        Self {
            config,
            llm,
            loader,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}
