use std::sync::Arc;

use crate::config::Config;
use crate::provider::InterviewProvider;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable AI provider. Default: OpenAiClient. Tests swap in stubs.
    pub provider: Arc<dyn InterviewProvider>,
    /// In-memory session store. Sessions are never persisted.
    pub sessions: SessionStore,
    pub config: Config,
}
