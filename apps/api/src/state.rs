use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; nothing here is shared between submissions except clients.
#[derive(Clone)]
pub struct AppState {
    /// Model backend. Default: `GeminiClient`.
    pub generator: Arc<dyn TextGenerator>,
    pub config: Config,
}
