use std::sync::Arc;

use crate::config::Config;
use crate::extract::DocumentExtractor;
use crate::summarize::Summarizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The strategy chain is stateless, so one instance serves all requests.
    pub extractor: Arc<DocumentExtractor>,
    pub summarizer: Summarizer,
    pub config: Config,
}
