use std::sync::Arc;

use crate::analysis::fit_scoring::FitScorer;
use crate::config::Config;
use crate::tailoring::rewriter::BulletRewriter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable bullet rewriter. Production: LlmRewriter over the configured model.
    pub rewriter: Arc<dyn BulletRewriter>,
    /// Pluggable fit scorer. Default: KeywordFitScorer.
    pub fit_scorer: Arc<dyn FitScorer>,
    pub config: Config,
}
