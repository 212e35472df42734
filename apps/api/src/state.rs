use crate::analysis::pipeline::Analyzer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Taxonomies, extractor and the process-wide grammar budget live behind this.
    pub analyzer: Analyzer,
    pub config: Config,
}
