use std::sync::Arc;

use crate::analysis::{Analyzer, ScriptAnalyzer};
use crate::config::Config;
use crate::upload::StagingArea;

/// Shared application state injected into all route handlers via Axum extractors.
/// Nothing in here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub staging: Arc<StagingArea>,
    /// Pluggable analysis backend. Default: ScriptAnalyzer running the configured script.
    pub analyzer: Arc<dyn Analyzer>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let analyzer = Arc::new(ScriptAnalyzer::from_config(&config));
        Self::with_analyzer(config, analyzer)
    }

    pub fn with_analyzer(config: Config, analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            staging: Arc::new(StagingArea::new(config.upload_dir.clone())),
            analyzer,
            config,
        }
    }
}
