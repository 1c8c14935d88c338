pub mod analyzer;
pub mod api;
pub mod article;
pub mod batch;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod pdf;
pub mod prompt;
pub mod validator;

use std::sync::Arc;
use analyzer::Analyzer;
use batch::BatchOrchestrator;
use cache::AnalysisCache;
use catalog::CatalogClient;
use config::Config;
use llm::CompletionClient;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<AnalysisCache>,
    pub analyzer: Arc<Analyzer>,
    pub batch: Arc<BatchOrchestrator>,
    pub catalog: Arc<CatalogClient>,
}

impl AppState {
    /// Wires the pipeline around one completion client and a fresh cache.
    pub fn new(config: Config, client: Arc<dyn CompletionClient>) -> Self {
        Self::with_catalog(config, client, CatalogClient::default())
    }

    /// Same as [`AppState::new`] but queries `catalog` instead of arXiv.
    pub fn with_catalog(
        config: Config,
        client: Arc<dyn CompletionClient>,
        catalog: CatalogClient,
    ) -> Self {
        let cache = Arc::new(AnalysisCache::new(config.cache_policy));
        let analyzer = Arc::new(Analyzer::new(client, Arc::clone(&cache)));
        let batch = Arc::new(BatchOrchestrator::new(Arc::clone(&analyzer)));

        Self {
            config: Arc::new(config),
            cache,
            analyzer,
            batch,
            catalog: Arc::new(catalog),
        }
    }
}
