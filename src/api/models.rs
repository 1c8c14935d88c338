use serde::{Deserialize, Serialize};
use crate::article::Article;
use crate::batch::{BatchResult, DEFAULT_MAX_CONCURRENT};
use crate::catalog::CatalogArticle;

pub use crate::analyzer::AnalyzeResponse;

fn default_max_concurrent() -> i64 {
    DEFAULT_MAX_CONCURRENT as i64
}

/// Signed so that negative bounds reach validation instead of failing to
/// deserialize.
#[derive(Debug, Deserialize)]
pub struct BatchAnalyzeRequest {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheSizeResponse {
    pub cache_size: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheClearResponse {
    pub status: String,
    pub cleared_entries: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchResponse {
    pub articles: Vec<CatalogArticle>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchAndAnalyzeResponse {
    pub articles: Vec<CatalogArticle>,
    pub analysis: BatchResult,
}
