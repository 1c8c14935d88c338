use std::sync::Arc;
use std::time::Instant;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use crate::article::Article;
use crate::cache::AnalysisCache;
use crate::error::Result;
use crate::llm::CompletionClient;
use crate::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::validator::{self, AnalysisResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub arxiv_id: String,
    pub analysis: AnalysisResult,
    pub confidence: f64,
    pub analysis_timestamp: String,
}

/// Analyzes one article: cache, prompt, completion, validation.
pub struct Analyzer {
    client: Arc<dyn CompletionClient>,
    cache: Arc<AnalysisCache>,
}

impl Analyzer {
    pub fn new(client: Arc<dyn CompletionClient>, cache: Arc<AnalysisCache>) -> Self {
        Self { client, cache }
    }

    pub async fn analyze(&self, article: &Article) -> Result<AnalyzeResponse> {
        article.validate()?;

        let analysis = self.analysis_for(article).await?;
        Ok(AnalyzeResponse {
            arxiv_id: article.arxiv_id.clone(),
            confidence: analysis.confidence,
            analysis,
            analysis_timestamp: timestamp(),
        })
    }

    async fn analysis_for(&self, article: &Article) -> Result<AnalysisResult> {
        if let Some(cached) = self.cache.get(&article.arxiv_id) {
            tracing::debug!(arxiv_id = %article.arxiv_id, "using cached analysis");
            return validator::to_result(&cached);
        }

        let prompt = build_prompt(article);
        tracing::debug!(
            arxiv_id = %article.arxiv_id,
            prompt_chars = prompt.chars().count(),
            "requesting analysis"
        );

        let started = Instant::now();
        let raw = self.client.complete(SYSTEM_PROMPT, &prompt).await?;
        let (payload, analysis) = validator::validate(&raw).inspect_err(|e| {
            tracing::warn!(arxiv_id = %article.arxiv_id, error = %e, "rejected LLM response");
        })?;

        self.cache.put(article.arxiv_id.clone(), payload);
        tracing::info!(
            arxiv_id = %article.arxiv_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );
        Ok(analysis)
    }
}

/// ISO-8601 UTC with a trailing `Z`.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}
