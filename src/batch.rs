//! Bounded-parallel batch analysis.
//!
//! At most `max_concurrent` analyses are in flight at once; each task holds a
//! semaphore permit for its whole run and drops it on every exit path. A
//! failed article is counted and logged, never fatal to its siblings.
//!
//! `BatchResult::results` is in completion order, not submission order.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use crate::analyzer::{AnalyzeResponse, Analyzer};
use crate::article::Article;
use crate::error::{AppError, Result};

pub const DEFAULT_MAX_CONCURRENT: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub results: Vec<AnalyzeResponse>,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

pub struct BatchOrchestrator {
    analyzer: Arc<Analyzer>,
}

impl BatchOrchestrator {
    pub fn new(analyzer: Arc<Analyzer>) -> Self {
        Self { analyzer }
    }

    pub async fn run(&self, articles: Vec<Article>, max_concurrent: usize) -> Result<BatchResult> {
        if articles.is_empty() {
            return Err(AppError::InvalidInput(
                "No articles provided for analysis".to_string(),
            ));
        }
        if max_concurrent < 1 {
            return Err(AppError::InvalidInput(
                "max_concurrent must be at least 1".to_string(),
            ));
        }

        let total = articles.len();
        tracing::info!(total, max_concurrent, "starting batch analysis");

        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let mut tasks = JoinSet::new();

        for article in articles {
            let analyzer = Arc::clone(&self.analyzer);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only fails if
                // that invariant is broken.
                let _permit = semaphore.acquire_owned().await.map_err(|e| {
                    AppError::UpstreamFailure(format!("concurrency limiter closed: {}", e))
                })?;
                analyzer.analyze(&article).await.inspect_err(|e| {
                    tracing::warn!(
                        arxiv_id = %article.arxiv_id,
                        error = %e,
                        "article analysis failed"
                    );
                })
            });
        }

        let mut results = Vec::with_capacity(total);
        let mut failed = 0;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(response)) => results.push(response),
                Ok(Err(_)) => failed += 1,
                Err(e) => {
                    tracing::error!(error = %e, "analysis task aborted");
                    failed += 1;
                }
            }
        }

        let successful = results.len();
        tracing::info!(total, successful, failed, "batch analysis finished");

        Ok(BatchResult {
            results,
            total,
            successful,
            failed,
        })
    }
}
