use axum::{
    routing::{get, post},
    Router,
    extract::{Json, State},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;

use crate::error::{Result, AppError};
use crate::api::models::{
    AnalyzeResponse, BatchAnalyzeRequest, CacheClearResponse, CacheSizeResponse,
    FetchAndAnalyzeResponse, FetchResponse, HealthResponse,
};
use crate::article::Article;
use crate::batch::{BatchResult, DEFAULT_MAX_CONCURRENT};
use crate::catalog::FetchRequest;
use crate::AppState;

const SERVICE_NAME: &str = "analyzer-service";

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/batch-analyze", post(batch_analyze_handler))
        .route("/cache", get(cache_size_handler).delete(clear_cache_handler))
        .route("/health", get(health_handler))
        .route("/fetch", post(fetch_handler))
        .route("/fetch-and-analyze", post(fetch_and_analyze_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(article): Json<Article>,
) -> Result<Json<AnalyzeResponse>> {
    tracing::info!(arxiv_id = %article.arxiv_id, "analyze request");
    state
        .analyzer
        .analyze(&article)
        .await
        .inspect_err(|e| {
            tracing::error!(arxiv_id = %article.arxiv_id, error = %e, "analysis failed");
        })
        .map(Json)
}

async fn batch_analyze_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchAnalyzeRequest>,
) -> Result<Json<BatchResult>> {
    let max_concurrent = usize::try_from(req.max_concurrent).unwrap_or(0);
    state.batch.run(req.articles, max_concurrent).await.map(Json)
}

async fn cache_size_handler(State(state): State<AppState>) -> Json<CacheSizeResponse> {
    Json(CacheSizeResponse {
        cache_size: state.cache.size(),
    })
}

async fn clear_cache_handler(State(state): State<AppState>) -> Json<CacheClearResponse> {
    let cleared_entries = state.cache.clear();
    tracing::info!(cleared_entries, "analysis cache cleared");
    Json(CacheClearResponse {
        status: "success".to_string(),
        cleared_entries,
    })
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    if state.config.openrouter_api_key.is_none() {
        return Json(HealthResponse {
            status: "unhealthy".to_string(),
            service: SERVICE_NAME.to_string(),
            cache_size: None,
            error: Some("OPENROUTER_API_KEY not configured".to_string()),
        });
    }

    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        cache_size: Some(state.cache.size()),
        error: None,
    })
}

async fn fetch_handler(
    State(state): State<AppState>,
    Json(req): Json<FetchRequest>,
) -> Result<Json<FetchResponse>> {
    let articles = state.catalog.fetch(&req).await?;
    Ok(Json(FetchResponse {
        total: articles.len(),
        articles,
    }))
}

async fn fetch_and_analyze_handler(
    State(state): State<AppState>,
    Json(req): Json<FetchRequest>,
) -> Result<Json<FetchAndAnalyzeResponse>> {
    let articles = state.catalog.fetch(&req).await?;
    let to_analyze = articles.iter().cloned().map(Article::from).collect();

    let analysis = state
        .batch
        .run(to_analyze, DEFAULT_MAX_CONCURRENT)
        .await
        .map_err(|e| AppError::UpstreamFailure(format!("Analysis failed: {}", e)))?;

    Ok(Json(FetchAndAnalyzeResponse { articles, analysis }))
}
