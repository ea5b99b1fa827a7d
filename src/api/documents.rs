use axum::extract::State;
use axum::Json;

use super::ApiError;
use crate::models::{
    AddDocumentsRequest, CrawlRequest, PromptRequest, PromptResponse, SearchRequest,
    SearchResponse, StatusResponse,
};
use crate::state::AppState;

const MAX_SEARCH_LIMIT: usize = 100;

/// POST /api/documents - Forward raw document texts to the backend for ingestion
pub async fn add_documents(
    State(state): State<AppState>,
    Json(req): Json<AddDocumentsRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let contents: Vec<String> = req
        .contents
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if contents.is_empty() {
        return Err(ApiError::Validation("At least one document is required".to_string()));
    }

    tracing::info!("Adding {} documents", contents.len());
    let resp = state.backend.add_documents(&contents).await.map_err(|e| {
        tracing::error!("Adding documents failed: {e:#}");
        ApiError::Upstream(e)
    })?;
    Ok(Json(resp))
}

/// POST /api/search - Semantic search using the backend's configured metric
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::Validation("Query is required".to_string()));
    }
    let limit = req
        .limit
        .unwrap_or(state.config.search_default_limit)
        .clamp(1, MAX_SEARCH_LIMIT);

    let resp = state.backend.search(&query, limit).await.map_err(|e| {
        tracing::error!("Search failed: {e:#}");
        ApiError::Upstream(e)
    })?;
    match resp.results.first().and_then(|hit| hit.score()) {
        Some((label, score)) => tracing::info!(
            "Search returned {} results (top {label} = {score})",
            resp.results.len()
        ),
        None => tracing::info!("Search returned {} results", resp.results.len()),
    }
    Ok(Json(resp))
}

/// POST /api/prompt - Retrieval-augmented answer.
///
/// Provider and key come from the persisted settings (the draft when nothing
/// has been loaded yet); the key is only sent for OpenAI.
pub async fn prompt(
    State(state): State<AppState>,
    Json(req): Json<PromptRequest>,
) -> Result<Json<PromptResponse>, ApiError> {
    let prompt = req.prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(ApiError::Validation("Prompt is required".to_string()));
    }

    let (provider, api_key) = {
        let store = state.store.read();
        let settings = store.persisted().unwrap_or(store.settings());
        (
            settings.llm_provider,
            settings.effective_api_key().map(str::to_string),
        )
    };

    let resp = state
        .backend
        .prompt(&prompt, provider, req.model.as_deref(), api_key.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Prompt via {provider} failed: {e:#}");
            ApiError::Upstream(e)
        })?;
    Ok(Json(resp))
}

/// POST /api/crawl - Ask the backend to crawl and ingest a page
pub async fn crawl(
    State(state): State<AppState>,
    Json(req): Json<CrawlRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let link = req.link.trim().to_string();
    if !is_http_link(&link) {
        return Err(ApiError::Validation(
            "Link must be an http:// or https:// URL".to_string(),
        ));
    }

    tracing::info!("Crawling {link}");
    let resp = state.backend.crawl(&link).await.map_err(|e| {
        tracing::error!("Crawl of {link} failed: {e:#}");
        ApiError::Upstream(e)
    })?;
    Ok(Json(resp))
}

fn is_http_link(link: &str) -> bool {
    let rest = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}
