//! Console HTTP API served to the forms page.

pub mod documents;
pub mod settings;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use thiserror::Error;

use crate::error::{InvalidMetric, SyncError};
use crate::state::AppState;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    InvalidMetric(#[from] InvalidMetric),

    #[error("{0}")]
    Busy(String),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("backend request failed: {0:#}")]
    Upstream(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::InvalidMetric(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_metric"),
            ApiError::Busy(_) => (StatusCode::CONFLICT, "busy"),
            ApiError::Sync(e) => (StatusCode::BAD_GATEWAY, e.kind()),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_failure"),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// All console routes, including the forms page at `/`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route(
            "/api/settings",
            get(settings::get_settings).patch(settings::edit_settings),
        )
        .route("/api/settings/save", post(settings::save_settings))
        .route("/api/settings/reload", post(settings::reload_settings))
        .route("/api/settings/discard", post(settings::discard_settings))
        .route("/api/documents", post(documents::add_documents))
        .route("/api/search", post(documents::search))
        .route("/api/prompt", post(documents::prompt))
        .route("/api/crawl", post(documents::crawl))
        .with_state(state)
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
