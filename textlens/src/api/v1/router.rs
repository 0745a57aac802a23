use axum::{
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;

pub fn v1_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/languages", get(handlers::languages::list_languages))
        .route("/extract", post(handlers::extract::extract))
        .route("/extract:download", post(handlers::extract::extract_download))
        .route("/export", post(handlers::text::export_text))
        .route("/translate", post(handlers::text::translate_text))
        .route("/speech", post(handlers::text::synthesize_speech))
        .route("/analyze", post(handlers::text::analyze_text))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router())
}
