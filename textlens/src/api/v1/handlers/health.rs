use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;

/// Health data returned inside the v1 envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    /// `ok` when OCR is usable, `degraded` otherwise.
    pub status: String,
    pub version: String,
    pub ocr: ProviderStatus,
    pub translation: ProviderStatus,
    pub speech: ProviderStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ProviderStatus {
    /// `available` or `unavailable`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ProviderStatus {
    fn new(backend: Option<&str>, reason: Option<&str>) -> Self {
        let status = if backend.is_some() {
            "available"
        } else {
            "unavailable"
        };
        Self {
            status: status.to_string(),
            backend: backend.map(String::from),
            reason: reason.map(String::from),
        }
    }
}

/// `GET /api/v1/health`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health and provider availability", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let pipeline = &state.pipeline;

    let ocr = ProviderStatus::new(
        pipeline.ocr().engine_name(),
        pipeline.ocr().unavailable_reason(),
    );
    let translation = ProviderStatus::new(
        pipeline.translation().backend_name(),
        pipeline.translation().unavailable_reason(),
    );
    let speech = ProviderStatus::new(
        pipeline.speech().backend_name(),
        pipeline.speech().unavailable_reason(),
    );

    let status = if pipeline.ocr().is_available() {
        "ok"
    } else {
        "degraded"
    };

    ApiResponse::success(HealthData {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ocr,
        translation,
        speech,
    })
}
