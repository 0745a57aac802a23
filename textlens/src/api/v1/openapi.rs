use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;
use crate::{analysis, models, pipeline};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Textlens API",
        version = "1.0.0",
        description = "Self-hostable image-to-text service: OCR with preprocessing, optional translation and text-to-speech, TXT/DOCX export.",
    ),
    paths(
        handlers::health::health_check,
        handlers::languages::list_languages,
        handlers::extract::extract,
        handlers::extract::extract_download,
        handlers::text::export_text,
        handlers::text::translate_text,
        handlers::text::synthesize_speech,
        handlers::text::analyze_text,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        // Pipeline models
        models::ExportFormat,
        models::PageSegmentation,
        models::PreprocessingOptions,
        models::PipelineWarning,
        models::WarningKind,
        models::AudioFormat,
        models::BoundingBox,
        models::RecognizedWord,
        models::ConfidenceSummary,
        pipeline::ImageSummary,
        pipeline::TranslatedText,
        analysis::TextStatistics,
        analysis::StructuredData,
        // Extraction
        dto::ExtractResponse,
        dto::ArtifactPayload,
        dto::AudioPayload,
        // Text endpoints
        dto::ExportRequest,
        dto::TranslateRequest,
        dto::SpeechRequest,
        dto::AnalyzeRequest,
        dto::AnalyzeResponse,
        // Languages
        dto::LanguageEntry,
        dto::LanguagesResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::ProviderStatus,
    )),
    tags(
        (name = "health", description = "Health check and provider availability"),
        (name = "languages", description = "Supported OCR and translation languages"),
        (name = "extract", description = "Image upload, OCR and export"),
        (name = "text", description = "Re-export, translation, speech and analysis of extracted text"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
