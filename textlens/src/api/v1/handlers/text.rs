//! v1 handlers for already extracted text: re-export, translation,
//! speech and analysis.

use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::analysis::{extract_structured_data, statistics};
use crate::api::extractors::ValidJson;
use crate::api::v1::dto::{
    AnalyzeRequest, AnalyzeResponse, ExportRequest, SpeechRequest, TranslateRequest,
};
use crate::api::v1::response::{attachment, ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::export::{export, ExportOptions};
use crate::models::languages::translation_language_name;
use crate::models::ExportFormat;
use crate::pipeline::TranslatedText;

/// `POST /api/v1/export`
///
/// Serializes (possibly edited) text as `.txt` or `.docx` and returns the
/// file.
#[utoipa::path(
    post,
    path = "/api/v1/export",
    tag = "text",
    operation_id = "text.export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "Exported file", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 400, description = "Invalid request or unsupported format", body = ApiError),
    )
)]
pub async fn export_text(ValidJson(req): ValidJson<ExportRequest>) -> Response {
    let format = match req.format.parse::<ExportFormat>() {
        Ok(format) => format,
        Err(e) => return e.into_response(),
    };
    let options = ExportOptions {
        metadata: req.metadata,
        translated_to: req.translated_to.filter(|l| !l.trim().is_empty()),
        ..ExportOptions::default()
    };

    match export(&req.text, format, &options) {
        Ok(artifact) => attachment(artifact.bytes, &artifact.content_type, &artifact.file_name),
        Err(e) => e.into_response(),
    }
}

/// `POST /api/v1/translate`
#[utoipa::path(
    post,
    path = "/api/v1/translate",
    tag = "text",
    operation_id = "text.translate",
    request_body = TranslateRequest,
    responses(
        (status = 200, description = "Translated text", body = TranslatedText),
        (status = 400, description = "Invalid request or unknown language", body = ApiError),
        (status = 502, description = "Translation backend error", body = ApiError),
        (status = 503, description = "Translation not configured", body = ApiError),
        (status = 504, description = "Translation timed out", body = ApiError),
    )
)]
pub async fn translate_text(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<TranslateRequest>,
) -> ApiResponse<TranslatedText> {
    let translator = state.pipeline.translation();
    if let Some(reason) = translator.unavailable_reason() {
        return ApiResponse::error(ErrorCode::ServiceUnavailable, reason);
    }

    let target = req.target_language.trim().to_lowercase();
    if translation_language_name(&target).is_none() {
        return ApiResponse::error(
            ErrorCode::InvalidRequest,
            format!("Unsupported translation language: {}", req.target_language),
        );
    }
    let source = req
        .source_language
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    match translator.translate(&req.text, source.as_deref(), &target).await {
        Ok(text) => ApiResponse::success(TranslatedText {
            text,
            source_language: source,
            target_language: target,
        }),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/speech`
///
/// Returns the synthesized audio (`audio/wav` or `audio/mpeg`).
#[utoipa::path(
    post,
    path = "/api/v1/speech",
    tag = "text",
    operation_id = "text.speech",
    request_body = SpeechRequest,
    responses(
        (status = 200, description = "Synthesized audio", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 502, description = "Speech backend error", body = ApiError),
        (status = 503, description = "Speech not available", body = ApiError),
    )
)]
pub async fn synthesize_speech(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SpeechRequest>,
) -> Response {
    let speech = state.pipeline.speech();
    if let Some(reason) = speech.unavailable_reason() {
        return ApiResponse::<()>::error(ErrorCode::ServiceUnavailable, reason).into_response();
    }

    let language = req.language.trim().to_lowercase();
    match speech.synthesize(&req.text, &language).await {
        Ok(audio) => {
            let file_name = format!("speech_{language}.{}", audio.format.extension());
            let content_type = audio.content_type();
            attachment(audio.bytes, content_type, &file_name)
        }
        Err(e) => e.into_response(),
    }
}

/// `POST /api/v1/analyze`
#[utoipa::path(
    post,
    path = "/api/v1/analyze",
    tag = "text",
    operation_id = "text.analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Text statistics and structured data", body = AnalyzeResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn analyze_text(ValidJson(req): ValidJson<AnalyzeRequest>) -> ApiResponse<AnalyzeResponse> {
    ApiResponse::success(AnalyzeResponse {
        statistics: statistics(&req.text),
        structured_data: extract_structured_data(&req.text),
    })
}
