//! v1 extraction handlers.
//!
//! Both endpoints take the same multipart form: a `file` field holding the
//! image plus optional processing fields. `extract` answers with the JSON
//! envelope, `extract:download` with the exported file itself.

use std::time::Instant;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};

use crate::api::v1::dto::ExtractResponse;
use crate::api::v1::response::{attachment, ApiError, ApiResponse};
use crate::api::AppState;
use crate::error::{Result, TextlensError};
use crate::models::{
    ExportFormat, PageSegmentation, PreprocessingOptions, ProcessingConfiguration,
};
use crate::pipeline::PipelineOutcome;

/// Response header listing warning kinds on `extract:download`.
pub const WARNINGS_HEADER: &str = "x-textlens-warnings";

fn parse_form_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn form_bool(field: &str, raw: &str) -> Result<bool> {
    parse_form_bool(raw).ok_or_else(|| {
        TextlensError::Validation(format!("{field} must be one of true/false/1/0/yes/no"))
    })
}

fn malformed_multipart(e: MultipartError) -> TextlensError {
    TextlensError::Validation(format!("Malformed multipart body: {}", e.body_text()))
}

/// A parsed extraction form.
#[derive(Debug)]
pub struct ExtractForm {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub config: ProcessingConfiguration,
}

impl ExtractForm {
    /// Read every field of the multipart body and validate the resulting
    /// configuration. `default_language` applies when `language` is absent
    /// or blank.
    pub async fn from_multipart(mut multipart: Multipart, default_language: &str) -> Result<Self> {
        let mut file: Option<(String, Vec<u8>)> = None;
        let mut builder = ProcessingConfiguration::builder().language(default_language);
        let mut preprocessing = PreprocessingOptions::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed_multipart)? {
            let name = field.name().unwrap_or("").to_string();

            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| TextlensError::Validation(format!("Failed to read file: {e}")))?;
                file = Some((file_name, bytes.to_vec()));
                continue;
            }

            let raw = field
                .text()
                .await
                .map_err(|e| TextlensError::Validation(format!("Invalid {name} value: {e}")))?;

            match name.as_str() {
                "language" => {
                    if !raw.trim().is_empty() {
                        builder = builder.language(raw.trim());
                    }
                }
                "preprocessing" => {
                    builder = builder.preprocessing_enabled(form_bool("preprocessing", &raw)?)
                }
                "exportFormat" | "export_format" => {
                    builder = builder.export_format(raw.parse::<ExportFormat>()?)
                }
                "translateTo" | "translate_to" => {
                    builder = builder.translate_to(Some(raw.trim()));
                }
                "textToSpeech" | "text_to_speech" => {
                    builder = builder.text_to_speech(form_bool("textToSpeech", &raw)?)
                }
                "grayscale" => preprocessing.grayscale = form_bool("grayscale", &raw)?,
                "threshold" => preprocessing.threshold = form_bool("threshold", &raw)?,
                "denoise" => preprocessing.denoise = form_bool("denoise", &raw)?,
                "enhanceContrast" | "enhance_contrast" => {
                    preprocessing.enhance_contrast = form_bool("enhanceContrast", &raw)?
                }
                "removeBackgroundNoise" | "remove_background_noise" => {
                    preprocessing.remove_background_noise =
                        form_bool("removeBackgroundNoise", &raw)?
                }
                "deskew" => preprocessing.deskew = form_bool("deskew", &raw)?,
                "upscale" => preprocessing.upscale = form_bool("upscale", &raw)?,
                "pageSegmentation" | "page_segmentation" => {
                    let mode = raw
                        .parse::<PageSegmentation>()
                        .map_err(TextlensError::Validation)?;
                    builder = builder.page_segmentation(mode);
                }
                "confidenceThreshold" | "confidence_threshold" => {
                    let threshold = raw.trim().parse::<u8>().map_err(|_| {
                        TextlensError::Validation(
                            "confidenceThreshold must be an integer between 0 and 100".to_string(),
                        )
                    })?;
                    builder = builder.confidence_threshold(threshold);
                }
                _ => {}
            }
        }

        let (file_name, bytes) = file
            .ok_or_else(|| TextlensError::Validation("Missing required 'file' field".to_string()))?;

        Ok(Self {
            file_name,
            bytes,
            config: builder.preprocessing(preprocessing).build()?,
        })
    }
}

type MultipartBody = std::result::Result<Multipart, MultipartRejection>;

async fn run_extraction(
    state: &AppState,
    multipart: MultipartBody,
) -> Result<(String, PipelineOutcome, u64)> {
    let multipart = multipart.map_err(|e| {
        TextlensError::Validation(format!("Expected a multipart/form-data upload: {}", e.body_text()))
    })?;
    let form = ExtractForm::from_multipart(multipart, &state.default_language()).await?;
    let started = Instant::now();
    let outcome = state
        .pipeline
        .run(&form.file_name, form.bytes, &form.config)
        .await?;
    Ok((form.file_name, outcome, started.elapsed().as_millis() as u64))
}

/// `POST /api/v1/extract`
///
/// Runs the whole pipeline on the uploaded image and returns recognized
/// text, optional translation, warnings, text statistics and the exported
/// file (plus optional audio) as base64.
#[utoipa::path(
    post,
    path = "/api/v1/extract",
    tag = "extract",
    operation_id = "extract.run",
    request_body(content_type = "multipart/form-data", content = String, description = "Image `file` plus optional language, preprocessing, exportFormat, translateTo, textToSpeech, grayscale, threshold, denoise, enhanceContrast, removeBackgroundNoise, deskew, upscale, pageSegmentation and confidenceThreshold fields"),
    responses(
        (status = 200, description = "Extraction result", body = ExtractResponse),
        (status = 400, description = "Invalid upload or options", body = ApiError),
        (status = 503, description = "OCR engine unavailable", body = ApiError),
        (status = 504, description = "OCR timed out", body = ApiError),
    )
)]
pub async fn extract(
    State(state): State<AppState>,
    multipart: MultipartBody,
) -> ApiResponse<ExtractResponse> {
    match run_extraction(&state, multipart).await {
        Ok((file_name, outcome, elapsed_ms)) => {
            ApiResponse::success(ExtractResponse::from_outcome(file_name, outcome, elapsed_ms))
        }
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/extract:download`
///
/// Same form as `extract`; responds with the exported `.txt`/`.docx` file.
/// Warning kinds, if any, are listed in the `x-textlens-warnings` header.
#[utoipa::path(
    post,
    path = "/api/v1/extract:download",
    tag = "extract",
    operation_id = "extract.download",
    request_body(content_type = "multipart/form-data", content = String, description = "Same fields as /api/v1/extract"),
    responses(
        (status = 200, description = "Exported file", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 400, description = "Invalid upload or options", body = ApiError),
        (status = 503, description = "OCR engine unavailable", body = ApiError),
    )
)]
pub async fn extract_download(State(state): State<AppState>, multipart: MultipartBody) -> Response {
    let outcome = match run_extraction(&state, multipart).await {
        Ok((_, outcome, _)) => outcome,
        Err(e) => return e.into_response(),
    };

    let warnings = outcome
        .warnings
        .iter()
        .map(|w| w.kind.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let artifact = outcome.artifact;
    let mut response = attachment(artifact.bytes, &artifact.content_type, &artifact.file_name);
    if !warnings.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&warnings) {
            response.headers_mut().insert(WARNINGS_HEADER, value);
        }
    }
    response
}
