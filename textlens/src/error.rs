use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::v1::response::ApiResponse;

#[derive(Error, Debug)]
pub enum TextlensError {
    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    #[error("OCR engine unavailable: {0}")]
    OcrEngineUnavailable(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("No text detected in image")]
    NoTextDetected,

    #[error("Translation service error: {0}")]
    TranslationService(String),

    #[error("Speech synthesis error: {0}")]
    SpeechSynthesis(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedExportFormat(String),

    #[error("{service} timed out after {seconds} seconds")]
    ServiceTimeout { service: String, seconds: u64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl TextlensError {
    pub fn timeout(service: &str, seconds: u64) -> Self {
        TextlensError::ServiceTimeout {
            service: service.to_string(),
            seconds,
        }
    }

    /// Errors raised by optional post-processing steps. The pipeline turns
    /// these into warnings instead of failing the request.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            TextlensError::NoTextDetected
                | TextlensError::TranslationService(_)
                | TextlensError::SpeechSynthesis(_)
        )
    }
}

impl From<validator::ValidationErrors> for TextlensError {
    fn from(errors: validator::ValidationErrors) -> Self {
        TextlensError::Validation(format!("Invalid request: {errors}"))
    }
}

/// Rendered as the v1 error envelope.
impl IntoResponse for TextlensError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::from(self).into_response()
    }
}

pub type Result<T> = std::result::Result<T, TextlensError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn soft_errors_are_flagged() {
        assert!(TextlensError::NoTextDetected.is_soft());
        assert!(TextlensError::TranslationService("down".into()).is_soft());
        assert!(TextlensError::SpeechSynthesis("down".into()).is_soft());
        assert!(!TextlensError::UnsupportedImageFormat("xyz".into()).is_soft());
        assert!(!TextlensError::OcrEngineUnavailable("missing".into()).is_soft());
    }

    #[test]
    fn timeout_message_names_service() {
        let err = TextlensError::timeout("Translation", 30);
        assert_eq!(err.to_string(), "Translation timed out after 30 seconds");
    }

    #[test]
    fn unsupported_format_is_bad_request() {
        let response = TextlensError::UnsupportedImageFormat("xyz".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn timeout_is_gateway_timeout() {
        let response = TextlensError::timeout("OCR", 60).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
