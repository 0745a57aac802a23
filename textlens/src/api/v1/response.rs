//! # V1 API Response Envelope & Error Contract
//!
//! Every JSON endpoint returns an [`ApiResponse<T>`] envelope:
//!
//! ```json
//! {
//!   "data": { ... },                                     // present on success
//!   "error": { "code": "invalid_request", "message": "..." }  // present on error
//! }
//! ```
//!
//! Binary endpoints (`extract:download`, `export`, `speech`) answer with the
//! raw file on success and with this envelope on error.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::TextlensError;
use crate::export::sanitize_file_name;

/// Machine-readable error code included in every error response.
///
/// Serialized as a snake_case string on the wire (e.g. `"invalid_request"`).
/// Each variant maps to a fixed HTTP status code via [`ErrorCode::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed upload, unsupported format or failed validation. HTTP 400.
    InvalidRequest,
    /// A translation or speech backend answered with an error. HTTP 502.
    UpstreamError,
    /// The OCR engine (or another required backend) is not available. HTTP 503.
    ServiceUnavailable,
    /// An external call exceeded its configured timeout. HTTP 504.
    Timeout,
    /// An unexpected server-side error occurred. Internal details are never
    /// leaked to the client. HTTP 500.
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::UpstreamError => write!(f, "upstream_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::Timeout => write!(f, "timeout"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

/// Structured error payload within the API envelope.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Human-readable description safe to display to end users.
    pub message: String,
}

/// Canonical v1 API response envelope.
///
/// On success `data` is present and `error` is absent; on error the reverse.
/// The HTTP status is derived from the error code, or 200 on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// HTTP status to use in the response. Not serialized on the wire.
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response with data (HTTP 200).
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Error response. HTTP status is derived from the [`ErrorCode`].
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(_) => {
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<TextlensError> for ApiResponse<T> {
    /// Convert a [`TextlensError`] into a v1 [`ApiResponse`].
    ///
    /// Internal error details are **never** leaked to the client. For
    /// `internal_error` responses a generic message is returned and the
    /// real error is logged via `tracing::error!`.
    fn from(err: TextlensError) -> Self {
        match err {
            TextlensError::UnsupportedImageFormat(_)
            | TextlensError::UnsupportedExportFormat(_)
            | TextlensError::NoTextDetected => {
                ApiResponse::error(ErrorCode::InvalidRequest, err.to_string())
            }

            TextlensError::Validation(ref msg) => {
                ApiResponse::error(ErrorCode::InvalidRequest, msg.clone())
            }

            TextlensError::Json(ref e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid JSON: {e}"))
            }

            TextlensError::OcrEngineUnavailable(_) => {
                ApiResponse::error(ErrorCode::ServiceUnavailable, err.to_string())
            }

            TextlensError::ServiceTimeout { .. } => {
                ApiResponse::error(ErrorCode::Timeout, err.to_string())
            }

            TextlensError::TranslationService(_) | TextlensError::SpeechSynthesis(_) => {
                tracing::warn!(error = %err, "Upstream service error mapped to v1 response");
                ApiResponse::error(ErrorCode::UpstreamError, err.to_string())
            }

            ref internal @ (TextlensError::Ocr(_)
            | TextlensError::Processing(_)
            | TextlensError::Export(_)
            | TextlensError::Http(_)
            | TextlensError::Io(_)
            | TextlensError::Internal(_)) => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                ApiResponse::error(ErrorCode::InternalError, "An internal error occurred")
            }
        }
    }
}

/// Raw file response with `Content-Type` and an attachment
/// `Content-Disposition`.
pub fn attachment(bytes: Vec<u8>, content_type: &str, file_name: &str) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", sanitize_file_name(file_name));

    let mut response = Response::new(Body::from(bytes));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_response_serializes_without_error() {
        let resp = ApiResponse::success("hello");
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["data"], "hello");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn error_response_serializes_without_data() {
        let resp = ApiResponse::<()>::error(ErrorCode::Timeout, "slow");
        let json = serde_json::to_value(&resp).expect("serialize");
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["code"], "timeout");
        assert_eq!(json["error"]["message"], "slow");
    }

    #[test]
    fn error_code_status_mapping() {
        assert_eq!(ErrorCode::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::UpstreamError.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ErrorCode::ServiceUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ErrorCode::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            ErrorCode::InternalError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_code_serializes_snake_case() {
        let json = serde_json::to_value(&ErrorCode::ServiceUnavailable).expect("serialize");
        assert_eq!(json, "service_unavailable");
        assert_eq!(ErrorCode::InvalidRequest.to_string(), "invalid_request");
    }

    #[test]
    fn unsupported_format_maps_to_invalid_request() {
        let resp: ApiResponse<()> = TextlensError::UnsupportedImageFormat("xyz".into()).into();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.error.as_ref().expect("error").code,
            ErrorCode::InvalidRequest
        );
    }

    #[test]
    fn ocr_unavailable_maps_to_service_unavailable() {
        let resp: ApiResponse<()> =
            TextlensError::OcrEngineUnavailable("tesseract missing".into()).into();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let resp: ApiResponse<()> = TextlensError::timeout("OCR", 60).into();
        let err = resp.error.as_ref().expect("error");
        assert_eq!(err.code, ErrorCode::Timeout);
        assert!(err.message.contains("60"));
    }

    #[test]
    fn internal_errors_do_not_leak() {
        let resp: ApiResponse<()> = TextlensError::Ocr("segfault at 0xdeadbeef".into()).into();
        let err = resp.error.as_ref().expect("error");
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.message, "An internal error occurred");
    }

    #[test]
    fn attachment_sets_download_headers() {
        let response = attachment(b"hi".to_vec(), "text/plain; charset=utf-8", "a b.txt");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"a_b.txt\""
        );
    }
}
