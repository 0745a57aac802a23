//! Request/response DTOs for the text endpoints that work on already
//! extracted (and possibly user-edited) text.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::analysis::{StructuredData, TextStatistics};
use crate::models::Metadata;

fn default_export_format() -> String {
    "txt".to_string()
}

fn default_speech_language() -> String {
    "en".to_string()
}

/// Request body for `POST /v1/export`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[validate(length(max = 1_000_000))]
    pub text: String,
    /// `txt`/`plain_text` or `docx`/`document`. Defaults to `txt`.
    #[serde(default = "default_export_format")]
    pub format: String,
    /// Key/value pairs rendered into the `.docx` metadata block.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: Metadata,
    /// Target language code when `text` is a translation; changes the file name.
    pub translated_to: Option<String>,
}

/// Request body for `POST /v1/translate`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    #[validate(length(min = 1, max = 1_000_000))]
    pub text: String,
    #[validate(length(min = 2, max = 10))]
    pub target_language: String,
    /// ISO 639-1 source code; detected by the backend when absent.
    pub source_language: Option<String>,
}

/// Request body for `POST /v1/speech`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    #[validate(length(min = 1, max = 1_000_000))]
    pub text: String,
    #[serde(default = "default_speech_language")]
    #[validate(length(min = 2, max = 10))]
    pub language: String,
}

/// Request body for `POST /v1/analyze`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct AnalyzeRequest {
    #[validate(length(max = 1_000_000))]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub statistics: TextStatistics,
    pub structured_data: StructuredData,
}
