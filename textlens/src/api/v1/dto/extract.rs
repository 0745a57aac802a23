//! Response DTOs for `POST /v1/extract`.

use base64::Engine;
use serde::Serialize;

use crate::analysis::{StructuredData, TextStatistics};
use crate::models::{
    AudioArtifact, AudioFormat, ConfidenceSummary, ExportFormat, ExportedArtifact,
    PipelineWarning, RecognizedWord,
};
use crate::pipeline::{ImageSummary, PipelineOutcome, TranslatedText};

fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// The exported file, inlined.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactPayload {
    pub file_name: String,
    pub content_type: String,
    pub format: ExportFormat,
    /// Size of the decoded file in bytes.
    pub size: usize,
    /// File content, standard base64.
    pub base64: String,
}

impl From<&ExportedArtifact> for ArtifactPayload {
    fn from(artifact: &ExportedArtifact) -> Self {
        Self {
            file_name: artifact.file_name.clone(),
            content_type: artifact.content_type.clone(),
            format: artifact.format,
            size: artifact.len(),
            base64: encode(&artifact.bytes),
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudioPayload {
    pub content_type: String,
    pub format: AudioFormat,
    pub language: String,
    pub size: usize,
    /// Audio content, standard base64.
    pub base64: String,
}

impl From<&AudioArtifact> for AudioPayload {
    fn from(audio: &AudioArtifact) -> Self {
        Self {
            content_type: audio.content_type().to_string(),
            format: audio.format,
            language: audio.language.clone(),
            size: audio.bytes.len(),
            base64: encode(&audio.bytes),
        }
    }
}

/// Response body for `POST /v1/extract`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    /// Name of the uploaded file.
    pub file_name: String,
    pub image: ImageSummary,
    /// Image handed to OCR after preprocessing; word boxes use its pixels.
    pub ocr_image: ImageSummary,
    /// Text as recognized by OCR, before translation.
    pub text: String,
    /// Mean recognition confidence (0-100) when the engine reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_summary: Option<ConfidenceSummary>,
    /// Words kept after confidence filtering. Empty for text-only engines.
    pub words: Vec<RecognizedWord>,
    /// Words dropped for scoring at or below the confidence threshold.
    pub discarded_words: usize,
    /// OCR language code(s) used, e.g. `eng+fra`.
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<TranslatedText>,
    /// Text that was exported: the translation when one succeeded.
    pub final_text: String,
    pub warnings: Vec<PipelineWarning>,
    pub statistics: TextStatistics,
    pub structured_data: StructuredData,
    pub artifact: ArtifactPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioPayload>,
    pub processing_time_ms: u64,
}

impl ExtractResponse {
    pub fn from_outcome(file_name: String, outcome: PipelineOutcome, processing_time_ms: u64) -> Self {
        Self {
            file_name,
            image: outcome.image,
            ocr_image: outcome.ocr_image,
            confidence_summary: outcome.extracted.confidence_summary(),
            text: outcome.extracted.text,
            confidence: outcome.extracted.confidence,
            words: outcome.extracted.words,
            discarded_words: outcome.extracted.discarded_words,
            language: outcome.extracted.language,
            translation: outcome.translation,
            final_text: outcome.final_text,
            warnings: outcome.warnings,
            statistics: outcome.statistics,
            structured_data: outcome.structured_data,
            artifact: ArtifactPayload::from(&outcome.artifact),
            audio: outcome.audio.as_ref().map(AudioPayload::from),
            processing_time_ms,
        }
    }
}
