//! Serialization of final text into downloadable files.

mod docx;

pub use docx::{build_document, DOCUMENT_TITLE};

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::models::{ExportFormat, ExportedArtifact, Metadata};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Rendered into the document metadata block; ignored for plain text.
    pub metadata: Metadata,
    /// Target language when the text is a translation.
    pub translated_to: Option<String>,
    pub generated_at: DateTime<Local>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            metadata: Metadata::new(),
            translated_to: None,
            generated_at: Local::now(),
        }
    }
}

/// Keep only characters that are safe in a download file name.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
    if cleaned.is_empty() {
        "export".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `extracted_text_<YYYYmmdd_HHMMSS>.<ext>`, or
/// `translated_text_<lang>_<YYYYmmdd_HHMMSS>.<ext>` for translations.
pub fn artifact_file_name(format: ExportFormat, options: &ExportOptions) -> String {
    let timestamp = options.generated_at.format("%Y%m%d_%H%M%S");
    let stem = match &options.translated_to {
        Some(lang) => format!("translated_text_{lang}_{timestamp}"),
        None => format!("extracted_text_{timestamp}"),
    };
    sanitize_file_name(&format!("{stem}.{}", format.extension()))
}

/// Serialize `text` in the requested format.
///
/// Plain text is the exact UTF-8 bytes of `text` with nothing added.
pub fn export(text: &str, format: ExportFormat, options: &ExportOptions) -> Result<ExportedArtifact> {
    let bytes = match format {
        ExportFormat::PlainText => text.as_bytes().to_vec(),
        ExportFormat::Document => build_document(text, &options.metadata, options.generated_at)?,
    };

    tracing::debug!(%format, bytes = bytes.len(), "Artifact exported");

    Ok(ExportedArtifact {
        bytes,
        content_type: format.content_type().to_string(),
        file_name: artifact_file_name(format, options),
        format,
    })
}
