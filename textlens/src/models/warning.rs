use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    NoTextDetected,
    TranslationFailed,
    SpeechFailed,
    LowConfidence,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoTextDetected => "no_text_detected",
            Self::TranslationFailed => "translation_failed",
            Self::SpeechFailed => "speech_failed",
            Self::LowConfidence => "low_confidence",
        }
    }
}

/// Non-fatal condition reported alongside a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct PipelineWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl PipelineWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn no_text_detected() -> Self {
        Self::new(
            WarningKind::NoTextDetected,
            "No text could be detected in the image",
        )
    }

    pub fn translation_failed(reason: impl std::fmt::Display) -> Self {
        Self::new(
            WarningKind::TranslationFailed,
            format!("Translation failed, showing original text: {reason}"),
        )
    }

    pub fn speech_failed(reason: impl std::fmt::Display) -> Self {
        Self::new(
            WarningKind::SpeechFailed,
            format!("Text-to-speech failed: {reason}"),
        )
    }

    pub fn low_confidence(confidence: f32, threshold: u8) -> Self {
        Self::new(
            WarningKind::LowConfidence,
            format!("Mean OCR confidence {confidence:.1} is below the threshold of {threshold}"),
        )
    }

    pub fn words_discarded(count: usize, threshold: u8) -> Self {
        let noun = if count == 1 { "word" } else { "words" };
        Self::new(
            WarningKind::LowConfidence,
            format!("{count} {noun} at or below {threshold}% confidence discarded"),
        )
    }
}
