use serde::{Deserialize, Serialize};

/// Pixel rectangle in the image that was handed to the OCR engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where a word sits in the engine's page layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LinePosition {
    pub block: u32,
    pub paragraph: u32,
    pub line: u32,
}

/// A single word reported by an engine with word-level output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RecognizedWord {
    pub text: String,
    /// 0-100.
    pub confidence: f32,
    pub bbox: BoundingBox,
    #[serde(skip)]
    pub position: LinePosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ConfidenceSummary {
    pub average: f32,
    pub minimum: f32,
    pub maximum: f32,
}

/// Text recognized in a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedText {
    pub text: String,
    /// Mean word confidence in the 0-100 range, when the engine reports one.
    pub confidence: Option<f32>,
    pub language: String,
    /// Word-level results; empty for engines that only return text.
    #[serde(default)]
    pub words: Vec<RecognizedWord>,
    /// Words dropped for scoring at or below the confidence threshold.
    #[serde(default)]
    pub discarded_words: usize,
}

impl ExtractedText {
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
            language: language.into(),
            words: Vec::new(),
            discarded_words: 0,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 100.0));
        self
    }

    /// Attach word-level results; the confidence becomes their mean.
    pub fn with_words(mut self, words: Vec<RecognizedWord>) -> Self {
        self.set_words(words);
        self
    }

    pub fn set_words(&mut self, words: Vec<RecognizedWord>) {
        self.confidence = summarize(&words).map(|s| s.average);
        self.words = words;
    }

    pub fn empty(language: impl Into<String>) -> Self {
        Self::new(String::new(), language)
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Average, minimum and maximum word confidence.
    pub fn confidence_summary(&self) -> Option<ConfidenceSummary> {
        summarize(&self.words)
    }
}

fn summarize(words: &[RecognizedWord]) -> Option<ConfidenceSummary> {
    if words.is_empty() {
        return None;
    }
    let (sum, minimum, maximum) = words.iter().fold(
        (0.0f32, f32::MAX, f32::MIN),
        |(sum, lo, hi), w| (sum + w.confidence, lo.min(w.confidence), hi.max(w.confidence)),
    );
    Some(ConfidenceSummary {
        average: sum / words.len() as f32,
        minimum,
        maximum,
    })
}
