//! OCR (Optical Character Recognition) Module
//!
//! Text recognition behind a single [`OcrEngine`] trait:
//! - `TesseractEngine` runs Tesseract locally via leptess
//! - `OpenAiVisionClient` calls an OpenAI-compatible vision chat API
//!
//! [`OcrProvider`] picks the engine from `OcrConfig::model`
//! (`local/tesseract`, `openai/<model>`) and degrades to an unavailable
//! backend instead of failing startup.
//!
//! ```rust,ignore
//! let ocr = OcrProvider::new(&config.ocr);
//! let text = ocr.recognize(&image, "eng", PageSegmentation::Document, 60).await?;
//! ```

mod api;
mod provider;
mod reflow;
mod tesseract;
mod words;

pub use api::OpenAiVisionClient;
pub use provider::OcrProvider;
pub use reflow::{reflow_paragraphs, split_paragraphs};
pub use tesseract::TesseractEngine;
pub use words::{parse_tsv, retain_confident_words, words_to_text};

use async_trait::async_trait;

use crate::error::Result;
use crate::ingest::Image;
use crate::models::{ExtractedText, PageSegmentation};

#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Raw recognition. Implementations return the engine output as-is,
    /// with every word when they have word-level results; confidence
    /// filtering, reflow and empty-result handling happen in [`OcrProvider`].
    async fn recognize(
        &self,
        image: &Image,
        language: &str,
        mode: PageSegmentation,
    ) -> Result<ExtractedText>;
}
