use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::api::OpenAiVisionClient;
use super::reflow::reflow_paragraphs;
use super::tesseract::TesseractEngine;
use super::words::retain_confident_words;
use super::OcrEngine;
use crate::config::OcrConfig;
use crate::error::{Result, TextlensError};
use crate::ingest::Image;
use crate::models::{ExtractedText, PageSegmentation};

#[derive(Clone)]
enum OcrBackend {
    Ready { engine: Arc<dyn OcrEngine> },
    Unavailable { reason: String },
}

/// OCR entry point shared across requests.
///
/// Wraps the configured [`OcrEngine`] with the request timeout, the word
/// confidence filter, paragraph reflow and empty-result detection.
#[derive(Clone)]
pub struct OcrProvider {
    backend: OcrBackend,
    timeout_secs: u64,
}

impl OcrProvider {
    pub fn new(config: &OcrConfig) -> Self {
        let model_lower = config.model.to_lowercase();
        let provider_prefix = model_lower.split('/').next().unwrap_or("local");

        let backend = match provider_prefix {
            "openai" => match OpenAiVisionClient::new(config) {
                Ok(client) => {
                    info!(model = %config.model, "OpenAI Vision OCR API backend initialized");
                    OcrBackend::Ready {
                        engine: Arc::new(client),
                    }
                }
                Err(e) => {
                    let reason = format!("OpenAI Vision OCR backend unavailable: {e}");
                    warn!("{}", reason);
                    OcrBackend::Unavailable { reason }
                }
            },
            _ => {
                let mut languages = config.language_list();
                if languages.is_empty() {
                    languages.push(config.default_language());
                }
                match TesseractEngine::new(config.data_path.clone(), &languages) {
                    Ok(engine) => {
                        info!(languages = ?engine.loaded_languages(), "Tesseract OCR initialized");
                        OcrBackend::Ready {
                            engine: Arc::new(engine),
                        }
                    }
                    Err(e) => {
                        let reason = format!("Tesseract not available: {e}");
                        warn!("{}", reason);
                        OcrBackend::Unavailable { reason }
                    }
                }
            }
        };

        Self {
            backend,
            timeout_secs: config.timeout_secs,
        }
    }

    /// Wrap an arbitrary engine, e.g. a deterministic double in tests.
    pub fn with_engine(engine: Arc<dyn OcrEngine>, timeout_secs: u64) -> Self {
        Self {
            backend: OcrBackend::Ready { engine },
            timeout_secs,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            backend: OcrBackend::Unavailable {
                reason: reason.into(),
            },
            timeout_secs: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.backend, OcrBackend::Ready { .. })
    }

    pub fn engine_name(&self) -> Option<&str> {
        match &self.backend {
            OcrBackend::Ready { engine } => Some(engine.name()),
            OcrBackend::Unavailable { .. } => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.backend {
            OcrBackend::Ready { .. } => None,
            OcrBackend::Unavailable { reason } => Some(reason),
        }
    }

    /// Recognize text in `image`, keeping only words scoring above
    /// `min_confidence` when the engine reports words.
    ///
    /// Fails with [`TextlensError::NoTextDetected`] when nothing is left;
    /// callers that treat this as non-fatal should match on it.
    pub async fn recognize(
        &self,
        image: &Image,
        language: &str,
        mode: PageSegmentation,
        min_confidence: u8,
    ) -> Result<ExtractedText> {
        let engine = match &self.backend {
            OcrBackend::Ready { engine } => engine,
            OcrBackend::Unavailable { reason } => {
                return Err(TextlensError::OcrEngineUnavailable(reason.clone()))
            }
        };

        let timeout_duration = Duration::from_secs(self.timeout_secs);
        let mut extracted =
            match tokio::time::timeout(timeout_duration, engine.recognize(image, language, mode))
                .await
            {
                Ok(inner_result) => inner_result?,
                Err(_) => return Err(TextlensError::timeout("OCR", self.timeout_secs)),
            };

        let dropped = retain_confident_words(&mut extracted, min_confidence);
        if dropped > 0 {
            debug!(dropped, min_confidence, "Discarded low-confidence words");
        }

        extracted.text = if mode.reflows_paragraphs() {
            reflow_paragraphs(&extracted.text)
        } else {
            extracted.text.trim().to_string()
        };

        if extracted.is_empty() {
            return Err(TextlensError::NoTextDetected);
        }

        Ok(extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{DynamicImage, ImageFormat};

    struct FixedEngine(&'static str);

    #[async_trait]
    impl OcrEngine for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn recognize(
            &self,
            _image: &Image,
            language: &str,
            _mode: PageSegmentation,
        ) -> Result<ExtractedText> {
            Ok(ExtractedText::new(self.0, language).with_confidence(91.0))
        }
    }

    struct SlowEngine;

    #[async_trait]
    impl OcrEngine for SlowEngine {
        fn name(&self) -> &str {
            "slow"
        }

        async fn recognize(
            &self,
            _image: &Image,
            language: &str,
            _mode: PageSegmentation,
        ) -> Result<ExtractedText> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(ExtractedText::new("late", language))
        }
    }

    /// Engine with word-level output: two lines, one doubtful word.
    struct WordEngine;

    #[async_trait]
    impl OcrEngine for WordEngine {
        fn name(&self) -> &str {
            "words"
        }

        async fn recognize(
            &self,
            _image: &Image,
            language: &str,
            _mode: PageSegmentation,
        ) -> Result<ExtractedText> {
            let words = crate::ocr::parse_tsv(
                "5\t1\t1\t1\t1\t1\t0\t0\t50\t20\t93\tHELLO\n\
                 5\t1\t1\t1\t1\t2\t60\t0\t20\t20\t22\t~%\n\
                 5\t1\t1\t1\t2\t1\t0\t30\t50\t20\t89\tWORLD\n",
            );
            Ok(ExtractedText::new(crate::ocr::words_to_text(&words), language).with_words(words))
        }
    }

    fn image() -> Image {
        Image::new(DynamicImage::new_luma8(20, 20), ImageFormat::Png)
    }

    fn make_config(model: &str, api_key: Option<&str>) -> OcrConfig {
        OcrConfig {
            model: model.to_string(),
            api_key: api_key.map(String::from),
            ..OcrConfig::default()
        }
    }

    #[test]
    fn test_openai_model_without_api_key_falls_back_to_unavailable() {
        let provider = OcrProvider::new(&make_config("openai/gpt-4o", None));
        assert!(!provider.is_available());
        assert!(provider
            .unavailable_reason()
            .is_some_and(|r| r.contains("API key required")));
    }

    #[test]
    fn test_openai_model_with_api_key_is_available() {
        let provider = OcrProvider::new(&make_config("openai/gpt-4o", Some("key")));
        assert!(provider.is_available());
        assert_eq!(provider.engine_name(), Some("openai-vision"));
    }

    #[test]
    fn test_local_model_routes_to_tesseract() {
        // Tesseract may or may not be installed where tests run.
        let provider = OcrProvider::new(&make_config("local/tesseract", None));
        if provider.is_available() {
            assert_eq!(provider.engine_name(), Some("tesseract"));
        } else {
            assert!(provider.unavailable_reason().is_some());
        }
    }

    #[tokio::test]
    async fn test_unavailable_returns_error() {
        let provider = OcrProvider::unavailable("Test unavailable");
        let result = provider
            .recognize(&image(), "eng", PageSegmentation::Document, 60)
            .await;
        assert!(matches!(result, Err(TextlensError::OcrEngineUnavailable(_))));
    }

    #[tokio::test]
    async fn test_blank_result_is_no_text_detected() {
        let provider = OcrProvider::with_engine(Arc::new(FixedEngine("  \n ")), 5);
        let result = provider
            .recognize(&image(), "eng", PageSegmentation::Document, 60)
            .await;
        assert!(matches!(result, Err(TextlensError::NoTextDetected)));
    }

    #[tokio::test]
    async fn test_reflow_applies_only_to_document_modes() {
        let provider = OcrProvider::with_engine(Arc::new(FixedEngine(" HELLO \n WORLD \n")), 5);

        let document = provider
            .recognize(&image(), "eng", PageSegmentation::Document, 60)
            .await
            .unwrap();
        assert_eq!(document.text, "HELLO WORLD");
        assert_eq!(document.confidence, Some(91.0));

        let sparse = provider
            .recognize(&image(), "eng", PageSegmentation::SparseText, 60)
            .await
            .unwrap();
        assert_eq!(sparse.text, "HELLO \n WORLD");
    }

    #[tokio::test]
    async fn test_words_at_or_below_threshold_are_dropped() {
        let provider = OcrProvider::with_engine(Arc::new(WordEngine), 5);
        let extracted = provider
            .recognize(&image(), "eng", PageSegmentation::SparseText, 60)
            .await
            .unwrap();
        assert_eq!(extracted.text, "HELLO\nWORLD");
        assert_eq!(extracted.discarded_words, 1);
        assert_eq!(extracted.confidence, Some(91.0));
        assert_eq!(extracted.words.len(), 2);
    }

    #[tokio::test]
    async fn test_nothing_above_threshold_is_no_text_detected() {
        let provider = OcrProvider::with_engine(Arc::new(WordEngine), 5);
        let result = provider
            .recognize(&image(), "eng", PageSegmentation::Document, 95)
            .await;
        assert!(matches!(result, Err(TextlensError::NoTextDetected)));
    }

    #[tokio::test]
    async fn test_slow_engine_times_out() {
        let provider = OcrProvider::with_engine(Arc::new(SlowEngine), 1);
        let result = provider
            .recognize(&image(), "eng", PageSegmentation::Document, 60)
            .await;
        assert!(matches!(
            result,
            Err(TextlensError::ServiceTimeout { seconds: 1, .. })
        ));
    }
}
