//! Shared doubles and fixtures for integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};

use textlens::api::AppState;
use textlens::config::Config;
use textlens::error::{Result, TextlensError};
use textlens::ingest::{Image, IngestLimits};
use textlens::models::{AudioFormat, ExtractedText, PageSegmentation};
use textlens::ocr::{parse_tsv, words_to_text, OcrEngine, OcrProvider};
use textlens::pipeline::Pipeline;
use textlens::speech::{SpeechProvider, SpeechSynthesizer};
use textlens::translation::{TranslationProvider, Translator};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A white canvas with a dark bar, large enough to pass ingestion limits.
pub fn sample_bitmap() -> DynamicImage {
    let mut canvas = GrayImage::from_pixel(200, 60, Luma([255]));
    for x in 20..180 {
        for y in 25..35 {
            canvas.put_pixel(x, y, Luma([0]));
        }
    }
    DynamicImage::ImageLuma8(canvas)
}

pub fn encode(bitmap: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    bitmap
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode fixture image");
    bytes
}

pub fn png_bytes() -> Vec<u8> {
    encode(&sample_bitmap(), ImageFormat::Png)
}

pub fn bmp_bytes() -> Vec<u8> {
    encode(&sample_bitmap(), ImageFormat::Bmp)
}

/// OCR double answering every call with the same text and counting calls.
pub struct ScriptedEngine {
    text: Option<String>,
    confidence: Option<f32>,
    /// Tesseract TSV answered as word-level results instead of `text`.
    tsv: Option<String>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(u32, u32, String)>>,
}

impl ScriptedEngine {
    pub fn returning(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: Some(text.to_string()),
            confidence: Some(95.0),
            tsv: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn returning_with_confidence(text: &str, confidence: f32) -> Arc<Self> {
        Arc::new(Self {
            text: Some(text.to_string()),
            confidence: Some(confidence),
            tsv: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Engine reporting the words of a Tesseract TSV page.
    pub fn returning_words(tsv: &str) -> Arc<Self> {
        Arc::new(Self {
            text: None,
            confidence: None,
            tsv: Some(tsv.to_string()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Engine that reports nothing recognizable.
    pub fn no_text() -> Arc<Self> {
        Arc::new(Self {
            text: None,
            confidence: None,
            tsv: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(width, height, language)` of every image handed to the engine.
    pub fn seen(&self) -> Vec<(u32, u32, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl OcrEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn recognize(
        &self,
        image: &Image,
        language: &str,
        _mode: PageSegmentation,
    ) -> Result<ExtractedText> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((image.width(), image.height(), language.to_string()));

        if let Some(tsv) = &self.tsv {
            let words = parse_tsv(tsv);
            return Ok(ExtractedText::new(words_to_text(&words), language).with_words(words));
        }

        match &self.text {
            Some(text) => {
                let extracted = ExtractedText::new(text.clone(), language);
                Ok(match self.confidence {
                    Some(c) => extracted.with_confidence(c),
                    None => extracted,
                })
            }
            None => Err(TextlensError::NoTextDetected),
        }
    }
}

/// Translator double that tags text with the target language.
pub struct TaggingTranslator;

#[async_trait]
impl Translator for TaggingTranslator {
    fn name(&self) -> &str {
        "tagging"
    }

    async fn translate(&self, text: &str, _source: Option<&str>, target: &str) -> Result<String> {
        Ok(format!("[{target}] {text}"))
    }
}

/// Translator double recording `(source, target)` of every call.
#[derive(Default)]
pub struct RecordingTranslator {
    pub requests: Mutex<Vec<(Option<String>, String)>>,
}

#[async_trait]
impl Translator for RecordingTranslator {
    fn name(&self) -> &str {
        "recording"
    }

    async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> Result<String> {
        self.requests
            .lock()
            .unwrap()
            .push((source.map(String::from), target.to_string()));
        Ok(format!("[{target}] {text}"))
    }
}

/// Translator double whose backend is always down.
pub struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn translate(&self, _text: &str, _source: Option<&str>, _target: &str) -> Result<String> {
        Err(TextlensError::TranslationService(
            "service unreachable".to_string(),
        ))
    }
}

/// Speech double recording `(text, language)` pairs.
#[derive(Default)]
pub struct RecordingSynthesizer {
    pub spoken: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    fn name(&self) -> &str {
        "recording"
    }

    fn format(&self) -> AudioFormat {
        AudioFormat::Wav
    }

    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), language.to_string()));
        Ok(b"RIFF....WAVE".to_vec())
    }
}

pub fn pipeline_with(
    engine: Arc<dyn OcrEngine>,
    translator: Option<Arc<dyn Translator>>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
) -> Pipeline {
    Pipeline::new(
        OcrProvider::with_engine(engine, 5),
        translation_provider(translator),
        speech_provider(synthesizer),
        IngestLimits::default(),
    )
}

fn translation_provider(translator: Option<Arc<dyn Translator>>) -> TranslationProvider {
    match translator {
        Some(t) => TranslationProvider::with_translator(t, 5),
        None => TranslationProvider::unavailable("not configured in tests"),
    }
}

fn speech_provider(synthesizer: Option<Arc<dyn SpeechSynthesizer>>) -> SpeechProvider {
    match synthesizer {
        Some(s) => SpeechProvider::with_synthesizer(s, 5, 5000),
        None => SpeechProvider::unavailable("not configured in tests"),
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.ocr.languages = "eng".to_string();
    config.server.max_upload_bytes = 10 * 1024 * 1024;
    config.ocr.min_image_dimension = 10;
    config.ocr.max_image_dimension = 8192;
    config
}

pub fn app_state(
    engine: Arc<dyn OcrEngine>,
    translator: Option<Arc<dyn Translator>>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
) -> AppState {
    AppState::new(
        test_config(),
        OcrProvider::with_engine(engine, 5),
        translation_provider(translator),
        speech_provider(synthesizer),
    )
}
