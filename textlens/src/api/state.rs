use std::sync::Arc;

use crate::config::Config;
use crate::ingest::IngestLimits;
use crate::ocr::OcrProvider;
use crate::pipeline::Pipeline;
use crate::speech::SpeechProvider;
use crate::translation::TranslationProvider;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Pipeline,
}

impl AppState {
    pub fn new(
        config: Config,
        ocr: OcrProvider,
        translation: TranslationProvider,
        speech: SpeechProvider,
    ) -> Self {
        let limits = IngestLimits::from_config(&config);
        let pipeline = Pipeline::new(ocr, translation, speech, limits);

        Self {
            config: Arc::new(config),
            pipeline,
        }
    }

    /// Build every provider from `config`. Missing backends degrade to
    /// unavailable providers instead of failing startup.
    pub fn from_config(config: Config) -> Self {
        let ocr = OcrProvider::new(&config.ocr);
        let translation = TranslationProvider::new(config.translation.as_ref());
        let speech = SpeechProvider::new(&config.speech);
        Self::new(config, ocr, translation, speech)
    }

    /// OCR language used when a request does not name one.
    pub fn default_language(&self) -> String {
        self.config.ocr.default_language()
    }
}
