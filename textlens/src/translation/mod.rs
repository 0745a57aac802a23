//! Optional translation of extracted text.
//!
//! `TRANSLATION_MODEL` selects the backend: `libretranslate` for a
//! LibreTranslate-compatible server, `openai/<model>` for a chat model.
//! When unset the provider reports itself unavailable and every call fails
//! with a translation error, which the pipeline turns into a warning.

mod libretranslate;
mod openai;

pub use libretranslate::LibreTranslateClient;
pub use openai::OpenAiTranslator;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{parse_provider_model, TranslationConfig};
use crate::error::{Result, TextlensError};

#[async_trait]
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    /// Translate `text` into `target`. `source` is `None` when the source
    /// language should be detected by the service.
    async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> Result<String>;
}

#[derive(Clone)]
enum TranslationBackend {
    Ready { translator: Arc<dyn Translator> },
    Unavailable { reason: String },
}

#[derive(Clone)]
pub struct TranslationProvider {
    backend: TranslationBackend,
    timeout_secs: u64,
}

impl TranslationProvider {
    pub fn new(config: Option<&TranslationConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("Translation is not configured (set TRANSLATION_MODEL)");
        };

        let (provider, _) = parse_provider_model(&config.model);
        let translator: Result<Arc<dyn Translator>> = match provider.to_lowercase().as_str() {
            "libretranslate" => {
                LibreTranslateClient::new(config).map(|c| Arc::new(c) as Arc<dyn Translator>)
            }
            "openai" => OpenAiTranslator::new(config).map(|c| Arc::new(c) as Arc<dyn Translator>),
            _ => Err(TextlensError::TranslationService(format!(
                "Unknown translation provider in model: {}",
                config.model
            ))),
        };

        match translator {
            Ok(translator) => {
                info!(model = %config.model, "Translation backend initialized");
                Self {
                    backend: TranslationBackend::Ready { translator },
                    timeout_secs: config.timeout_secs,
                }
            }
            Err(e) => {
                let reason = format!("Translation backend unavailable: {e}");
                warn!("{}", reason);
                Self::unavailable(&reason)
            }
        }
    }

    pub fn with_translator(translator: Arc<dyn Translator>, timeout_secs: u64) -> Self {
        Self {
            backend: TranslationBackend::Ready { translator },
            timeout_secs,
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: TranslationBackend::Unavailable {
                reason: reason.to_string(),
            },
            timeout_secs: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.backend, TranslationBackend::Ready { .. })
    }

    pub fn backend_name(&self) -> Option<&str> {
        match &self.backend {
            TranslationBackend::Ready { translator } => Some(translator.name()),
            TranslationBackend::Unavailable { .. } => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.backend {
            TranslationBackend::Ready { .. } => None,
            TranslationBackend::Unavailable { reason } => Some(reason),
        }
    }

    pub async fn translate(
        &self,
        text: &str,
        source: Option<&str>,
        target: &str,
    ) -> Result<String> {
        let translator = match &self.backend {
            TranslationBackend::Ready { translator } => translator,
            TranslationBackend::Unavailable { reason } => {
                return Err(TextlensError::TranslationService(reason.clone()))
            }
        };

        let timeout_duration = Duration::from_secs(self.timeout_secs);
        match tokio::time::timeout(timeout_duration, translator.translate(text, source, target))
            .await
        {
            Ok(inner_result) => inner_result,
            Err(_) => Err(TextlensError::timeout("Translation", self.timeout_secs)),
        }
    }
}
