//! Optional text-to-speech.
//!
//! `TTS_MODEL=local/espeak-ng` (default) shells out to espeak-ng and
//! returns WAV audio; `openai/<model>` calls an OpenAI-compatible
//! `/audio/speech` endpoint and returns MP3.

mod espeak;
mod openai;

pub use espeak::EspeakSynthesizer;
pub use openai::OpenAiSpeechClient;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{parse_provider_model, SpeechConfig};
use crate::error::{Result, TextlensError};
use crate::models::{AudioArtifact, AudioFormat};

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    fn format(&self) -> AudioFormat;

    /// `language` is an ISO 639-1 style code such as `en` or `zh-cn`.
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;
}

#[derive(Clone)]
enum SpeechBackend {
    Ready {
        synthesizer: Arc<dyn SpeechSynthesizer>,
    },
    Unavailable {
        reason: String,
    },
}

#[derive(Clone)]
pub struct SpeechProvider {
    backend: SpeechBackend,
    timeout_secs: u64,
    max_chars: usize,
}

/// Cut `text` to at most `max_chars` characters, preferring the last word
/// boundary inside the limit.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        None => text,
        Some((cut, _)) => {
            let head = &text[..cut];
            match head.rfind(char::is_whitespace) {
                Some(space) if space > 0 => head[..space].trim_end(),
                _ => head,
            }
        }
    }
}

impl SpeechProvider {
    pub fn new(config: &SpeechConfig) -> Self {
        let (provider, _) = parse_provider_model(&config.model);

        let synthesizer: Result<Arc<dyn SpeechSynthesizer>> =
            match provider.to_lowercase().as_str() {
                "openai" => OpenAiSpeechClient::new(config)
                    .map(|c| Arc::new(c) as Arc<dyn SpeechSynthesizer>),
                "local" | "espeak" | "espeak-ng" => {
                    let synth = EspeakSynthesizer::new();
                    synth
                        .check_installed()
                        .map(|_| Arc::new(synth) as Arc<dyn SpeechSynthesizer>)
                }
                _ => Err(TextlensError::SpeechSynthesis(format!(
                    "Unknown speech provider in model: {}",
                    config.model
                ))),
            };

        match synthesizer {
            Ok(synthesizer) => {
                info!(model = %config.model, "Text-to-speech backend initialized");
                Self {
                    backend: SpeechBackend::Ready { synthesizer },
                    timeout_secs: config.timeout_secs,
                    max_chars: config.max_chars,
                }
            }
            Err(e) => {
                let reason = format!("Text-to-speech backend unavailable: {e}");
                warn!("{}", reason);
                Self::unavailable(&reason)
            }
        }
    }

    pub fn with_synthesizer(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        timeout_secs: u64,
        max_chars: usize,
    ) -> Self {
        Self {
            backend: SpeechBackend::Ready { synthesizer },
            timeout_secs,
            max_chars,
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: SpeechBackend::Unavailable {
                reason: reason.to_string(),
            },
            timeout_secs: 0,
            max_chars: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.backend, SpeechBackend::Ready { .. })
    }

    pub fn backend_name(&self) -> Option<&str> {
        match &self.backend {
            SpeechBackend::Ready { synthesizer } => Some(synthesizer.name()),
            SpeechBackend::Unavailable { .. } => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.backend {
            SpeechBackend::Ready { .. } => None,
            SpeechBackend::Unavailable { reason } => Some(reason),
        }
    }

    pub async fn synthesize(&self, text: &str, language: &str) -> Result<AudioArtifact> {
        let synthesizer = match &self.backend {
            SpeechBackend::Ready { synthesizer } => synthesizer,
            SpeechBackend::Unavailable { reason } => {
                return Err(TextlensError::SpeechSynthesis(reason.clone()))
            }
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(TextlensError::SpeechSynthesis("No text to speak".to_string()));
        }

        let spoken = truncate_chars(text, self.max_chars);
        if spoken.len() < text.len() {
            warn!(
                max_chars = self.max_chars,
                "Text exceeds speech limit, synthesizing the first part only"
            );
        }

        let timeout_duration = Duration::from_secs(self.timeout_secs);
        let bytes = match tokio::time::timeout(
            timeout_duration,
            synthesizer.synthesize(spoken, language),
        )
        .await
        {
            Ok(inner_result) => inner_result?,
            Err(_) => return Err(TextlensError::timeout("Text-to-speech", self.timeout_secs)),
        };

        Ok(AudioArtifact {
            bytes,
            format: synthesizer.format(),
            language: language.to_string(),
        })
    }
}
