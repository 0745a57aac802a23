use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::SpeechSynthesizer;
use crate::config::{parse_provider_model, SpeechConfig};
use crate::error::{Result, TextlensError};
use crate::models::AudioFormat;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "tts-1";

/// Client for an OpenAI-compatible `/audio/speech` endpoint (MP3 output).
#[derive(Clone, Debug)]
pub struct OpenAiSpeechClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    voice: String,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
}

impl OpenAiSpeechClient {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            TextlensError::SpeechSynthesis("API key required for OpenAI speech".to_string())
        })?;

        let (_, model) = parse_provider_model(&config.model);
        let model = if model.is_empty() { DEFAULT_MODEL } else { model };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                TextlensError::SpeechSynthesis(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or(OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            voice: config.voice.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeechClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    // The API infers the spoken language from the text itself.
    async fn synthesize(&self, text: &str, _language: &str) -> Result<Vec<u8>> {
        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            response_format: "mp3",
        };

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TextlensError::timeout("Text-to-speech", self.timeout_secs)
                } else {
                    TextlensError::SpeechSynthesis(format!("Request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TextlensError::SpeechSynthesis(format!(
                "Speech API returned {status}: {body}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TextlensError::timeout("Text-to-speech", self.timeout_secs)
                } else {
                    TextlensError::SpeechSynthesis(format!("Failed to read audio: {e}"))
                }
            })?;

        if bytes.is_empty() {
            return Err(TextlensError::SpeechSynthesis(
                "Speech API returned no audio".to_string(),
            ));
        }

        Ok(bytes.to_vec())
    }
}
