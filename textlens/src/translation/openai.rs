use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Translator;
use crate::config::{parse_provider_model, TranslationConfig};
use crate::error::{Result, TextlensError};
use crate::models::languages::translation_language_name;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Translation through an OpenAI-compatible chat completion endpoint.
#[derive(Clone, Debug)]
pub struct OpenAiTranslator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

fn system_prompt(source: Option<&str>, target: &str) -> String {
    let target_name = translation_language_name(target).unwrap_or(target);
    let source_clause = source
        .map(|s| {
            let name = translation_language_name(s).unwrap_or(s);
            format!(" from {name}")
        })
        .unwrap_or_default();
    format!(
        "You are a translation engine. Translate the user's text{source_clause} into \
         {target_name}. Preserve line breaks and paragraph structure. Reply with the \
         translation only."
    )
}

fn request_error(e: reqwest::Error, timeout_secs: u64) -> TextlensError {
    if e.is_timeout() {
        TextlensError::timeout("Translation", timeout_secs)
    } else {
        TextlensError::TranslationService(format!("Request failed: {e}"))
    }
}

impl OpenAiTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            TextlensError::TranslationService(
                "API key required for OpenAI translation".to_string(),
            )
        })?;

        let (_, model) = parse_provider_model(&config.model);
        let model = if model.is_empty() { DEFAULT_MODEL } else { model };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                TextlensError::TranslationService(format!("Failed to create HTTP client: {e}"))
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
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> Result<String> {
        let system = system_prompt(source, target);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout_secs))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TextlensError::TranslationService(format!(
                "Translation API returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                TextlensError::timeout("Translation", self.timeout_secs)
            } else {
                TextlensError::TranslationService(format!("Failed to parse response: {e}"))
            }
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| TextlensError::TranslationService("Empty translation".to_string()))
    }
}
