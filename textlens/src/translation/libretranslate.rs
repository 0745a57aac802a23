use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Translator;
use crate::config::TranslationConfig;
use crate::error::{Result, TextlensError};

const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Client for a LibreTranslate-compatible `/translate` endpoint.
#[derive(Clone, Debug)]
pub struct LibreTranslateClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// LibreTranslate names Chinese variants differently from the rest of the
/// service.
fn libretranslate_code(code: &str) -> &str {
    match code {
        "zh-cn" => "zh",
        "zh-tw" => "zt",
        other => other,
    }
}

impl LibreTranslateClient {
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                TextlensError::TranslationService(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl Translator for LibreTranslateClient {
    fn name(&self) -> &str {
        "libretranslate"
    }

    async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> Result<String> {
        let request = TranslateRequest {
            q: text,
            source: source.map(libretranslate_code).unwrap_or("auto"),
            target: libretranslate_code(target),
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TextlensError::timeout("Translation", self.timeout_secs)
                } else {
                    TextlensError::TranslationService(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(TextlensError::TranslationService(format!(
                "LibreTranslate returned {status}: {detail}"
            )));
        }

        let parsed: TranslateResponse = response.json().await.map_err(|e| {
            TextlensError::TranslationService(format!("Failed to parse response: {e}"))
        })?;

        Ok(parsed.translated_text)
    }
}
