use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::OcrEngine;
use crate::config::{parse_provider_model, OcrConfig};
use crate::error::{Result, TextlensError};
use crate::ingest::Image;
use crate::models::languages::ocr_language_name;
use crate::models::{ExtractedText, PageSegmentation};

const DEFAULT_VISION_MODEL: &str = "gpt-4o";

/// OCR through an OpenAI-compatible vision chat endpoint.
#[derive(Clone, Debug)]
pub struct OpenAiVisionClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
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

fn build_prompt(language: &str, mode: PageSegmentation) -> String {
    let language_names = language
        .split('+')
        .map(|code| ocr_language_name(code).unwrap_or(code))
        .collect::<Vec<_>>()
        .join(", ");

    let layout = match mode {
        PageSegmentation::SingleLine | PageSegmentation::RawLine => {
            "The image contains a single line of text."
        }
        PageSegmentation::SingleWord => "The image contains a single word.",
        PageSegmentation::SingleChar => "The image contains a single character.",
        PageSegmentation::SparseText => "Text may be scattered across the image.",
        PageSegmentation::Document | PageSegmentation::Block => {
            "Keep line breaks as they appear in the image."
        }
    };

    format!(
        "Extract all text from this image. The text is written in {language_names}. \
         {layout} Return only the extracted text without any explanations or formatting. \
         If there is no text, return an empty response."
    )
}

impl OpenAiVisionClient {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            TextlensError::OcrEngineUnavailable("API key required for OpenAI Vision".to_string())
        })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        let (_, model) = parse_provider_model(&config.model);
        let model = if model.is_empty() {
            DEFAULT_VISION_MODEL.to_string()
        } else {
            model.to_string()
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TextlensError::Ocr(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout_secs: config.timeout_secs,
        })
    }

    async fn request_text(&self, png: &[u8], prompt: String) -> Result<String> {
        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(png));

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: 4096,
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TextlensError::timeout("OCR", self.timeout_secs)
                } else {
                    TextlensError::Ocr(format!("Vision API request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TextlensError::Ocr(format!(
                "Vision API request failed with status {status}: {body}"
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| TextlensError::Ocr(format!("Failed to parse response: {e}")))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| TextlensError::Ocr("No response from API".to_string()))
    }
}

#[async_trait]
impl OcrEngine for OpenAiVisionClient {
    fn name(&self) -> &str {
        "openai-vision"
    }

    async fn recognize(
        &self,
        image: &Image,
        language: &str,
        mode: PageSegmentation,
    ) -> Result<ExtractedText> {
        let png = image.to_png_bytes()?;
        let text = self.request_text(&png, build_prompt(language, mode)).await?;
        Ok(ExtractedText::new(text, language))
    }
}
