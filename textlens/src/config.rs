use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Reads an env var, treating empty values as unset.
fn env_non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub translation: Option<TranslationConfig>,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// `+` or comma separated Tesseract language codes loaded at startup.
    pub languages: String,
    pub data_path: Option<String>,
    pub timeout_secs: u64,
    pub min_image_dimension: u32,
    pub max_image_dimension: u32,
}

impl OcrConfig {
    /// Primary language used when a request does not name one.
    pub fn default_language(&self) -> String {
        self.language_list()
            .into_iter()
            .next()
            .unwrap_or_else(|| "eng".to_string())
    }

    pub fn language_list(&self) -> Vec<String> {
        self.languages
            .split([',', '+'])
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model: "local/tesseract".to_string(),
            api_key: None,
            base_url: None,
            languages: "eng".to_string(),
            data_path: None,
            timeout_secs: 60,
            min_image_dimension: 10,
            max_image_dimension: 8192,
        }
    }
}

/// Translation service configuration. Absent when `TRANSLATION_MODEL` is unset.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub voice: String,
    pub timeout_secs: u64,
    pub max_chars: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            model: "local/espeak-ng".to_string(),
            api_key: None,
            base_url: None,
            voice: "alloy".to_string(),
            timeout_secs: 60,
            max_chars: 5000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("TEXTLENS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("TEXTLENS_PORT", 3000),
                max_upload_bytes: parse_env_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            },
            ocr: OcrConfig {
                model: env::var("OCR_MODEL").unwrap_or_else(|_| "local/tesseract".to_string()),
                api_key: env_non_empty("OCR_API_KEY"),
                base_url: env_non_empty("OCR_BASE_URL"),
                languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "eng".to_string()),
                data_path: env_non_empty("OCR_DATA_PATH"),
                timeout_secs: parse_env_or("OCR_TIMEOUT", 60),
                min_image_dimension: parse_env_or("OCR_MIN_DIMENSION", 10),
                max_image_dimension: parse_env_or("OCR_MAX_DIMENSION", 8192),
            },
            translation: env_non_empty("TRANSLATION_MODEL").map(|model| TranslationConfig {
                model,
                api_key: env_non_empty("TRANSLATION_API_KEY"),
                base_url: env_non_empty("TRANSLATION_BASE_URL"),
                timeout_secs: parse_env_or("TRANSLATION_TIMEOUT", 30),
            }),
            speech: SpeechConfig {
                model: env::var("TTS_MODEL").unwrap_or_else(|_| "local/espeak-ng".to_string()),
                api_key: env_non_empty("TTS_API_KEY"),
                base_url: env_non_empty("TTS_BASE_URL"),
                voice: env::var("TTS_VOICE").unwrap_or_else(|_| "alloy".to_string()),
                timeout_secs: parse_env_or("TTS_TIMEOUT", 60),
                max_chars: parse_env_opt("TTS_MAX_CHARS").unwrap_or(5000),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Split `provider/model` into its parts. Strings without a slash are
/// treated as a bare provider name with an empty model.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    match model.split_once('/') {
        Some((provider, rest)) => (provider, rest),
        None => (model, ""),
    }
}
