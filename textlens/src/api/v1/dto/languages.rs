use serde::Serialize;

use crate::models::languages::{
    ocr_language_name, COMMON_OCR_LANGUAGES, TESSERACT_LANGUAGES, TRANSLATION_LANGUAGES,
};

#[derive(Debug, Clone, Serialize, PartialEq, Eq, utoipa::ToSchema)]
pub struct LanguageEntry {
    pub code: String,
    pub name: String,
}

impl LanguageEntry {
    fn from_pair((code, name): &(&str, &str)) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

/// Response body for `GET /v1/languages`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LanguagesResponse {
    /// Language used when an extraction request does not name one.
    pub default_ocr_language: String,
    /// Short list offered first in the upload form.
    pub common_ocr: Vec<LanguageEntry>,
    /// Every Tesseract language code the service accepts.
    pub ocr: Vec<LanguageEntry>,
    pub translation: Vec<LanguageEntry>,
}

impl LanguagesResponse {
    pub fn new(default_ocr_language: String) -> Self {
        Self {
            default_ocr_language,
            common_ocr: COMMON_OCR_LANGUAGES
                .iter()
                .filter_map(|code| {
                    ocr_language_name(code).map(|name| LanguageEntry {
                        code: code.to_string(),
                        name: name.to_string(),
                    })
                })
                .collect(),
            ocr: TESSERACT_LANGUAGES.iter().map(LanguageEntry::from_pair).collect(),
            translation: TRANSLATION_LANGUAGES
                .iter()
                .map(LanguageEntry::from_pair)
                .collect(),
        }
    }
}
