//! Statistics and structured-data extraction over recognized text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextStatistics {
    /// Grapheme clusters, whitespace excluded.
    pub characters: usize,
    pub characters_with_spaces: usize,
    pub words: usize,
    pub sentences: usize,
    /// Non-blank lines.
    pub paragraphs: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StructuredData {
    pub emails: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub urls: Vec<String>,
    pub dates: Vec<String>,
    pub numbers: Vec<String>,
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b")
        .expect("valid phone regex")
});

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"'()]+"#).expect("valid url regex"));

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").expect("valid date regex"));

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("valid number regex"));

pub fn statistics(text: &str) -> TextStatistics {
    if text.trim().is_empty() {
        return TextStatistics::default();
    }

    let graphemes = text.graphemes(true);
    let characters_with_spaces = graphemes.clone().count();
    let characters = graphemes
        .filter(|g| !g.chars().all(char::is_whitespace))
        .count();

    TextStatistics {
        characters,
        characters_with_spaces,
        words: text.unicode_words().count(),
        sentences: text
            .unicode_sentences()
            .filter(|s| s.chars().any(char::is_alphanumeric))
            .count(),
        paragraphs: text.lines().filter(|l| !l.trim().is_empty()).count(),
    }
}

fn find_all(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

pub fn extract_structured_data(text: &str) -> StructuredData {
    StructuredData {
        emails: find_all(&EMAIL_RE, text),
        phone_numbers: PHONE_RE
            .find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            .collect(),
        urls: URL_RE
            .find_iter(text)
            .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']).to_string())
            .collect(),
        dates: find_all(&DATE_RE, text),
        numbers: find_all(&NUMBER_RE, text),
    }
}
