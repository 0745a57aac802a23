use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::TextlensError;

/// Ordered key/value pairs rendered into exported documents.
pub type Metadata = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    PlainText,
    Document,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::PlainText => "text/plain; charset=utf-8",
            Self::Document => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::Document => "docx",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlainText => write!(f, "plain_text"),
            Self::Document => write!(f, "document"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = TextlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain_text" | "plaintext" | "text" | "txt" => Ok(Self::PlainText),
            "document" | "docx" | "word" => Ok(Self::Document),
            _ => Err(TextlensError::UnsupportedExportFormat(s.to_string())),
        }
    }
}

/// Tesseract page segmentation presets exposed to users.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PageSegmentation {
    /// Single uniform block of text, interword spacing preserved.
    #[default]
    Document,
    /// Single uniform block of text.
    Block,
    SingleLine,
    SingleWord,
    SingleChar,
    /// As much text as possible in no particular order.
    SparseText,
    RawLine,
}

impl PageSegmentation {
    /// Tesseract `--psm` value.
    pub fn psm(&self) -> u8 {
        match self {
            Self::Document | Self::Block => 6,
            Self::SingleLine => 7,
            Self::SingleWord => 8,
            Self::SingleChar => 10,
            Self::SparseText => 11,
            Self::RawLine => 13,
        }
    }

    pub fn preserve_interword_spaces(&self) -> bool {
        matches!(self, Self::Document)
    }

    /// Whether extracted text should be reflowed into paragraphs.
    pub fn reflows_paragraphs(&self) -> bool {
        matches!(self, Self::Document | Self::Block)
    }
}

impl std::fmt::Display for PageSegmentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Block => write!(f, "block"),
            Self::SingleLine => write!(f, "single_line"),
            Self::SingleWord => write!(f, "single_word"),
            Self::SingleChar => write!(f, "single_char"),
            Self::SparseText => write!(f, "sparse_text"),
            Self::RawLine => write!(f, "raw_line"),
        }
    }
}

impl std::str::FromStr for PageSegmentation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "document" | "paragraphs" | "default" => Ok(Self::Document),
            "block" => Ok(Self::Block),
            "single_line" => Ok(Self::SingleLine),
            "single_word" => Ok(Self::SingleWord),
            "single_char" => Ok(Self::SingleChar),
            "sparse_text" => Ok(Self::SparseText),
            "raw_line" => Ok(Self::RawLine),
            _ => Err(format!("Unknown page segmentation mode: {s}")),
        }
    }
}
