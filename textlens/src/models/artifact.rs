use serde::Serialize;

use super::ExportFormat;

/// A downloadable file produced from extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedArtifact {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
    pub format: ExportFormat,
}

impl ExportedArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }
}

/// Synthesized speech for the final text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioArtifact {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
    /// Language the text was spoken in.
    pub language: String,
}

impl AudioArtifact {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}
