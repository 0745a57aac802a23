use serde::{Deserialize, Serialize};

use super::languages::{is_valid_ocr_language, translation_language_name};
use super::{ExportFormat, PageSegmentation};
use crate::error::{Result, TextlensError};

pub const DEFAULT_CONFIDENCE_THRESHOLD: u8 = 60;

/// Per-step switches applied when preprocessing is enabled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessingOptions {
    pub grayscale: bool,
    pub threshold: bool,
    pub denoise: bool,
    pub enhance_contrast: bool,
    pub remove_background_noise: bool,
    /// Rotate skewed text back to horizontal.
    pub deskew: bool,
    pub upscale: bool,
}

impl Default for PreprocessingOptions {
    fn default() -> Self {
        Self {
            grayscale: true,
            threshold: true,
            denoise: true,
            enhance_contrast: false,
            remove_background_noise: false,
            deskew: false,
            upscale: false,
        }
    }
}

impl PreprocessingOptions {
    pub fn none() -> Self {
        Self {
            grayscale: false,
            threshold: false,
            denoise: false,
            enhance_contrast: false,
            remove_background_noise: false,
            deskew: false,
            upscale: false,
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.grayscale
            || self.threshold
            || self.denoise
            || self.enhance_contrast
            || self.remove_background_noise
            || self.deskew
            || self.upscale
    }
}

/// Validated settings for a single extraction request.
///
/// Built through [`ProcessingConfiguration::builder`]; once built the value is
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingConfiguration {
    language: String,
    preprocessing_enabled: bool,
    preprocessing: PreprocessingOptions,
    export_format: ExportFormat,
    translation_target_language: Option<String>,
    text_to_speech_enabled: bool,
    page_segmentation: PageSegmentation,
    confidence_threshold: u8,
}

impl ProcessingConfiguration {
    pub fn builder() -> ProcessingConfigurationBuilder {
        ProcessingConfigurationBuilder::default()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn preprocessing_enabled(&self) -> bool {
        self.preprocessing_enabled
    }

    pub fn preprocessing(&self) -> &PreprocessingOptions {
        &self.preprocessing
    }

    pub fn export_format(&self) -> ExportFormat {
        self.export_format
    }

    pub fn translation_target_language(&self) -> Option<&str> {
        self.translation_target_language.as_deref()
    }

    pub fn text_to_speech_enabled(&self) -> bool {
        self.text_to_speech_enabled
    }

    pub fn page_segmentation(&self) -> PageSegmentation {
        self.page_segmentation
    }

    pub fn confidence_threshold(&self) -> u8 {
        self.confidence_threshold
    }
}

impl Default for ProcessingConfiguration {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            preprocessing_enabled: true,
            preprocessing: PreprocessingOptions::default(),
            export_format: ExportFormat::default(),
            translation_target_language: None,
            text_to_speech_enabled: false,
            page_segmentation: PageSegmentation::default(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingConfigurationBuilder {
    language: Option<String>,
    preprocessing_enabled: Option<bool>,
    preprocessing: Option<PreprocessingOptions>,
    export_format: Option<ExportFormat>,
    translation_target_language: Option<String>,
    text_to_speech_enabled: bool,
    page_segmentation: Option<PageSegmentation>,
    confidence_threshold: Option<u8>,
}

impl ProcessingConfigurationBuilder {
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn preprocessing_enabled(mut self, enabled: bool) -> Self {
        self.preprocessing_enabled = Some(enabled);
        self
    }

    pub fn preprocessing(mut self, options: PreprocessingOptions) -> Self {
        self.preprocessing = Some(options);
        self
    }

    pub fn export_format(mut self, format: ExportFormat) -> Self {
        self.export_format = Some(format);
        self
    }

    /// Empty strings are treated as "no translation".
    pub fn translate_to(mut self, language: Option<&str>) -> Self {
        self.translation_target_language = language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        self
    }

    pub fn text_to_speech(mut self, enabled: bool) -> Self {
        self.text_to_speech_enabled = enabled;
        self
    }

    pub fn page_segmentation(mut self, mode: PageSegmentation) -> Self {
        self.page_segmentation = Some(mode);
        self
    }

    pub fn confidence_threshold(mut self, threshold: u8) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }

    pub fn build(self) -> Result<ProcessingConfiguration> {
        let defaults = ProcessingConfiguration::default();

        let language = self
            .language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or(defaults.language);
        if !is_valid_ocr_language(&language) {
            return Err(TextlensError::Validation(format!(
                "Unsupported OCR language: {language}"
            )));
        }

        let translation_target_language = match self.translation_target_language {
            Some(target) => {
                let target = target.to_lowercase();
                if translation_language_name(&target).is_none() {
                    return Err(TextlensError::Validation(format!(
                        "Unsupported translation language: {target}"
                    )));
                }
                Some(target)
            }
            None => None,
        };

        let confidence_threshold = self
            .confidence_threshold
            .unwrap_or(defaults.confidence_threshold);
        if confidence_threshold > 100 {
            return Err(TextlensError::Validation(format!(
                "Confidence threshold must be between 0 and 100, got {confidence_threshold}"
            )));
        }

        Ok(ProcessingConfiguration {
            language,
            preprocessing_enabled: self
                .preprocessing_enabled
                .unwrap_or(defaults.preprocessing_enabled),
            preprocessing: self.preprocessing.unwrap_or(defaults.preprocessing),
            export_format: self.export_format.unwrap_or(defaults.export_format),
            translation_target_language,
            text_to_speech_enabled: self.text_to_speech_enabled,
            page_segmentation: self
                .page_segmentation
                .unwrap_or(defaults.page_segmentation),
            confidence_threshold,
        })
    }
}
