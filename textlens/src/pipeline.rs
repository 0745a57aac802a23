//! One extraction request end to end: ingest, preprocess, OCR, optional
//! translation and speech, export.
//!
//! Only ingestion and OCR failures abort a run. Missing text, translation
//! and speech problems are reported as [`PipelineWarning`]s next to
//! whatever was produced.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::{extract_structured_data, statistics, StructuredData, TextStatistics};
use crate::error::{Result, TextlensError};
use crate::export::{export, ExportOptions};
use crate::ingest::{ingest, Image, IngestLimits};
use crate::models::languages::{ocr_language_name, ocr_to_iso639_1};
use crate::models::{
    AudioArtifact, ExportedArtifact, ExtractedText, Metadata, PipelineWarning,
    ProcessingConfiguration,
};
use crate::ocr::OcrProvider;
use crate::preprocess::preprocess;
use crate::speech::SpeechProvider;
use crate::translation::TranslationProvider;

/// Speech language used when the OCR language has no ISO 639-1 mapping.
const FALLBACK_SPEECH_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Serialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl From<&Image> for ImageSummary {
    fn from(image: &Image) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            format: format!("{:?}", image.format).to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedText {
    pub text: String,
    /// Set only when the caller named the source; otherwise auto-detected.
    pub source_language: Option<String>,
    pub target_language: String,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub image: ImageSummary,
    /// Dimensions of the bitmap the OCR engine saw; word boxes refer to it.
    pub ocr_image: ImageSummary,
    pub extracted: ExtractedText,
    pub translation: Option<TranslatedText>,
    /// Translated text when translation succeeded, otherwise the OCR text.
    pub final_text: String,
    pub artifact: ExportedArtifact,
    pub audio: Option<AudioArtifact>,
    pub warnings: Vec<PipelineWarning>,
    pub statistics: TextStatistics,
    pub structured_data: StructuredData,
}

/// Providers shared by every request. Cheap to clone.
#[derive(Clone)]
pub struct Pipeline {
    ocr: OcrProvider,
    translation: TranslationProvider,
    speech: SpeechProvider,
    limits: IngestLimits,
}

fn blocking_error(e: tokio::task::JoinError) -> TextlensError {
    TextlensError::Processing(format!("Image task panicked: {e}"))
}

impl Pipeline {
    pub fn new(
        ocr: OcrProvider,
        translation: TranslationProvider,
        speech: SpeechProvider,
        limits: IngestLimits,
    ) -> Self {
        Self {
            ocr,
            translation,
            speech,
            limits,
        }
    }

    pub fn ocr(&self) -> &OcrProvider {
        &self.ocr
    }

    pub fn translation(&self) -> &TranslationProvider {
        &self.translation
    }

    pub fn speech(&self) -> &SpeechProvider {
        &self.speech
    }

    pub fn limits(&self) -> &IngestLimits {
        &self.limits
    }

    pub async fn run(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        config: &ProcessingConfiguration,
    ) -> Result<PipelineOutcome> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        let mut warnings = Vec::new();

        let limits = self.limits;
        let name = file_name.to_string();
        let image = tokio::task::spawn_blocking(move || ingest(&name, &bytes, &limits))
            .await
            .map_err(blocking_error)??;
        let summary = ImageSummary::from(&image);

        let image = if config.preprocessing_enabled() {
            let cfg = config.clone();
            tokio::task::spawn_blocking(move || preprocess(image, &cfg))
                .await
                .map_err(blocking_error)?
        } else {
            image
        };
        let ocr_image = ImageSummary::from(&image);

        let extracted = match self
            .ocr
            .recognize(
                &image,
                config.language(),
                config.page_segmentation(),
                config.confidence_threshold(),
            )
            .await
        {
            Ok(extracted) => extracted,
            Err(TextlensError::NoTextDetected) => {
                warn!(%run_id, file = %file_name, "No text detected");
                warnings.push(PipelineWarning::no_text_detected());
                ExtractedText::empty(config.language())
            }
            Err(e) => return Err(e),
        };
        drop(image);

        if extracted.discarded_words > 0 {
            warnings.push(PipelineWarning::words_discarded(
                extracted.discarded_words,
                config.confidence_threshold(),
            ));
        } else if let Some(confidence) = extracted.confidence {
            if extracted.words.is_empty()
                && !extracted.is_empty()
                && confidence < f32::from(config.confidence_threshold())
            {
                warnings.push(PipelineWarning::low_confidence(
                    confidence,
                    config.confidence_threshold(),
                ));
            }
        }

        let ocr_language = ocr_to_iso639_1(&extracted.language);

        let translation = match config.translation_target_language() {
            Some(target) if !extracted.is_empty() => {
                // OCR codes such as `eng+fra` name no single source language,
                // so the backend detects it.
                match self
                    .translation
                    .translate(&extracted.text, None, target)
                    .await
                {
                    Ok(text) => Some(TranslatedText {
                        text,
                        source_language: None,
                        target_language: target.to_string(),
                    }),
                    Err(e) => {
                        warn!(%run_id, error = %e, target_language = target, "Translation failed, keeping original text");
                        warnings.push(PipelineWarning::translation_failed(&e));
                        None
                    }
                }
            }
            _ => None,
        };

        let final_text = translation
            .as_ref()
            .map(|t| t.text.clone())
            .unwrap_or_else(|| extracted.text.clone());

        let audio = if config.text_to_speech_enabled() && !final_text.trim().is_empty() {
            let speech_language = translation
                .as_ref()
                .map(|t| t.target_language.as_str())
                .or(ocr_language)
                .unwrap_or(FALLBACK_SPEECH_LANGUAGE);
            match self.speech.synthesize(&final_text, speech_language).await {
                Ok(audio) => Some(audio),
                Err(e) => {
                    warn!(%run_id, error = %e, "Text-to-speech failed");
                    warnings.push(PipelineWarning::speech_failed(&e));
                    None
                }
            }
        } else {
            None
        };

        let options = ExportOptions {
            metadata: document_metadata(&extracted, config, translation.as_ref()),
            translated_to: translation.as_ref().map(|t| t.target_language.clone()),
            ..ExportOptions::default()
        };
        let artifact = export(&final_text, config.export_format(), &options)?;

        let outcome = PipelineOutcome {
            image: summary,
            ocr_image,
            statistics: statistics(&final_text),
            structured_data: extract_structured_data(&final_text),
            extracted,
            translation,
            final_text,
            artifact,
            audio,
            warnings,
        };

        info!(
            %run_id,
            file = %file_name,
            chars = outcome.final_text.chars().count(),
            warnings = outcome.warnings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Extraction finished"
        );
        debug!(format = %config.export_format(), bytes = outcome.artifact.len(), "Artifact ready");

        Ok(outcome)
    }
}

fn document_metadata(
    extracted: &ExtractedText,
    config: &ProcessingConfiguration,
    translation: Option<&TranslatedText>,
) -> Metadata {
    let mut metadata = Metadata::new();
    let language_label = extracted
        .language
        .split('+')
        .map(|code| ocr_language_name(code).unwrap_or(code))
        .collect::<Vec<_>>()
        .join(" + ");
    metadata.insert("Language".to_string(), language_label);
    if let Some(confidence) = extracted.confidence {
        metadata.insert("Confidence".to_string(), format!("{confidence:.1}%"));
    }
    metadata.insert(
        "Page segmentation".to_string(),
        config.page_segmentation().to_string(),
    );
    metadata.insert(
        "Preprocessing".to_string(),
        if config.preprocessing_enabled() { "on" } else { "off" }.to_string(),
    );
    if let Some(translation) = translation {
        metadata.insert(
            "Translated to".to_string(),
            translation.target_language.clone(),
        );
    }
    metadata
}
