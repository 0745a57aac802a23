use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use leptess::{LepTess, Variable};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::words::{parse_tsv, words_to_text};
use super::OcrEngine;
use crate::error::{Result, TextlensError};
use crate::ingest::Image;
use crate::models::{ExtractedText, PageSegmentation, RecognizedWord};

/// Local Tesseract engine.
///
/// Handles for the configured languages (each on its own and, when there
/// are several, all of them combined) are created eagerly and shared behind
/// mutexes. Any other language gets a fresh handle per request, so a missing
/// traineddata file only fails that request.
pub struct TesseractEngine {
    data_path: Option<String>,
    handles: HashMap<String, Arc<Mutex<LepTess>>>,
}

fn create_tesseract(data_path: Option<&str>, language: &str) -> Result<LepTess> {
    LepTess::new(data_path, language).map_err(|e| {
        TextlensError::OcrEngineUnavailable(format!(
            "Tesseract could not load language '{language}': {e}"
        ))
    })
}

fn run_tesseract(
    lt: &mut LepTess,
    png: &[u8],
    mode: PageSegmentation,
) -> Result<Vec<RecognizedWord>> {
    lt.set_variable(Variable::TesseditPagesegMode, &mode.psm().to_string())
        .map_err(|e| TextlensError::Ocr(format!("Failed to set page segmentation: {e}")))?;
    let preserve = if mode.preserve_interword_spaces() { "1" } else { "0" };
    lt.set_variable(Variable::PreserveInterwordSpaces, preserve)
        .map_err(|e| TextlensError::Ocr(format!("Failed to set interword spacing: {e}")))?;

    lt.set_image_from_mem(png)
        .map_err(|e| TextlensError::Ocr(format!("Failed to set image: {e}")))?;
    let tsv = lt
        .get_tsv_text(0)
        .map_err(|e| TextlensError::Ocr(format!("Failed to extract text: {e}")))?;
    Ok(parse_tsv(&tsv))
}

/// Keys a request language is matched against: each configured code and,
/// for several codes, the `+`-joined combination.
fn handle_keys(languages: &[String]) -> Vec<String> {
    let mut keys = languages.to_vec();
    if languages.len() > 1 {
        keys.push(languages.join("+"));
    }
    keys
}

impl TesseractEngine {
    /// Fails only when the first (default) language cannot be loaded; other
    /// configured languages that fail are skipped with a warning.
    pub fn new(data_path: Option<String>, languages: &[String]) -> Result<Self> {
        let default = languages.first().map(String::as_str).unwrap_or("eng");
        let mut handles = HashMap::new();
        handles.insert(
            default.to_string(),
            Arc::new(Mutex::new(create_tesseract(data_path.as_deref(), default)?)),
        );

        for key in handle_keys(languages) {
            if handles.contains_key(&key) {
                continue;
            }
            match create_tesseract(data_path.as_deref(), &key) {
                Ok(lt) => {
                    handles.insert(key, Arc::new(Mutex::new(lt)));
                }
                Err(e) => warn!(language = %key, error = %e, "Skipping Tesseract language"),
            }
        }

        Ok(Self { data_path, handles })
    }

    pub fn loaded_languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.handles.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(
        &self,
        image: &Image,
        language: &str,
        mode: PageSegmentation,
    ) -> Result<ExtractedText> {
        let png = image.to_png_bytes()?;
        let shared = self.handles.get(language).map(Arc::clone);
        let data_path = self.data_path.clone();

        let lang = language.to_string();
        let words = tokio::task::spawn_blocking(move || match shared {
            Some(handle) => {
                let mut lt = handle.blocking_lock();
                run_tesseract(&mut lt, &png, mode)
            }
            None => {
                let mut lt = create_tesseract(data_path.as_deref(), &lang)?;
                run_tesseract(&mut lt, &png, mode)
            }
        })
        .await
        .map_err(|e| TextlensError::Ocr(format!("OCR task panicked: {e}")))??;

        debug!(%language, words = words.len(), "Tesseract finished");

        Ok(ExtractedText::new(words_to_text(&words), language).with_words(words))
    }
}
