mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::{
    bmp_bytes, init_test_logger, pipeline_with, png_bytes, sample_bitmap, FailingTranslator,
    RecordingSynthesizer, RecordingTranslator, ScriptedEngine, TaggingTranslator,
};
use textlens::error::TextlensError;
use textlens::models::{
    ExportFormat, PageSegmentation, PreprocessingOptions, ProcessingConfiguration, WarningKind,
};
use textlens::ingest::Image;
use textlens::preprocess::preprocess;

fn plain_config() -> ProcessingConfiguration {
    ProcessingConfiguration::builder()
        .language("eng")
        .preprocessing_enabled(false)
        .export_format(ExportFormat::PlainText)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_hello_world_png_exports_exact_text() {
    init_test_logger();
    let engine = ScriptedEngine::returning("HELLO WORLD");
    let pipeline = pipeline_with(engine.clone(), None, None);

    let outcome = pipeline
        .run("hello.png", png_bytes(), &plain_config())
        .await
        .unwrap();

    assert_eq!(outcome.artifact.bytes, b"HELLO WORLD".to_vec());
    assert_eq!(outcome.final_text, "HELLO WORLD");
    assert!(outcome.warnings.is_empty());
    assert_eq!(engine.calls(), 1);
    assert_eq!(engine.seen(), vec![(200, 60, "eng".to_string())]);
}

#[tokio::test]
async fn test_disguised_bmp_is_rejected_before_ocr() {
    let engine = ScriptedEngine::returning("never");
    let pipeline = pipeline_with(engine.clone(), None, None);

    let err = pipeline
        .run("scan.xyz", bmp_bytes(), &plain_config())
        .await
        .unwrap_err();

    assert!(matches!(err, TextlensError::UnsupportedImageFormat(_)));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_garbage_with_image_extension_is_rejected() {
    let engine = ScriptedEngine::returning("never");
    let pipeline = pipeline_with(engine.clone(), None, None);

    let err = pipeline
        .run("photo.png", b"definitely not an image".to_vec(), &plain_config())
        .await
        .unwrap_err();

    assert!(matches!(err, TextlensError::UnsupportedImageFormat(_)));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_no_text_detected_yields_empty_artifact() {
    let pipeline = pipeline_with(ScriptedEngine::no_text(), None, None);

    let outcome = pipeline
        .run("blank.png", png_bytes(), &plain_config())
        .await
        .unwrap();

    assert!(outcome.artifact.is_empty());
    assert_eq!(outcome.final_text, "");
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].kind, WarningKind::NoTextDetected);
}

#[tokio::test]
async fn test_translation_failure_keeps_original_text() {
    let pipeline = pipeline_with(
        ScriptedEngine::returning("Bonjour le monde"),
        Some(Arc::new(FailingTranslator)),
        None,
    );
    let config = ProcessingConfiguration::builder()
        .preprocessing_enabled(false)
        .translate_to(Some("de"))
        .build()
        .unwrap();

    let outcome = pipeline.run("note.png", png_bytes(), &config).await.unwrap();

    assert_eq!(outcome.artifact.bytes, b"Bonjour le monde".to_vec());
    assert!(outcome.translation.is_none());
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::TranslationFailed));
}

#[tokio::test]
async fn test_unconfigured_translation_is_a_warning() {
    let pipeline = pipeline_with(ScriptedEngine::returning("Hello"), None, None);
    let config = ProcessingConfiguration::builder()
        .preprocessing_enabled(false)
        .translate_to(Some("fr"))
        .build()
        .unwrap();

    let outcome = pipeline.run("note.png", png_bytes(), &config).await.unwrap();

    assert_eq!(outcome.final_text, "Hello");
    assert_eq!(outcome.warnings[0].kind, WarningKind::TranslationFailed);
}

#[tokio::test]
async fn test_translation_and_speech_use_target_language() {
    let synthesizer = Arc::new(RecordingSynthesizer::default());
    let pipeline = pipeline_with(
        ScriptedEngine::returning("Hello there"),
        Some(Arc::new(TaggingTranslator)),
        Some(synthesizer.clone()),
    );
    let config = ProcessingConfiguration::builder()
        .preprocessing_enabled(false)
        .translate_to(Some("fr"))
        .text_to_speech(true)
        .build()
        .unwrap();

    let outcome = pipeline.run("note.png", png_bytes(), &config).await.unwrap();

    let translation = outcome.translation.expect("translated");
    assert_eq!(translation.text, "[fr] Hello there");
    assert_eq!(translation.source_language, None);
    assert_eq!(outcome.artifact.bytes, b"[fr] Hello there".to_vec());
    assert!(outcome.artifact.file_name.starts_with("translated_text_fr_"));

    let audio = outcome.audio.expect("audio");
    assert_eq!(audio.language, "fr");
    assert_eq!(
        synthesizer.spoken.lock().unwrap().as_slice(),
        &[("[fr] Hello there".to_string(), "fr".to_string())]
    );
}

#[tokio::test]
async fn test_speech_without_translation_uses_ocr_language() {
    let synthesizer = Arc::new(RecordingSynthesizer::default());
    let pipeline = pipeline_with(
        ScriptedEngine::returning("Guten Tag"),
        None,
        Some(synthesizer.clone()),
    );
    let config = ProcessingConfiguration::builder()
        .language("deu")
        .preprocessing_enabled(false)
        .text_to_speech(true)
        .build()
        .unwrap();

    pipeline.run("note.png", png_bytes(), &config).await.unwrap();

    assert_eq!(synthesizer.spoken.lock().unwrap()[0].1, "de");
}

#[tokio::test]
async fn test_unavailable_speech_is_a_warning() {
    let pipeline = pipeline_with(ScriptedEngine::returning("Hello"), None, None);
    let config = ProcessingConfiguration::builder()
        .preprocessing_enabled(false)
        .text_to_speech(true)
        .build()
        .unwrap();

    let outcome = pipeline.run("note.png", png_bytes(), &config).await.unwrap();

    assert!(outcome.audio.is_none());
    assert_eq!(outcome.warnings[0].kind, WarningKind::SpeechFailed);
    assert_eq!(outcome.artifact.bytes, b"Hello".to_vec());
}

#[tokio::test]
async fn test_low_confidence_is_reported() {
    let pipeline = pipeline_with(
        ScriptedEngine::returning_with_confidence("faint text", 41.0),
        None,
        None,
    );

    let outcome = pipeline
        .run("faint.png", png_bytes(), &plain_config())
        .await
        .unwrap();

    assert_eq!(outcome.final_text, "faint text");
    assert_eq!(outcome.warnings[0].kind, WarningKind::LowConfidence);
}

const RECEIPT_TSV: &str = "\
level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
5\t1\t1\t1\t1\t1\t12\t8\t60\t18\t94.0\tCoffee
5\t1\t1\t1\t1\t2\t80\t8\t20\t18\t18.5\t|{
5\t1\t1\t1\t1\t3\t110\t8\t40\t18\t90.0\t3.50
5\t1\t1\t1\t2\t1\t12\t30\t50\t18\t59.0\tmaybe
5\t1\t1\t1\t3\t1\t12\t52\t70\t18\t86.0\tThanks
";

#[tokio::test]
async fn test_low_confidence_words_are_left_out_of_artifact() {
    let pipeline = pipeline_with(ScriptedEngine::returning_words(RECEIPT_TSV), None, None);
    let config = ProcessingConfiguration::builder()
        .preprocessing_enabled(false)
        .export_format(ExportFormat::PlainText)
        .page_segmentation(PageSegmentation::SparseText)
        .confidence_threshold(60)
        .build()
        .unwrap();

    let outcome = pipeline.run("receipt.png", png_bytes(), &config).await.unwrap();

    assert_eq!(outcome.artifact.bytes, b"Coffee 3.50\nThanks".to_vec());
    assert_eq!(outcome.extracted.discarded_words, 2);
    assert_eq!(outcome.extracted.words.len(), 3);
    assert_eq!(outcome.extracted.words[1].bbox.x, 110);

    let summary = outcome.extracted.confidence_summary().unwrap();
    assert_eq!(summary.minimum, 86.0);
    assert_eq!(summary.maximum, 94.0);

    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].kind, WarningKind::LowConfidence);
    assert!(outcome.warnings[0].message.starts_with("2 words"));
}

#[tokio::test]
async fn test_ocr_image_reports_preprocessed_dimensions() {
    let engine = ScriptedEngine::returning_words(RECEIPT_TSV);
    let pipeline = pipeline_with(engine.clone(), None, None);
    let config = ProcessingConfiguration::builder()
        .preprocessing(PreprocessingOptions {
            upscale: true,
            ..PreprocessingOptions::none()
        })
        .build()
        .unwrap();

    let outcome = pipeline.run("receipt.png", png_bytes(), &config).await.unwrap();

    assert_eq!((outcome.image.width, outcome.image.height), (200, 60));
    assert_eq!((outcome.ocr_image.width, outcome.ocr_image.height), (400, 120));
    assert_eq!(engine.seen()[0].0, outcome.ocr_image.width);
}

#[tokio::test]
async fn test_combined_ocr_language_leaves_source_to_backend() {
    let translator = Arc::new(RecordingTranslator::default());
    let pipeline = pipeline_with(
        ScriptedEngine::returning("Bonjour and hello"),
        Some(translator.clone()),
        None,
    );
    let config = ProcessingConfiguration::builder()
        .language("eng+fra")
        .preprocessing_enabled(false)
        .translate_to(Some("en"))
        .build()
        .unwrap();

    let outcome = pipeline.run("mixed.png", png_bytes(), &config).await.unwrap();

    assert_eq!(
        translator.requests.lock().unwrap().as_slice(),
        &[(None, "en".to_string())]
    );
    assert_eq!(outcome.final_text, "[en] Bonjour and hello");
    assert_eq!(outcome.translation.unwrap().source_language, None);
}

#[tokio::test]
async fn test_deterministic_engine_gives_identical_results() {
    let engine = ScriptedEngine::returning("Same input, same output.");
    let pipeline = pipeline_with(engine.clone(), None, None);
    let config = ProcessingConfiguration::default();

    let first = pipeline.run("a.png", png_bytes(), &config).await.unwrap();
    let second = pipeline.run("a.png", png_bytes(), &config).await.unwrap();

    assert_eq!(first.extracted, second.extracted);
    assert_eq!(first.artifact.bytes, second.artifact.bytes);
    assert_eq!(engine.seen()[0], engine.seen()[1]);
}

#[tokio::test]
async fn test_outcome_carries_statistics_and_structured_data() {
    let pipeline = pipeline_with(
        ScriptedEngine::returning("Mail info@example.com today."),
        None,
        None,
    );

    let outcome = pipeline
        .run("mail.png", png_bytes(), &plain_config())
        .await
        .unwrap();

    assert_eq!(outcome.structured_data.emails, vec!["info@example.com"]);
    assert_eq!(outcome.statistics.characters_with_spaces, 28);
    assert_eq!(outcome.image.format, "png");
}

#[test]
fn test_preprocessing_disabled_is_identity() {
    let image = Image::new(sample_bitmap(), image::ImageFormat::Png);
    let config = plain_config();
    assert_eq!(preprocess(image.clone(), &config), image);
}
