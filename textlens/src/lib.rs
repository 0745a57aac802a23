//! Image-to-text service: image ingestion and preprocessing, OCR,
//! optional translation and text-to-speech, TXT/DOCX export and an axum
//! HTTP API with an embedded upload form.

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
pub mod speech;
pub mod translation;
