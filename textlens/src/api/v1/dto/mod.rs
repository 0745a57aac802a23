//! v1 API Data Transfer Objects.
//!
//! Wire types for the v1 REST API, kept apart from the pipeline models in
//! `src/models/`. Binary payloads travel as base64 inside JSON responses.

pub mod extract;
pub mod languages;
pub mod text;

pub use extract::*;
pub use languages::*;
pub use text::*;
