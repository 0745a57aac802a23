mod artifact;
mod common;
mod configuration;
pub mod languages;
mod text;
mod warning;

pub use artifact::*;
pub use common::*;
pub use configuration::*;
pub use text::*;
pub use warning::*;
