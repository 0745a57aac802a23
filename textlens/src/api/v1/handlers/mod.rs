pub mod extract;
pub(crate) mod health;
pub mod languages;
pub mod text;

pub use health::health_check;
