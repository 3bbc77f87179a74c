//! Runtime settings
//!
//! Defaults can be overridden through environment variables so the cache
//! location and default branch are adjustable without a config file.

pub mod settings;

pub use settings::Settings;
