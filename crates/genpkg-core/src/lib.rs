//! genpkg core - generate packages from templates
//!
//! A template is a directory holding a `template/` tree and an optional
//! `meta.json` describing questions to ask. Generating a package runs these
//! stages in order:
//!
//! 1. Resolve the template reference to a local directory, downloading
//!    remote repositories into a cache directory
//! 2. Load the metadata descriptor
//! 3. Ask every prompt, writing answers into a shared [`RenderContext`]
//! 4. Render files containing `{{...}}` expressions and write the tree
//! 5. Render the completion message
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based interactive prompter
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use genpkg_core::{Generator, Settings, TemplateFetcher, TemplateReference};
//! use genpkg_core::prompts::DefaultsPrompter;
//!
//! let fetcher = TemplateFetcher::new(&Settings::from_env("my-tool"));
//! let root = fetcher.fetch(&TemplateReference::classify("./my-template")).await?;
//! let report = Generator::new()
//!     .generate(&root, Path::new("out"), &mut DefaultsPrompter)
//!     .await?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod prompts;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::Settings;
pub use context::{ContextValue, RenderContext};
pub use error::{Error, Result};
pub use generator::{report_completion, GenerateReport, Generator};
pub use prompts::{Answer, PromptRunner, Prompter};
pub use templates::{MetadataDescriptor, TemplateFetcher, TemplateReference};
