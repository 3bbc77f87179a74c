//! Template fetching, metadata, and rendering
//!
//! This module provides:
//! - Reference classification (local path or remote repository)
//! - Template fetching into a local directory
//! - Metadata descriptor (meta.json) loading
//! - File tree rendering and writing

pub mod engine;
pub mod fetcher;
pub mod meta;
pub mod reference;
pub mod render;

pub use engine::{has_placeholder, TemplateEngine};
pub use fetcher::TemplateFetcher;
pub use meta::{load_metadata, Choice, MetadataDescriptor, PromptDefault, PromptDescriptor, Prompts};
pub use reference::{add_default_branch, is_local_path, RemoteRepo, TemplateReference};
pub use render::{read_tree, render_files, write_tree, FileEntry};
