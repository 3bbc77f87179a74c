//! Error types shared by every pipeline stage

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A local template reference points at nothing
    #[error("template path {} does not exist", .0.display())]
    TemplateNotFound(PathBuf),

    /// Downloading or unpacking a remote template failed
    #[error("{0}")]
    DownloadFailed(String),

    /// The metadata descriptor could not be loaded
    #[error("{0}")]
    InvalidMetadata(String),

    /// The user interrupted an interactive prompt
    #[error("prompt aborted by user")]
    PromptAborted,

    /// An answer did not satisfy the prompt's constraints
    #[error("invalid answer for '{key}': {reason}")]
    ValidationFailed { key: String, reason: String },

    /// A template file failed to render
    #[error("[{path}] {message}")]
    Render { path: String, message: String },

    /// The completion message failed to render
    #[error("Error when rendering template complete message: {0}")]
    CompletionRender(String),

    /// The template root has no `template/` directory
    #[error("template directory {} does not exist", .0.display())]
    TemplateDirMissing(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Attach a description to an `io::Result`
pub(crate) trait IoContext<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::io(f(), e))
    }
}
