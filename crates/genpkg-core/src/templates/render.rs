//! Template tree reading, rendering and writing

use crate::context::RenderContext;
use crate::error::{Error, IoContext, Result};
use crate::templates::engine::{has_placeholder, TemplateEngine};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// One file of the template tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the template source directory
    pub path: PathBuf,
    pub contents: Vec<u8>,
    /// Unix permission bits, restored on write
    pub mode: Option<u32>,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
            mode: None,
        }
    }

    /// Path with `/` separators, as shown in error messages
    pub fn display_path(&self) -> String {
        self.path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Read every file below `source`, sorted by path
pub fn read_tree(source: &Path) -> Result<Vec<FileEntry>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let context = format!("Failed to read template tree {}", source.display());
            match e.into_io_error() {
                Some(io) => Error::io(context, io),
                None => Error::io(context, std::io::Error::other("filesystem loop")),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(source).unwrap_or(path).to_path_buf();
        let contents =
            std::fs::read(path).io_context(|| format!("Failed to read {}", path.display()))?;

        files.push(FileEntry {
            path: relative,
            contents,
            mode: file_mode(&entry),
        });
    }

    Ok(files)
}

#[cfg(unix)]
fn file_mode(entry: &walkdir::DirEntry) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    entry.metadata().ok().map(|m| m.permissions().mode())
}

#[cfg(not(unix))]
fn file_mode(_entry: &walkdir::DirEntry) -> Option<u32> {
    None
}

/// Render every file containing a placeholder, in place
///
/// Files without `{{...}}` and files that are not UTF-8 are left untouched.
/// All files are processed before returning; the first failure is reported
/// with the file's path. Returns the number of files rendered.
pub fn render_files(
    files: &mut [FileEntry],
    context: &RenderContext,
    engine: &TemplateEngine,
) -> Result<usize> {
    let mut rendered = 0;

    for file in files.iter_mut() {
        let Ok(text) = std::str::from_utf8(&file.contents) else {
            tracing::debug!(path = %file.display_path(), "binary file, copying as is");
            continue;
        };

        if !has_placeholder(text) {
            continue;
        }

        let output = engine.render(text, context).map_err(|message| Error::Render {
            path: file.display_path(),
            message,
        })?;

        tracing::debug!(path = %file.display_path(), "rendered");
        file.contents = output.into_bytes();
        rendered += 1;
    }

    Ok(rendered)
}

/// Write files below `dest`, creating directories as needed
///
/// The destination is not cleaned: unrelated files stay, same-named files
/// are overwritten.
pub async fn write_tree(files: &[FileEntry], dest: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dest)
        .await
        .io_context(|| format!("Failed to create directory: {}", dest.display()))?;

    let mut written = Vec::with_capacity(files.len());

    for file in files {
        let target = dest.join(&file.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .io_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(&target, &file.contents)
            .await
            .io_context(|| format!("Failed to write file: {}", target.display()))?;

        #[cfg(unix)]
        if let Some(mode) = file.mode {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&target, std::fs::Permissions::from_mode(mode))
                .await
                .io_context(|| format!("Failed to set permissions on {}", target.display()))?;
        }

        written.push(target);
    }

    Ok(written)
}
