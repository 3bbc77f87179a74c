//! Package generation from a fetched template
//!
//! Runs the pipeline stages in order: metadata, template tree, prompts,
//! rendering, writing, completion message. Nothing is rolled back on failure.

use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::prompts::{PromptRunner, Prompter};
use crate::templates::engine::TemplateEngine;
use crate::templates::meta::load_metadata;
use crate::templates::render::{read_tree, render_files, write_tree};
use std::path::{Path, PathBuf};

/// Directory under the template root holding the files to generate
pub const TEMPLATE_DIR_NAME: &str = "template";

/// Indent applied to every line of the completion message
const MESSAGE_INDENT: &str = "   ";

/// Outcome of a successful generation
#[derive(Debug, Clone)]
pub struct GenerateReport {
    /// Absolute or dest-relative paths of every file written
    pub files: Vec<PathBuf>,
    /// How many files went through the template engine
    pub rendered: usize,
    /// Completion message ready to print
    pub message: Option<String>,
}

#[derive(Default)]
pub struct Generator {
    engine: TemplateEngine,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a package from `template_root` into `dest`
    pub async fn generate(
        &self,
        template_root: &Path,
        dest: &Path,
        prompter: &mut dyn Prompter,
    ) -> Result<GenerateReport> {
        self.generate_with_context(template_root, dest, RenderContext::for_destination(dest), prompter)
            .await
    }

    /// Generate with a caller-seeded context
    pub async fn generate_with_context(
        &self,
        template_root: &Path,
        dest: &Path,
        mut context: RenderContext,
        prompter: &mut dyn Prompter,
    ) -> Result<GenerateReport> {
        let meta = load_metadata(template_root).await?;

        let source = template_root.join(TEMPLATE_DIR_NAME);
        if !source.is_dir() {
            return Err(Error::TemplateDirMissing(source));
        }
        let mut files = read_tree(&source)?;
        tracing::info!(
            prompts = meta.prompts.len(),
            files = files.len(),
            "template loaded"
        );

        PromptRunner::new(&self.engine).run(&meta.prompts, &mut context, prompter)?;

        let rendered = render_files(&mut files, &context, &self.engine)?;
        let written = write_tree(&files, dest).await?;
        tracing::info!(
            written = written.len(),
            rendered,
            dest = %dest.display(),
            "package written"
        );

        let message = report_completion(&meta.complete_message, &context, &self.engine)?;

        Ok(GenerateReport {
            files: written,
            rendered,
            message,
        })
    }
}

/// Render the completion message, indenting every line
///
/// Returns `None` for an empty message.
pub fn report_completion(
    message: &str,
    context: &RenderContext,
    engine: &TemplateEngine,
) -> Result<Option<String>> {
    if message.is_empty() {
        return Ok(None);
    }

    let rendered = engine
        .render(message, context)
        .map_err(|e| Error::CompletionRender(e.trim().to_string()))?;

    let indented: Vec<String> = rendered
        .split('\n')
        .map(|line| format!("{}{}", MESSAGE_INDENT, line.trim_end_matches('\r')))
        .collect();

    Ok(Some(format!("\n{}", indented.join("\n"))))
}
