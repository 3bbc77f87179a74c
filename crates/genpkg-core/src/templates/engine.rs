//! Handlebars wrapper used for files, prompt defaults and the completion message

use crate::context::RenderContext;
use handlebars::Handlebars;
use regex::Regex;
use std::sync::OnceLock;

/// Text template engine with HTML escaping disabled
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();

        // Generated files are source code, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        Self { handlebars }
    }

    /// Render `template` against the context, returning the engine's error message on failure
    pub fn render(&self, template: &str, context: &RenderContext) -> Result<String, String> {
        self.handlebars
            .render_template(template, context)
            .map_err(|e| e.to_string())
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// True when the text contains at least one `{{...}}` expression
pub fn has_placeholder(text: &str) -> bool {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder pattern is valid"))
        .is_match(text)
}
