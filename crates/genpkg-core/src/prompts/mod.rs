//! Answer collection for template prompts
//!
//! Prompts are asked strictly in declaration order. Each answer is written
//! into the render context before the next prompt resolves its default, so
//! later defaults can build on earlier answers.

pub mod defaults;

pub use defaults::DefaultsPrompter;

use crate::context::{ContextValue, RenderContext};
use crate::error::{Error, Result};
use crate::templates::engine::TemplateEngine;
use crate::templates::meta::{Choice, PromptDescriptor, Prompts};
use regex::Regex;

/// Kind of interaction a prompt asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Input,
    Password,
    Number,
    Confirm,
    Select,
    MultiSelect,
}

impl PromptKind {
    /// Resolve a descriptor `type`, including the legacy `string`/`boolean` aliases
    pub fn from_type(kind: Option<&str>) -> Self {
        match kind.map(resolve_alias) {
            None | Some("input") => Self::Input,
            Some("password") => Self::Password,
            Some("number") => Self::Number,
            Some("confirm") => Self::Confirm,
            Some("list" | "select" | "rawlist" | "expand") => Self::Select,
            Some("checkbox" | "multiselect") => Self::MultiSelect,
            Some(other) => {
                tracing::warn!(kind = other, "unknown prompt type, asking for text");
                Self::Input
            }
        }
    }
}

/// Map the legacy type names to prompt kinds; anything else passes through
pub fn resolve_alias(kind: &str) -> &str {
    match kind {
        "string" => "input",
        "boolean" => "confirm",
        other => other,
    }
}

/// A collected answer before it is normalized into the context
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Text(String),
    Bool(bool),
    Number(serde_json::Number),
    Multi(Vec<String>),
}

impl Answer {
    /// Store the answer the way templates expect to read it
    ///
    /// Multi-select answers become a map of label to `true`, text has its
    /// double quotes backslash-escaped, everything else is kept verbatim.
    pub fn normalize(self) -> ContextValue {
        match self {
            Self::Multi(labels) => ContextValue::flags(labels),
            Self::Text(text) => ContextValue::Text(text.replace('"', "\\\"")),
            Self::Bool(b) => ContextValue::Bool(b),
            Self::Number(n) => ContextValue::Number(n),
        }
    }
}

/// Constraints an answer must satisfy before it is accepted
#[derive(Debug, Clone, Default)]
pub struct Validator {
    pub required: bool,
    pub pattern: Option<Regex>,
    pub invalid: Option<String>,
}

impl Validator {
    /// Check a text answer
    pub fn check_text(&self, text: &str) -> Result<(), String> {
        if self.required && text.trim().is_empty() {
            return Err("This field is required".to_string());
        }
        if let Some(pattern) = &self.pattern {
            if !text.is_empty() && !pattern.is_match(text) {
                return Err(self.invalid.clone().unwrap_or_else(|| {
                    format!("Value must match {}", pattern.as_str())
                }));
            }
        }
        Ok(())
    }

    /// Check a multi-select answer
    pub fn check_selection(&self, selected: &[String]) -> Result<(), String> {
        if self.required && selected.is_empty() {
            return Err("Select at least one option".to_string());
        }
        Ok(())
    }
}

/// A prompt ready to be asked: kind resolved, default evaluated
#[derive(Debug, Clone)]
pub struct Question {
    pub key: String,
    pub message: String,
    pub kind: PromptKind,
    pub choices: Vec<Choice>,
    pub default: Option<serde_json::Value>,
    pub validator: Validator,
}

impl Question {
    pub fn new(key: &str, descriptor: &PromptDescriptor, default: Option<serde_json::Value>) -> Self {
        Self {
            key: key.to_string(),
            message: descriptor.display_message(key).to_string(),
            kind: PromptKind::from_type(descriptor.kind.as_deref()),
            choices: descriptor.choices.clone(),
            default,
            validator: Validator {
                required: descriptor.required,
                pattern: descriptor.pattern.clone(),
                invalid: descriptor.invalid.clone(),
            },
        }
    }

    /// Default rendered as text (numbers and booleans are stringified)
    pub fn default_text(&self) -> Option<String> {
        match self.default.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn default_bool(&self) -> Option<bool> {
        match self.default.as_ref()? {
            serde_json::Value::Bool(b) => Some(*b),
            serde_json::Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" => Some(true),
                "false" | "no" | "n" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn default_number(&self) -> Option<serde_json::Number> {
        match self.default.as_ref()? {
            serde_json::Value::Number(n) => Some(n.clone()),
            serde_json::Value::String(s) => parse_number(s),
            _ => None,
        }
    }

    /// Default selection for a multi-select prompt, restricted to known choices
    pub fn default_selection(&self) -> Vec<String> {
        let wanted: Vec<String> = match &self.default {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(serde_json::Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        };
        self.choices
            .iter()
            .filter(|c| wanted.contains(&c.value))
            .map(|c| c.value.clone())
            .collect()
    }

    /// The default choice for a select prompt, falling back to the first choice
    pub fn default_choice(&self) -> Option<String> {
        let wanted = self.default_text();
        self.choices
            .iter()
            .find(|c| Some(&c.value) == wanted.as_ref())
            .or_else(|| self.choices.first())
            .map(|c| c.value.clone())
    }

    /// Validate an answer against this question's constraints and choices
    pub fn validate(&self, answer: &Answer) -> Result<(), String> {
        match answer {
            Answer::Text(text) => {
                if self.kind == PromptKind::Select
                    && !self.choices.iter().any(|c| &c.value == text)
                {
                    let names: Vec<&str> = self.choices.iter().map(|c| c.value.as_str()).collect();
                    return Err(format!("Choose one of: {}", names.join(", ")));
                }
                self.validator.check_text(text)
            }
            Answer::Multi(selected) => {
                if let Some(unknown) = selected
                    .iter()
                    .find(|s| !self.choices.iter().any(|c| &&c.value == s))
                {
                    return Err(format!("Unknown option: {}", unknown));
                }
                self.validator.check_selection(selected)
            }
            Answer::Bool(_) | Answer::Number(_) => Ok(()),
        }
    }

    pub(crate) fn validation_error(&self, reason: String) -> Error {
        Error::ValidationFailed {
            key: self.key.clone(),
            reason,
        }
    }
}

/// Parse an integer or floating point number
pub fn parse_number(text: &str) -> Option<serde_json::Number> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(i.into());
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
}

/// Source of answers: interactive terminal prompts, defaults, or a script in tests
pub trait Prompter {
    /// Ask one question and return an answer that passes `question.validate`
    fn ask(&mut self, question: &Question) -> Result<Answer>;
}

/// Runs every prompt of a descriptor set against one context
pub struct PromptRunner<'a> {
    engine: &'a TemplateEngine,
}

impl<'a> PromptRunner<'a> {
    pub fn new(engine: &'a TemplateEngine) -> Self {
        Self { engine }
    }

    /// Ask each prompt in order, writing every answer into `context` as it arrives
    pub fn run(
        &self,
        prompts: &Prompts,
        context: &mut RenderContext,
        prompter: &mut dyn Prompter,
    ) -> Result<()> {
        for (key, descriptor) in prompts.iter() {
            let default = descriptor
                .default
                .as_ref()
                .map(|d| d.resolve(context, self.engine))
                .transpose()
                .map_err(|e| {
                    Error::InvalidMetadata(format!("Failed to render default for '{}': {}", key, e))
                })?;

            let question = Question::new(key, descriptor, default);
            let answer = prompter.ask(&question)?;
            question
                .validate(&answer)
                .map_err(|reason| question.validation_error(reason))?;

            tracing::debug!(key, "prompt answered");
            // Overwrites any earlier value under the same key
            context.insert(key, answer.normalize());
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::templates::meta::MetadataDescriptor;
    use std::collections::VecDeque;

    /// Replays canned answers and records the questions it saw
    pub(crate) struct ScriptedPrompter {
        pub answers: VecDeque<Answer>,
        pub asked: Vec<Question>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: Vec<Answer>) -> Self {
            Self {
                answers: answers.into(),
                asked: Vec::new(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, question: &Question) -> Result<Answer> {
            self.asked.push(question.clone());
            self.answers.pop_front().ok_or(Error::PromptAborted)
        }
    }

    fn prompts(json: &str) -> Prompts {
        serde_json::from_str::<MetadataDescriptor>(json).unwrap().prompts
    }

    #[test]
    fn test_type_aliases() {
        assert_eq!(resolve_alias("string"), "input");
        assert_eq!(resolve_alias("boolean"), "confirm");
        assert_eq!(resolve_alias("checkbox"), "checkbox");
        assert_eq!(PromptKind::from_type(Some("string")), PromptKind::Input);
        assert_eq!(PromptKind::from_type(Some("boolean")), PromptKind::Confirm);
        assert_eq!(PromptKind::from_type(Some("list")), PromptKind::Select);
        assert_eq!(PromptKind::from_type(Some("checkbox")), PromptKind::MultiSelect);
        assert_eq!(PromptKind::from_type(None), PromptKind::Input);
        assert_eq!(PromptKind::from_type(Some("editor")), PromptKind::Input);
    }

    #[test]
    fn test_normalize_multi_select() {
        let value = Answer::Multi(vec!["a".to_string(), "b".to_string()]).normalize();
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            serde_json::json!({ "a": true, "b": true })
        );
    }

    #[test]
    fn test_normalize_escapes_quotes() {
        let value = Answer::Text(r#"He said "hi""#.to_string()).normalize();
        assert_eq!(value, ContextValue::Text(r#"He said \"hi\""#.to_string()));
    }

    #[test]
    fn test_normalize_keeps_other_values() {
        assert_eq!(Answer::Bool(true).normalize(), ContextValue::Bool(true));
        assert_eq!(
            Answer::Number(7.into()).normalize(),
            ContextValue::Number(7.into())
        );
    }

    #[test]
    fn test_runner_answers_in_order_with_lazy_defaults() {
        let prompts = prompts(
            r#"{ "prompts": {
                "name": { "type": "string", "default": "pkg" },
                "bin": { "type": "string", "default": "{{name}}-cli" },
                "features": { "type": "checkbox", "choices": ["a", "b", "c"] },
                "private": { "type": "boolean" }
            } }"#,
        );
        let engine = TemplateEngine::new();
        let mut context = RenderContext::new();
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text("demo".to_string()),
            Answer::Text("demo-cli".to_string()),
            Answer::Multi(vec!["a".to_string(), "c".to_string()]),
            Answer::Bool(false),
        ]);

        PromptRunner::new(&engine)
            .run(&prompts, &mut context, &mut prompter)
            .unwrap();

        let keys: Vec<&str> = prompter.asked.iter().map(|q| q.key.as_str()).collect();
        assert_eq!(keys, ["name", "bin", "features", "private"]);
        // Second default saw the first answer
        assert_eq!(prompter.asked[1].default, Some(serde_json::json!("demo-cli")));

        assert_eq!(context.get_text("name"), Some("demo"));
        assert_eq!(context.get_bool("private"), Some(false));
        let features = context.get_flags("features").unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features.get("a"), Some(&true));
        assert_eq!(features.get("c"), Some(&true));
    }

    #[test]
    fn test_multi_select_overwrites_existing_key() {
        let prompts = prompts(r#"{ "prompts": { "features": { "type": "checkbox", "choices": ["a", "b"] } } }"#);
        let engine = TemplateEngine::new();
        let mut context = RenderContext::new();
        context.insert("features", ContextValue::flags(["old"]));
        let mut prompter = ScriptedPrompter::new(vec![Answer::Multi(vec!["b".to_string()])]);

        PromptRunner::new(&engine)
            .run(&prompts, &mut context, &mut prompter)
            .unwrap();

        let features = context.get_flags("features").unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features.get("b"), Some(&true));
    }

    #[test]
    fn test_runner_rejects_invalid_answer() {
        let prompts = prompts(r#"{ "prompts": { "name": { "required": true } } }"#);
        let engine = TemplateEngine::new();
        let mut context = RenderContext::new();
        let mut prompter = ScriptedPrompter::new(vec![Answer::Text("  ".to_string())]);

        let err = PromptRunner::new(&engine)
            .run(&prompts, &mut context, &mut prompter)
            .unwrap_err();
        assert!(matches!(err, Error::ValidationFailed { ref key, .. } if key == "name"));
        assert!(context.get("name").is_none());
    }

    #[test]
    fn test_runner_propagates_abort() {
        let prompts = prompts(r#"{ "prompts": { "a": {}, "b": {} } }"#);
        let engine = TemplateEngine::new();
        let mut context = RenderContext::new();
        let mut prompter = ScriptedPrompter::new(vec![Answer::Text("x".to_string())]);

        let err = PromptRunner::new(&engine)
            .run(&prompts, &mut context, &mut prompter)
            .unwrap_err();
        assert!(matches!(err, Error::PromptAborted));
        assert_eq!(context.get_text("a"), Some("x"));
    }

    #[test]
    fn test_validate_select_choice() {
        let prompts = prompts(r#"{ "prompts": { "license": { "type": "list", "choices": ["MIT", "ISC"] } } }"#);
        let (key, descriptor) = prompts.iter().next().unwrap();
        let question = Question::new(key, descriptor, None);

        assert!(question.validate(&Answer::Text("MIT".to_string())).is_ok());
        assert_eq!(
            question.validate(&Answer::Text("GPL".to_string())).unwrap_err(),
            "Choose one of: MIT, ISC"
        );
        assert_eq!(question.default_choice(), Some("MIT".to_string()));
    }

    #[test]
    fn test_validate_pattern_message() {
        let prompts = prompts(
            r#"{ "prompts": { "name": { "pattern": "[a-z-]+", "invalid": "lowercase only" } } }"#,
        );
        let (key, descriptor) = prompts.iter().next().unwrap();
        let question = Question::new(key, descriptor, None);

        assert!(question.validate(&Answer::Text("my-pkg".to_string())).is_ok());
        assert_eq!(
            question.validate(&Answer::Text("MyPkg".to_string())).unwrap_err(),
            "lowercase only"
        );
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(42.into()));
        assert_eq!(parse_number(" 1.5 ").map(|n| n.as_f64()), Some(Some(1.5)));
        assert_eq!(parse_number("abc"), None);
    }
}
