//! Template metadata descriptor (meta.json) types and loading

use crate::context::RenderContext;
use crate::error::{Error, IoContext, Result};
use crate::templates::engine::TemplateEngine;
use regex::Regex;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Descriptor file names in precedence order; the first one found wins
pub const META_JSON: &str = "meta.json";
pub const META_YAML: &str = "meta.yaml";
pub const META_YML: &str = "meta.yml";

/// Executable descriptor form, recognized only to reject it
pub const META_JS: &str = "meta.js";

/// Parsed metadata descriptor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDescriptor {
    /// Message rendered and printed after generation
    #[serde(default)]
    pub complete_message: String,

    /// Questions to ask, in declaration order
    #[serde(default)]
    pub prompts: Prompts,
}

/// Ordered prompt descriptors keyed by context field name
#[derive(Debug, Clone, Default)]
pub struct Prompts(Vec<(String, PromptDescriptor)>);

impl Prompts {
    /// Append a prompt, rejecting duplicate keys
    pub fn push(&mut self, key: impl Into<String>, prompt: PromptDescriptor) -> Result<()> {
        let key = key.into();
        if self.get(&key).is_some() {
            return Err(Error::InvalidMetadata(format!("duplicate prompt key '{}'", key)));
        }
        self.0.push((key, prompt));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&PromptDescriptor> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PromptDescriptor)> {
        self.0.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Prompts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PromptsVisitor;

        impl<'de> Visitor<'de> for PromptsVisitor {
            type Value = Prompts;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of prompt key to prompt descriptor")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Prompts, A::Error> {
                let mut seen = HashSet::new();
                let mut prompts = Vec::new();
                while let Some((key, prompt)) = map.next_entry::<String, PromptDescriptor>()? {
                    if !seen.insert(key.clone()) {
                        return Err(de::Error::custom(format!("duplicate prompt key '{}'", key)));
                    }
                    prompts.push((key, prompt));
                }
                Ok(Prompts(prompts))
            }
        }

        deserializer.deserialize_map(PromptsVisitor)
    }
}

/// One question definition
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptDescriptor {
    /// `string`, `boolean`, or a prompt kind name such as `list` or `checkbox`
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub choices: Vec<Choice>,

    #[serde(default)]
    pub default: Option<PromptDefault>,

    /// Reject empty text and empty selections
    #[serde(default)]
    pub required: bool,

    /// Regular expression a text answer must match in full
    #[serde(default, deserialize_with = "deserialize_pattern")]
    pub pattern: Option<Regex>,

    /// Message shown when `pattern` does not match
    #[serde(default)]
    pub invalid: Option<String>,
}

impl PromptDescriptor {
    /// Text shown to the user: message, then label, then the key itself
    pub fn display_message<'a>(&'a self, key: &'a str) -> &'a str {
        self.message
            .as_deref()
            .or(self.label.as_deref())
            .unwrap_or(key)
    }
}

fn deserialize_pattern<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Regex>, D::Error> {
    let pattern: Option<String> = Option::deserialize(deserializer)?;
    pattern
        .map(|p| Regex::new(&format!("^(?:{})$", p)).map_err(de::Error::custom))
        .transpose()
}

/// A selectable choice; plain strings use the same text for label and value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub name: String,
    pub value: String,
}

impl Choice {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: value.clone(),
            value,
        }
    }
}

impl<'de> Deserialize<'de> for Choice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawChoice {
            Plain(String),
            Named { name: String, value: Option<String> },
        }

        Ok(match RawChoice::deserialize(deserializer)? {
            RawChoice::Plain(value) => Choice::new(value),
            RawChoice::Named { name, value } => Choice {
                value: value.unwrap_or_else(|| name.clone()),
                name,
            },
        })
    }
}

type DefaultFn = dyn Fn(&RenderContext) -> serde_json::Value + Send + Sync;

/// Default answer of a prompt, resolved when the prompt is reached
#[derive(Clone)]
pub enum PromptDefault {
    /// Used as is
    Value(serde_json::Value),
    /// A string with `{{...}}` expressions, rendered against earlier answers
    Template(String),
    /// Computed from earlier answers (library use)
    Computed(Arc<DefaultFn>),
}

impl PromptDefault {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&RenderContext) -> serde_json::Value + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Resolve against the context as it stands at prompt time
    pub fn resolve(
        &self,
        context: &RenderContext,
        engine: &TemplateEngine,
    ) -> Result<serde_json::Value, String> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Template(template) => engine
                .render(template, context)
                .map(serde_json::Value::String),
            Self::Computed(f) => Ok(f(context)),
        }
    }
}

impl fmt::Debug for PromptDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for PromptDefault {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::String(s) if crate::templates::engine::has_placeholder(&s) => {
                Self::Template(s)
            }
            other => Self::Value(other),
        })
    }
}

/// Load the metadata descriptor from a template root
///
/// Returns the empty descriptor when the template has none.
pub async fn load_metadata(template_dir: &Path) -> Result<MetadataDescriptor> {
    match find_descriptor(template_dir).await {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading template metadata");
            let content = fs::read_to_string(&path)
                .await
                .io_context(|| format!("Failed to read {}", path.display()))?;
            parse_descriptor(&path, &content)
        }
        None if exists(&template_dir.join(META_JS)).await => Err(Error::InvalidMetadata(format!(
            "{} is not supported, describe prompts in {} or {} instead",
            META_JS, META_JSON, META_YAML
        ))),
        None => Ok(MetadataDescriptor::default()),
    }
}

async fn find_descriptor(template_dir: &Path) -> Option<PathBuf> {
    for name in [META_JSON, META_YAML, META_YML] {
        let path = template_dir.join(name);
        if exists(&path).await {
            return Some(path);
        }
    }
    None
}

async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

fn parse_descriptor(path: &Path, content: &str) -> Result<MetadataDescriptor> {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    let is_json = path.extension().is_some_and(|ext| ext == "json");

    // Sequences would otherwise fill the struct positionally
    let parsed = if is_json {
        serde_json::from_str::<serde_json::Value>(content)
            .map_err(|e| e.to_string())
            .and_then(|value| {
                if !value.is_object() {
                    return Err("descriptor must be an object".to_string());
                }
                serde_json::from_value(value).map_err(|e| e.to_string())
            })
    } else {
        serde_yaml::from_str::<serde_yaml::Value>(content)
            .map_err(|e| e.to_string())
            .and_then(|value| match value {
                // An empty file reads as null
                serde_yaml::Value::Null => Ok(MetadataDescriptor::default()),
                serde_yaml::Value::Mapping(_) => {
                    serde_yaml::from_value(value).map_err(|e| e.to_string())
                }
                _ => Err("descriptor must be an object".to_string()),
            })
    };

    parsed.map_err(|e| Error::InvalidMetadata(format!("Failed to parse {}: {}", name, e)))
}
