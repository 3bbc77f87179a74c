//! Render context shared by prompts, file rendering and the completion message

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Key holding the destination directory as given by the user
pub const DEST_DIR_KEY: &str = "destDirName";

/// Key set to true when generating into the current working directory
pub const IN_PLACE_KEY: &str = "inPlace";

/// Key kept for templates written against the original escaping option
pub const NO_ESCAPE_KEY: &str = "noEscape";

/// A value stored in the render context
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    Text(String),
    Bool(bool),
    Number(serde_json::Number),
    /// Multi-select answers: every chosen label maps to `true`
    Flags(BTreeMap<String, bool>),
}

impl ContextValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_flags(&self) -> Option<&BTreeMap<String, bool>> {
        match self {
            Self::Flags(flags) => Some(flags),
            _ => None,
        }
    }

    /// Build a flags value from the chosen labels
    pub fn flags<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Flags(labels.into_iter().map(|l| (l.into(), true)).collect())
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Key-value data templates are rendered against
///
/// Seeded before prompting, written once per answer, then only read while
/// files and the completion message render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenderContext {
    values: BTreeMap<String, ContextValue>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for generating into `dest`, relative to the process working directory
    pub fn for_destination(dest: &Path) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::seeded(dest, &cwd)
    }

    /// Context for generating into `dest`, resolved against `cwd`
    pub fn seeded(dest: &Path, cwd: &Path) -> Self {
        let mut context = Self::new();
        context.insert(DEST_DIR_KEY, dest.to_string_lossy().into_owned());
        context.insert(IN_PLACE_KEY, resolve(cwd, dest) == normalize(cwd));
        context.insert(NO_ESCAPE_KEY, true);
        context
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ContextValue::as_text)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ContextValue::as_bool)
    }

    pub fn get_flags(&self, key: &str) -> Option<&BTreeMap<String, bool>> {
        self.get(key).and_then(ContextValue::as_flags)
    }

    pub fn is_in_place(&self) -> bool {
        self.get_bool(IN_PLACE_KEY).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContextValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&cwd.join(path))
    }
}

/// Lexically collapse `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_values() {
        let context = RenderContext::seeded(Path::new("out"), Path::new("/work"));
        assert_eq!(context.get_text(DEST_DIR_KEY), Some("out"));
        assert_eq!(context.get_bool(IN_PLACE_KEY), Some(false));
        assert_eq!(context.get_bool(NO_ESCAPE_KEY), Some(true));
        assert!(!context.is_in_place());
    }

    #[test]
    fn test_in_place_detection() {
        let cwd = Path::new("/work/project");
        assert!(RenderContext::seeded(Path::new("."), cwd).is_in_place());
        assert!(RenderContext::seeded(Path::new("./"), cwd).is_in_place());
        assert!(RenderContext::seeded(Path::new("/work/project"), cwd).is_in_place());
        assert!(RenderContext::seeded(Path::new("../project"), cwd).is_in_place());
        assert!(!RenderContext::seeded(Path::new("sub"), cwd).is_in_place());
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut context = RenderContext::new();
        context.insert("name", "demo");
        context.insert("private", true);
        context.insert("features", ContextValue::flags(["a", "b"]));

        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "demo",
                "private": true,
                "features": { "a": true, "b": true }
            })
        );
    }

    #[test]
    fn test_typed_accessors() {
        let mut context = RenderContext::new();
        context.insert("name", "demo");
        context.insert("features", ContextValue::flags(["x"]));

        assert_eq!(context.get_text("name"), Some("demo"));
        assert_eq!(context.get_bool("name"), None);
        assert_eq!(context.get_flags("features").unwrap().get("x"), Some(&true));
        assert_eq!(context.len(), 2);
    }
}
