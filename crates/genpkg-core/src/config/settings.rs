//! Settings resolved from defaults and environment overrides

use std::path::PathBuf;

/// Environment variable overriding the template cache directory
pub const CACHE_DIR_ENV: &str = "GENPKG_CACHE_DIR";

/// Environment variable overriding the branch appended to bare remote references
pub const DEFAULT_BRANCH_ENV: &str = "GENPKG_DEFAULT_BRANCH";

/// Branch used when a remote reference does not name one
pub const DEFAULT_BRANCH: &str = "main";

/// Cache directory relative to the user's home
const CACHE_DIR_NAME: &str = ".genpkg/templates";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Where remote templates are downloaded to (wiped before every download)
    pub cache_dir: PathBuf,

    /// Ref appended to remote references without a `#ref` suffix
    pub default_branch: String,

    /// User agent for HTTP requests
    pub user_agent: String,
}

impl Settings {
    /// Build settings with the given user agent, applying environment overrides
    pub fn from_env(user_agent: impl Into<String>) -> Self {
        Self::from_lookup(user_agent, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(user_agent: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cache_dir = lookup(CACHE_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_cache_dir);

        let default_branch = lookup(DEFAULT_BRANCH_ENV)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        Self {
            cache_dir,
            default_branch,
            user_agent: user_agent.into(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            default_branch: DEFAULT_BRANCH.to_string(),
            user_agent: "genpkg".to_string(),
        }
    }
}

/// `$HOME/.genpkg/templates`, falling back to the working directory when no home exists
pub fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CACHE_DIR_NAME)
}
