//! Template reference classification and remote repository parsing

use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Template reference - either a local directory or a remote repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateReference {
    Local(PathBuf),
    Remote(String),
}

impl TemplateReference {
    /// Classify a raw reference as given on the command line
    pub fn classify(reference: &str) -> Self {
        if is_local_path(reference) {
            Self::Local(PathBuf::from(reference))
        } else {
            Self::Remote(reference.to_string())
        }
    }
}

impl fmt::Display for TemplateReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(reference) => write!(f, "{}", reference),
        }
    }
}

/// A reference is local when it starts with `.` or `/`, or with a drive letter (`C:`)
pub fn is_local_path(reference: &str) -> bool {
    let bytes = reference.as_bytes();
    match bytes.first() {
        Some(b'.') | Some(b'/') => true,
        Some(c) if c.is_ascii_alphabetic() => bytes.get(1) == Some(&b':'),
        _ => false,
    }
}

/// Append `#<branch>` unless the reference already names a ref
pub fn add_default_branch(reference: &str, branch: &str) -> String {
    if reference.contains('#') {
        reference.to_string()
    } else {
        format!("{}#{}", reference, branch)
    }
}

/// Hosting provider of a remote repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    GitHub,
    GitLab,
    Bitbucket,
}

/// A parsed remote template source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRepo {
    /// `[provider:]owner/name#ref`
    Hosted {
        provider: Provider,
        owner: String,
        name: String,
        git_ref: String,
    },
    /// `direct:<url>` pointing straight at a zip archive
    Direct(Url),
}

impl RemoteRepo {
    /// Parse a remote reference, adding `default_branch` when no ref is given
    pub fn parse(reference: &str, default_branch: &str) -> Result<Self> {
        if let Some(raw_url) = reference.strip_prefix("direct:") {
            let url = Url::parse(raw_url)
                .map_err(|e| Error::DownloadFailed(format!("invalid url {}: {}", raw_url, e)))?;
            return Ok(Self::Direct(url));
        }

        let with_ref = add_default_branch(reference, default_branch);
        let (repo, git_ref) = with_ref
            .split_once('#')
            .unwrap_or((with_ref.as_str(), default_branch));

        let (provider, path) = if let Some(rest) = repo.strip_prefix("github:") {
            (Provider::GitHub, rest)
        } else if let Some(rest) = repo.strip_prefix("gitlab:") {
            (Provider::GitLab, rest)
        } else if let Some(rest) = repo.strip_prefix("bitbucket:") {
            (Provider::Bitbucket, rest)
        } else {
            (Provider::GitHub, repo)
        };

        let invalid = || {
            Error::DownloadFailed(format!(
                "invalid repository reference '{}', expected [provider:]owner/name[#ref]",
                reference
            ))
        };

        let (owner, name) = path.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') || git_ref.is_empty() {
            return Err(invalid());
        }

        Ok(Self::Hosted {
            provider,
            owner: owner.to_string(),
            name: name.to_string(),
            git_ref: git_ref.to_string(),
        })
    }

    /// URL of the zip archive holding the repository contents at the ref
    pub fn archive_url(&self) -> Result<Url> {
        let raw = match self {
            Self::Direct(url) => return Ok(url.clone()),
            Self::Hosted {
                provider: Provider::GitHub,
                owner,
                name,
                git_ref,
            } => format!("https://github.com/{}/{}/archive/{}.zip", owner, name, git_ref),
            Self::Hosted {
                provider: Provider::GitLab,
                owner,
                name,
                git_ref,
            } => format!(
                "https://gitlab.com/{}/{}/-/archive/{}/{}-{}.zip",
                owner,
                name,
                git_ref,
                name,
                git_ref.replace('/', "-")
            ),
            Self::Hosted {
                provider: Provider::Bitbucket,
                owner,
                name,
                git_ref,
            } => format!("https://bitbucket.org/{}/{}/get/{}.zip", owner, name, git_ref),
        };

        Url::parse(&raw).map_err(|e| Error::DownloadFailed(format!("invalid url {}: {}", raw, e)))
    }
}
