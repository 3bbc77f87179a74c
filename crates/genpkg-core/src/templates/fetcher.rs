//! Template fetching from a local directory or a remote repository archive
//!
//! Local references are used in place. Remote references are downloaded as a
//! zip archive of the repository at the requested ref and unpacked into the
//! cache directory, which is wiped before every download.

use super::reference::{RemoteRepo, TemplateReference};
use crate::config::Settings;
use crate::error::{Error, IoContext, Result};
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use url::Url;
use zip::ZipArchive;

/// Template fetcher - resolves a reference to a directory on disk
pub struct TemplateFetcher {
    cache_dir: PathBuf,
    default_branch: String,
    client: reqwest::Client,
}

impl TemplateFetcher {
    pub fn new(settings: &Settings) -> Self {
        Self {
            cache_dir: settings.cache_dir.clone(),
            default_branch: settings.default_branch.clone(),
            client: reqwest::Client::builder()
                .user_agent(settings.user_agent.as_str())
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Directory remote templates are unpacked into
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Resolve a template reference to the local template root
    pub async fn fetch(&self, reference: &TemplateReference) -> Result<PathBuf> {
        match reference {
            TemplateReference::Local(path) => Self::load_local(path).await,
            TemplateReference::Remote(reference) => self.download(reference).await,
        }
    }

    /// Check a local template exists; no copy is made
    pub async fn load_local(path: &Path) -> Result<PathBuf> {
        if fs::try_exists(path).await.unwrap_or(false) {
            tracing::debug!(path = %path.display(), "using local template");
            Ok(path.to_path_buf())
        } else {
            Err(Error::TemplateNotFound(path.to_path_buf()))
        }
    }

    /// Download a remote template into the cache directory
    pub async fn download(&self, reference: &str) -> Result<PathBuf> {
        let repo = RemoteRepo::parse(reference, &self.default_branch)?;
        let url = repo.archive_url()?;

        self.clear_cache().await?;

        let bytes = self.fetch_archive(&url).await?;
        let written = extract_archive(&bytes, &self.cache_dir)?;
        tracing::info!(
            url = %url,
            files = written,
            cache = %self.cache_dir.display(),
            "template downloaded"
        );

        Ok(self.cache_dir.clone())
    }

    /// Remove any previous download so stale files never leak into this run
    async fn clear_cache(&self) -> Result<()> {
        if fs::try_exists(&self.cache_dir).await.unwrap_or(false) {
            tracing::debug!(cache = %self.cache_dir.display(), "clearing template cache");
            fs::remove_dir_all(&self.cache_dir)
                .await
                .io_context(|| format!("Failed to clear {}", self.cache_dir.display()))?;
        }
        Ok(())
    }

    async fn fetch_archive(&self, url: &Url) -> Result<Vec<u8>> {
        tracing::debug!(url = %url, "fetching template archive");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::DownloadFailed(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::DownloadFailed(format!(
                "Failed to fetch {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::DownloadFailed(format!("Failed to read {}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}

/// Unpack a zip archive into `dest`, stripping the single top-level folder
/// that repository archives wrap their contents in. Returns the number of
/// files written.
pub fn extract_archive(zip_bytes: &[u8], dest: &Path) -> Result<usize> {
    let archive_error = |e: zip::result::ZipError| {
        Error::DownloadFailed(format!("Failed to read template archive: {}", e))
    };

    let mut archive = ZipArchive::new(Cursor::new(zip_bytes)).map_err(archive_error)?;

    let mut entries: Vec<(usize, PathBuf)> = Vec::new();
    for i in 0..archive.len() {
        let file = archive.by_index(i).map_err(archive_error)?;
        // Skip entries that would escape the destination
        match file.enclosed_name() {
            Some(name) => entries.push((i, name)),
            None => tracing::warn!(entry = file.name(), "skipping unsafe archive entry"),
        }
    }

    let prefix = common_root(entries.iter().map(|(_, path)| path.as_path()));

    std::fs::create_dir_all(dest)
        .io_context(|| format!("Failed to create {}", dest.display()))?;

    let mut written = 0;
    for (index, path) in entries {
        let relative = match &prefix {
            Some(root) => match path.strip_prefix(root) {
                Ok(rest) => rest.to_path_buf(),
                Err(_) => path,
            },
            None => path,
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let mut file = archive.by_index(index).map_err(archive_error)?;
        let target = dest.join(&relative);

        if file.is_dir() {
            std::fs::create_dir_all(&target)
                .io_context(|| format!("Failed to create directory: {}", target.display()))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .io_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .io_context(|| format!("Failed to read {} from archive", relative.display()))?;
        std::fs::write(&target, &contents)
            .io_context(|| format!("Failed to write file: {}", target.display()))?;

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&target, std::fs::Permissions::from_mode(mode & 0o777))
                .io_context(|| format!("Failed to set permissions on {}", target.display()))?;
        }

        written += 1;
    }

    Ok(written)
}

/// The first path component shared by every entry, if all entries live under
/// one folder
fn common_root<'a>(paths: impl Iterator<Item = &'a Path>) -> Option<PathBuf> {
    let mut root: Option<PathBuf> = None;
    let mut nested = false;

    for path in paths {
        let mut components = path.components();
        let first = match components.next() {
            Some(Component::Normal(first)) => PathBuf::from(first),
            _ => return None,
        };
        if components.next().is_some() {
            nested = true;
        }
        match &root {
            Some(existing) if *existing != first => return None,
            Some(_) => {}
            None => root = Some(first),
        }
    }

    if nested {
        root
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = SimpleFileOptions::default();
            for (name, contents) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(contents.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }

    #[test]
    fn test_extract_strips_repository_folder() {
        let bytes = build_zip(&[
            ("starter-main/meta.json", "{}"),
            ("starter-main/template/README.md", "# {{name}}"),
        ]);
        let dir = tempfile::tempdir().unwrap();

        let written = extract_archive(&bytes, dir.path()).unwrap();

        assert_eq!(written, 2);
        assert!(dir.path().join("meta.json").exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("template/README.md")).unwrap(),
            "# {{name}}"
        );
    }

    #[test]
    fn test_extract_keeps_flat_archives() {
        let bytes = build_zip(&[("meta.json", "{}"), ("template/a.txt", "a")]);
        let dir = tempfile::tempdir().unwrap();

        extract_archive(&bytes, dir.path()).unwrap();

        assert!(dir.path().join("meta.json").exists());
        assert!(dir.path().join("template/a.txt").exists());
    }

    #[test]
    fn test_extract_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_archive(b"not a zip", dir.path()).unwrap_err();
        assert!(matches!(err, Error::DownloadFailed(_)));
    }

    #[tokio::test]
    async fn test_load_local_missing() {
        let err = TemplateFetcher::load_local(Path::new("./does/not/exist"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(_)));
        assert_eq!(err.to_string(), "template path ./does/not/exist does not exist");
    }

    #[tokio::test]
    async fn test_fetch_local_existing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let fetcher = TemplateFetcher::new(&settings);

        let path = fetcher
            .fetch(&TemplateReference::Local(dir.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(path, dir.path());
    }

    #[tokio::test]
    async fn test_download_rejects_bad_reference_before_touching_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("cache");
        std::fs::create_dir_all(&cache_dir).unwrap();
        std::fs::write(cache_dir.join("stale.txt"), "old").unwrap();

        let settings = Settings {
            cache_dir: cache_dir.clone(),
            ..Settings::default()
        };
        let fetcher = TemplateFetcher::new(&settings);

        let err = fetcher.download("not-a-repo").await.unwrap_err();
        assert!(matches!(err, Error::DownloadFailed(_)));
        assert!(cache_dir.join("stale.txt").exists());
    }

    #[tokio::test]
    async fn test_download_clears_cache_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("cache");
        std::fs::create_dir_all(&cache_dir).unwrap();
        std::fs::write(cache_dir.join("stale.txt"), "old").unwrap();

        let settings = Settings {
            cache_dir: cache_dir.clone(),
            ..Settings::default()
        };
        let fetcher = TemplateFetcher::new(&settings);

        // Nothing listens on port 1, so the request itself fails
        let err = fetcher
            .download("direct:http://127.0.0.1:1/t.zip")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DownloadFailed(_)));
        assert!(!cache_dir.join("stale.txt").exists());
    }
}
