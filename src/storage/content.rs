use crate::crawler::FetchResult;
use std::io;
use std::path::{Path, PathBuf};

/// File name used for HTML pages inside their directory
pub const INDEX_FILE: &str = "index.html";

/// Derives the on-disk location of a fetched resource
///
/// `{root}/{host}/{path segments}`, with a trailing `/` treated as the
/// containing directory, and `index.html` appended for `text/html` content.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use url::Url;
/// use sumi_mirror::storage::derive_path;
///
/// let url = Url::parse("https://example.com/docs/").unwrap();
/// let path = derive_path(Path::new("/mirror"), &url, "text/html");
/// assert_eq!(path, Path::new("/mirror/example.com/docs/index.html"));
/// ```
pub fn derive_path(root: &Path, url: &url::Url, content_type: &str) -> PathBuf {
    let mut path = root.join(url.host_str().unwrap_or_default());

    let relative = url.path().strip_prefix('/').unwrap_or(url.path());
    let relative = relative.strip_suffix('/').unwrap_or(relative);
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }

    if content_type == "text/html" {
        path.push(INDEX_FILE);
    }

    path
}

/// Persists fetched content under an optional save root
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    root: Option<PathBuf>,
}

impl ContentStore {
    /// Creates a store; `None` disables persistence
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Writes the fetched bytes to their derived path
    ///
    /// Missing parent directories are created and an existing file at the
    /// same path is overwritten. Returns the written path, or `None` when no
    /// save root is configured.
    ///
    /// A path that collides with an existing entry of the other kind (a file
    /// where a directory is needed, or vice versa) fails with an I/O error;
    /// nothing already on disk is removed to make room.
    pub async fn save(&self, result: &FetchResult) -> io::Result<Option<PathBuf>> {
        let Some(root) = &self.root else {
            return Ok(None);
        };

        let path = derive_path(root, &result.final_url, &result.content_type);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a directory", path.display()),
            ));
        }

        tokio::fs::write(&path, &result.body).await?;
        tracing::debug!("Saved {} to {}", result.final_url, path.display());
        Ok(Some(path))
    }
}
