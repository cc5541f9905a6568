//! Downloading single files into the package repository
//!
//! `http(s)` URLs go through reqwest; `file` URLs are copied, which keeps the
//! tool usable offline and in tests.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("There was a problem trying to pull down {url} from the web")]
    Http {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to pull down {url}: HTTP {status}")]
    Status { url: Url, status: reqwest::StatusCode },

    #[error("{url} is not a usable file location")]
    InvalidFileUrl { url: Url },

    #[error("Failed to write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Downloads files by URL
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    /// Create a new downloader with a custom user agent
    pub fn new(user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Fetch `url` and write it to `dest`
    pub async fn download(&self, url: &Url, dest: &Path) -> Result<(), FetchError> {
        if url.scheme() == "file" {
            let source = url
                .to_file_path()
                .map_err(|_| FetchError::InvalidFileUrl { url: url.clone() })?;
            return fs::copy(&source, dest)
                .await
                .map(|_| ())
                .map_err(|source| FetchError::Io {
                    path: dest.to_path_buf(),
                    source,
                });
        }

        let http_error = |source: reqwest::Error| FetchError::Http {
            url: url.clone(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(http_error)?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: response.status(),
            });
        }

        let bytes = response.bytes().await.map_err(http_error)?;
        fs::write(dest, &bytes).await.map_err(|source| FetchError::Io {
            path: dest.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_url_is_copied() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Config.cmake.in");
        std::fs::write(&source, "@PACKAGE_INIT@\n").unwrap();
        let dest = dir.path().join("listrevConfig.cmake.in");

        let downloader = Downloader::new("test");
        downloader
            .download(&Url::from_file_path(&source).unwrap(), &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "@PACKAGE_INIT@\n");
    }

    #[tokio::test]
    async fn test_missing_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new("test");
        let err = downloader
            .download(
                &Url::from_file_path(dir.path().join("absent")).unwrap(),
                &dir.path().join("dest"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
        assert!(!dir.path().join("dest").exists());
    }
}
