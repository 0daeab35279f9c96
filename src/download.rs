//! Local download of generated images.

use crate::types::GenerationResult;
use std::path::{Path, PathBuf};

/// How one result download ended.
///
/// Downloads never abort the batch: a failed fetch degrades to reporting the
/// remote URL for manual retrieval, the CLI rendition of the original's
/// open-in-new-tab fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Bytes were fetched and written to this local path.
    Saved(PathBuf),
    /// The fetch failed; the remote URL is reported instead.
    Fallback {
        /// Filename the result would have been saved under.
        filename: String,
        /// Remote URL to retrieve manually.
        url: String,
        /// Why the local save was skipped.
        reason: String,
    },
}

/// Fetches generated images and writes them under their derived filenames.
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    /// Creates a downloader. Result URLs are public, so no credential is
    /// attached.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Downloads one result into `dir`.
    pub async fn download_one(&self, result: &GenerationResult, dir: &Path) -> DownloadOutcome {
        match self.fetch_and_save(result, dir).await {
            Ok(path) => DownloadOutcome::Saved(path),
            Err(reason) => {
                tracing::warn!(
                    filename = %result.filename,
                    url = %result.url,
                    %reason,
                    "download failed, reporting remote URL instead"
                );
                DownloadOutcome::Fallback {
                    filename: result.filename.clone(),
                    url: result.url.clone(),
                    reason,
                }
            }
        }
    }

    /// Downloads every result sequentially. One item's failure never stops
    /// the others, and no inter-item delay applies.
    pub async fn download_all(
        &self,
        results: &[GenerationResult],
        dir: &Path,
    ) -> Vec<DownloadOutcome> {
        let mut outcomes = Vec::with_capacity(results.len());
        for result in results {
            outcomes.push(self.download_one(result, dir).await);
        }
        outcomes
    }

    async fn fetch_and_save(
        &self,
        result: &GenerationResult,
        dir: &Path,
    ) -> std::result::Result<PathBuf, String> {
        let response = self
            .client
            .get(&result.url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }
        let bytes = response.bytes().await.map_err(|e| e.to_string())?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| e.to_string())?;
        let path = dir.join(&result.filename);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| e.to_string())?;
        Ok(path)
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(url: &str) -> GenerationResult {
        GenerationResult {
            filename: "a_generated.png".into(),
            url: url.into(),
            seed: 0,
        }
    }

    #[tokio::test]
    async fn test_invalid_url_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new();

        let outcome = downloader
            .download_one(&result("not a url"), dir.path())
            .await;

        match outcome {
            DownloadOutcome::Fallback { filename, url, .. } => {
                assert_eq!(filename, "a_generated.png");
                assert_eq!(url, "not a url");
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new();
        let results = [result("not a url"), result("also not a url")];

        let outcomes = downloader.download_all(&results, dir.path()).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, DownloadOutcome::Fallback { .. })));
    }
}
