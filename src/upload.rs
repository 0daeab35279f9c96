//! Upload of source images to fal.ai storage.

use crate::error::{sanitize_error_message, FalEditError, Result};
use crate::types::SourceImage;
use async_trait::async_trait;

/// Fixed fal.ai storage endpoint.
pub const UPLOAD_ENDPOINT: &str = "https://api.fal.ai/upload";

/// Transfers a local source image to remote storage, returning a publicly
/// fetchable URL.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Uploads one file and returns its remote URL.
    async fn upload(&self, source: &SourceImage) -> Result<String>;
}

/// HTTP client for the fal.ai upload endpoint.
pub struct UploadClient {
    client: reqwest::Client,
    api_key: String,
}

impl UploadClient {
    /// Creates a client authenticating with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Uploader for UploadClient {
    async fn upload(&self, source: &SourceImage) -> Result<String> {
        let bytes = tokio::fs::read(&source.path).await?;
        let part = reqwest::multipart::Part::bytes(bytes).file_name(source.name.clone());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(UPLOAD_ENDPOINT)
            .header("Authorization", format!("Key {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(FalEditError::Upload {
                status: status.as_u16(),
                message: sanitize_error_message(&text),
            });
        }

        let body: serde_json::Value = response.json().await?;
        let url = extract_upload_url(&body)?;
        tracing::debug!(file = %source.name, url = %url, "uploaded source image");
        Ok(url)
    }
}

/// Pulls the `url` field out of an upload response body.
fn extract_upload_url(body: &serde_json::Value) -> Result<String> {
    body.get("url")
        .and_then(|u| u.as_str())
        .map(str::to_string)
        .ok_or_else(|| FalEditError::UploadResponse("missing URL in response".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_url() {
        let body = serde_json::json!({"url": "https://fal.media/files/in.png"});
        assert_eq!(
            extract_upload_url(&body).unwrap(),
            "https://fal.media/files/in.png"
        );
    }

    #[test]
    fn test_extract_url_missing() {
        let body = serde_json::json!({"file_id": "abc"});
        let err = extract_upload_url(&body).unwrap_err();
        assert!(matches!(err, FalEditError::UploadResponse(_)));
        assert!(err.to_string().contains("missing URL in response"));
    }

    #[test]
    fn test_extract_url_wrong_type() {
        let body = serde_json::json!({"url": 42});
        assert!(extract_upload_url(&body).is_err());
    }
}
