//! Error types for the batch editing pipeline.

use std::path::PathBuf;

/// Errors that can occur while uploading, editing, or downloading images.
#[derive(Debug, thiserror::Error)]
pub enum FalEditError {
    /// The upload endpoint returned a non-success status.
    #[error("upload failed: {status} - {message}")]
    Upload { status: u16, message: String },

    /// The upload endpoint answered successfully but the body was unusable.
    #[error("upload failed: {0}")]
    UploadResponse(String),

    /// The edit endpoint returned a non-success status.
    #[error("edit failed: {status} - {message}")]
    Edit { status: u16, message: String },

    /// The edit endpoint answered successfully but the body was unusable.
    #[error("edit failed: {0}")]
    EditResponse(String),

    /// A source file could not be decoded as an image locally.
    #[error("cannot read image dimensions of {path}: {source}")]
    DimensionRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error (e.g., reading a source file or saving a result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for batch editing operations.
pub type Result<T> = std::result::Result<T, FalEditError>;

const MAX_ERROR_LEN: usize = 300;

/// Trims and truncates a remote error body before it enters an error value.
///
/// API error responses can be arbitrarily large HTML or JSON blobs; only the
/// leading part is useful in a progress string or log line.
pub fn sanitize_error_message(text: &str) -> String {
    let text = text.trim();
    if text.len() <= MAX_ERROR_LEN {
        return text.to_string();
    }
    let mut end = MAX_ERROR_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FalEditError::Upload {
            status: 403,
            message: "Forbidden".into(),
        };
        assert_eq!(err.to_string(), "upload failed: 403 - Forbidden");

        let err = FalEditError::UploadResponse("missing URL in response".into());
        assert_eq!(err.to_string(), "upload failed: missing URL in response");

        let err = FalEditError::Edit {
            status: 422,
            message: "invalid image_size".into(),
        };
        assert_eq!(err.to_string(), "edit failed: 422 - invalid image_size");
    }

    #[test]
    fn test_sanitize_trims() {
        assert_eq!(sanitize_error_message("  oops \n"), "oops");
    }

    #[test]
    fn test_sanitize_truncates_long_body() {
        let long = "x".repeat(2000);
        let sanitized = sanitize_error_message(&long);
        assert!(sanitized.len() <= MAX_ERROR_LEN + 3);
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn test_sanitize_respects_char_boundaries() {
        let long = "é".repeat(400);
        let sanitized = sanitize_error_message(&long);
        assert!(sanitized.ends_with("..."));
    }
}
