//! Core types for the batch editing pipeline.

use crate::error::{FalEditError, Result};
use std::path::PathBuf;

/// Suffix that replaces the source file's extension in result filenames.
pub const GENERATED_SUFFIX: &str = "_generated.png";

/// A user-selected source image, held only for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Path of the local file.
    pub path: PathBuf,
    /// Display name (the file name component of `path`).
    pub name: String,
    /// Natural pixel width, decoded locally.
    pub width: u32,
    /// Natural pixel height, decoded locally.
    pub height: u32,
}

impl SourceImage {
    /// Opens a local file, reading its pixel dimensions from the header
    /// without decoding the full image.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let (width, height) =
            image::image_dimensions(&path).map_err(|source| FalEditError::DimensionRead {
                path: path.clone(),
                source,
            })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            path,
            name,
            width,
            height,
        })
    }
}

/// One successfully edited image.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GenerationResult {
    /// Local filename derived from the source file's name.
    pub filename: String,
    /// Remote URL of the generated image.
    pub url: String,
    /// Seed the service used to produce this image (0 if not reported).
    pub seed: u64,
}

/// Derives the output filename from a source file name by replacing the final
/// extension with [`GENERATED_SUFFIX`].
///
/// A name without an extension is returned unchanged, matching the original
/// front end's behavior.
pub fn derive_output_filename(source_name: &str) -> String {
    match source_name.rfind('.') {
        // Only a non-empty trailing extension is replaced.
        Some(dot) if dot + 1 < source_name.len() => {
            format!("{}{GENERATED_SUFFIX}", &source_name[..dot])
        }
        _ => source_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_replaces_final_extension() {
        assert_eq!(derive_output_filename("photo.jpg"), "photo_generated.png");
        assert_eq!(derive_output_filename("a.b.jpeg"), "a.b_generated.png");
        assert_eq!(derive_output_filename("scan.PNG"), "scan_generated.png");
    }

    #[test]
    fn test_filename_without_extension_unchanged() {
        assert_eq!(derive_output_filename("photo"), "photo");
        assert_eq!(derive_output_filename("photo."), "photo.");
    }

    #[test]
    fn test_filename_dotfiles() {
        assert_eq!(derive_output_filename(".bashrc"), "_generated.png");
        assert_eq!(derive_output_filename(".config.png"), ".config_generated.png");
    }

    #[test]
    fn test_source_image_open_reads_dimensions() {
        // Smallest valid 1x1 PNG.
        const PNG_1X1: &[u8] = &[
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
            0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78,
            0x9C, 0x62, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00,
            0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        std::fs::write(&path, PNG_1X1).unwrap();

        let source = SourceImage::open(&path).unwrap();
        assert_eq!(source.name, "dot.png");
        assert_eq!((source.width, source.height), (1, 1));
    }

    #[test]
    fn test_source_image_open_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();

        let err = SourceImage::open(&path).unwrap_err();
        assert!(matches!(err, FalEditError::DimensionRead { .. }));
    }
}
