//! Persistent cache of the user's last-used settings.
//!
//! Mirrors the single-record key-value cache of the original front end: one
//! JSON file under a fixed name, written wholesale on save, removed wholesale
//! on clear. Loading fails soft so a missing or corrupt cache never blocks
//! startup.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the cached settings record.
pub const CACHE_FILE: &str = "fal-editor-cache.json";

/// User settings for a batch run.
///
/// All fields default to empty; an empty `lora` means no style adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// fal.ai API key, passed through as `Authorization: Key <apiKey>`.
    pub api_key: String,
    /// Edit prompt applied to every image in the batch.
    pub prompt: String,
    /// Optional LoRA reference (URL or path), applied at scale 1.
    pub lora: String,
}

impl Settings {
    /// Returns true if a LoRA reference is set.
    pub fn has_lora(&self) -> bool {
        !self.lora.is_empty()
    }
}

/// Reads and writes the settings record at a fixed location.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store at the platform config directory
    /// (`<config>/faledit/fal-editor-cache.json`).
    pub fn new() -> Self {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("faledit");
        path.push(CACHE_FILE);
        Self { path }
    }

    /// Creates a store backed by an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cached settings, or defaults if the record is missing or
    /// unparseable.
    pub fn load(&self) -> Settings {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return Settings::default();
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "ignoring unparseable settings cache: {e}");
                Settings::default()
            }
        }
    }

    /// Replaces the cached record with `settings`.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Removes the cached record. Clearing an already-empty cache is not an
    /// error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::at(dir.path().join(CACHE_FILE))
    }

    fn sample() -> Settings {
        Settings {
            api_key: "key-123".into(),
            prompt: "make it watercolor".into(),
            lora: "https://example.com/lora.safetensors".into(),
        }
    }

    #[test]
    fn test_load_missing_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).load(), Settings::default());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), sample());
    }

    #[test]
    fn test_save_clear_load_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&sample()).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_clear_when_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).clear().is_ok());
    }

    #[test]
    fn test_load_unparseable_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "not json {").unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_wire_format_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("apiKey").is_some());
        assert!(json.get("prompt").is_some());
        assert!(json.get("lora").is_some());
    }

    #[test]
    fn test_partial_record_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"apiKey": "k"}"#).unwrap();
        assert_eq!(settings.api_key, "k");
        assert_eq!(settings.prompt, "");
        assert_eq!(settings.lora, "");
    }

    #[test]
    fn test_has_lora() {
        assert!(!Settings::default().has_lora());
        assert!(sample().has_lora());
    }
}
