//! Settings management
//!
//! Stores user preferences in ~/.config/texidx/settings.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// User settings remembered between runs
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    /// Input directory of the last successful batch
    #[serde(default)]
    pub last_input_dir: String,

    /// Output directory of the last successful batch
    #[serde(default)]
    pub last_output_dir: String,

    /// Worker count (None = one per CPU thread)
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Settings {
    /// Get the config directory path (~/.config/texidx)
    fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("texidx");

        Ok(config_dir)
    }

    /// Get the settings file path
    pub fn settings_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("settings.json"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        match Self::settings_path().and_then(|p| Self::load_from(&p)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Could not load settings: {:#}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

        let settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;

        Ok(settings)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    /// Save settings to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Remember the directories and worker count of a finished batch
    pub fn remember_batch(&mut self, input: &Path, output: &Path, workers: usize) {
        self.last_input_dir = input.to_string_lossy().to_string();
        self.last_output_dir = output.to_string_lossy().to_string();
        self.workers = Some(workers);
    }

    /// Last input directory, if one was saved
    pub fn input_dir(&self) -> Option<PathBuf> {
        (!self.last_input_dir.is_empty()).then(|| PathBuf::from(&self.last_input_dir))
    }

    /// Last output directory, if one was saved
    pub fn output_dir(&self) -> Option<PathBuf> {
        (!self.last_output_dir.is_empty()).then(|| PathBuf::from(&self.last_output_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&temp.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.input_dir(), None);
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested/settings.json");

        let mut settings = Settings::default();
        settings.remember_batch(Path::new("/tex/in"), Path::new("/tex/out"), 6);
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.output_dir(), Some(PathBuf::from("/tex/out")));
        assert_eq!(loaded.workers, Some(6));
    }

    #[test]
    fn test_remember_batch_replaces_worker_count() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("settings.json");

        let mut settings = Settings {
            workers: Some(2),
            ..Default::default()
        };
        settings.remember_batch(Path::new("/a"), Path::new("/b"), 12);
        settings.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"workers\": 12"));
        assert_eq!(Settings::load_from(&path).unwrap().workers, Some(12));
    }

    #[test]
    fn test_unknown_and_missing_fields_tolerated() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, r#"{"last_input_dir": "/a", "theme": "dark"}"#).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.input_dir(), Some(PathBuf::from("/a")));
        assert_eq!(loaded.workers, None);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
