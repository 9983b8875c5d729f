// Settings management and persistence
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::{AudioFormat, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE, DEFAULT_WAV_FILE_NAME};
use crate::error::SettingsError;

/// Format assumed for provider payloads, and output volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub sample_rate: u32,
    pub channels: u16,
    pub volume: f32, // 0.0-1.0
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            volume: 1.0,
        }
    }
}

impl AudioSettings {
    pub fn format(&self) -> AudioFormat {
        AudioFormat {
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

/// Download settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub file_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_WAV_FILE_NAME.to_string(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub version: i32, // Settings schema version for future migrations
    pub audio: AudioSettings,
    pub export: ExportSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: 1,
            audio: AudioSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

impl AppSettings {
    /// Get the settings file path
    pub fn get_settings_path(app_dir: &Path) -> PathBuf {
        app_dir.join("settings.json")
    }

    /// Load settings from file, or return defaults if file doesn't exist
    pub fn load(app_dir: &Path) -> Result<Self, SettingsError> {
        let path = Self::get_settings_path(app_dir);

        if !path.exists() {
            log::info!("No settings file found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let settings: AppSettings = serde_json::from_str(&content)?;

        log::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self, app_dir: &Path) -> Result<(), SettingsError> {
        // Ensure directory exists
        fs::create_dir_all(app_dir)?;

        let path = Self::get_settings_path(app_dir);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;

        log::debug!("Saved settings to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.audio.format(), AudioFormat::default());
        assert_eq!(settings.export.file_name, "tiktok-voiceover.wav");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load(dir.path()).unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join("nested");

        let mut settings = AppSettings::default();
        settings.audio.sample_rate = 16000;
        settings.export.file_name = "take-2.wav".to_string();
        settings.save(&app_dir).unwrap();

        assert_eq!(AppSettings::load(&app_dir).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            AppSettings::get_settings_path(dir.path()),
            r#"{ "audio": { "sample_rate": 22050 } }"#,
        )
        .unwrap();

        let settings = AppSettings::load(dir.path()).unwrap();
        assert_eq!(settings.audio.sample_rate, 22050);
        assert_eq!(settings.audio.channels, 1);
        assert_eq!(settings.export, ExportSettings::default());
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(AppSettings::get_settings_path(dir.path()), "{ not json").unwrap();
        assert!(matches!(
            AppSettings::load(dir.path()),
            Err(SettingsError::Json(_))
        ));
    }
}
