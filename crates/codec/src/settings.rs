//! Codec settings
//!
//! Settings are stored as JSON. A missing file means defaults; a file that
//! fails to parse is logged and also yields defaults, so a damaged settings
//! file never blocks opening documents.

use crate::docx::{DocxError, DocxResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All codec settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CodecSettings {
    pub reading: ReadSettings,
    pub writing: WriteSettings,
}

/// Settings for the read path
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReadSettings {
    /// Width in points that percentage table widths are taken of
    pub nominal_content_width: f32,
    /// Apply table style conditions to cells
    pub apply_table_styles: bool,
    /// Replace chart placeholders with the parsed chart parts
    pub resolve_charts: bool,
    /// Read image bytes; when off images keep only their extent
    pub load_images: bool,
}

impl Default for ReadSettings {
    fn default() -> Self {
        Self {
            nominal_content_width: 468.0,
            apply_table_styles: true,
            resolve_charts: true,
            load_images: true,
        }
    }
}

/// Settings for the write path
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WriteSettings {
    /// Font family of the document defaults in styles.xml
    pub default_font: String,
    /// Font size in points of the document defaults
    pub default_font_size: f32,
    /// Write docProps/core.xml
    pub write_core_properties: bool,
    /// Deflate media entries; they are stored uncompressed otherwise
    pub compress_media: bool,
}

impl Default for WriteSettings {
    fn default() -> Self {
        Self {
            default_font: "Calibri".to_string(),
            default_font_size: 11.0,
            write_core_properties: true,
            compress_media: false,
        }
    }
}

impl CodecSettings {
    fn from_json(content: &str, path: &Path) -> Self {
        match serde_json::from_str::<CodecSettings>(content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    "Failed to parse settings file {}, using defaults: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load(path: &Path) -> DocxResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content, path))
    }

    /// Load settings without blocking the runtime
    pub async fn load_async(path: &Path) -> DocxResult<Self> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        Ok(Self::from_json(&content, path))
    }

    /// Save settings as pretty JSON, creating the parent directory
    pub fn save(&self, path: &Path) -> DocxResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DocxError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub async fn save_async(&self, path: &Path) -> DocxResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DocxError::Serialization(e.to_string()))?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = CodecSettings::default();
        assert_eq!(settings.reading.nominal_content_width, 468.0);
        assert!(settings.reading.apply_table_styles);
        assert_eq!(settings.writing.default_font, "Calibri");
        assert_eq!(settings.writing.default_font_size, 11.0);
        assert!(!settings.writing.compress_media);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = CodecSettings::load(&dir.path().join("codec.json")).unwrap();
        assert_eq!(settings, CodecSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("codec.json");

        let mut settings = CodecSettings::default();
        settings.reading.load_images = false;
        settings.writing.default_font = "Georgia".into();
        settings.save(&path).unwrap();

        assert_eq!(CodecSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("codec.json");
        std::fs::write(&path, r#"{"writing": {"compress_media": true}}"#).unwrap();

        let settings = CodecSettings::load(&path).unwrap();
        assert!(settings.writing.compress_media);
        assert_eq!(settings.writing.default_font, "Calibri");
        assert_eq!(settings.reading, ReadSettings::default());
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("codec.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(CodecSettings::load(&path).unwrap(), CodecSettings::default());
    }

    #[tokio::test]
    async fn test_async_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("codec.json");

        assert_eq!(CodecSettings::load_async(&path).await.unwrap(), CodecSettings::default());

        let mut settings = CodecSettings::default();
        settings.reading.nominal_content_width = 540.0;
        settings.save_async(&path).await.unwrap();
        assert_eq!(CodecSettings::load_async(&path).await.unwrap(), settings);
    }
}
