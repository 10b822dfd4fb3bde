use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chart::color::{Rgb, ACCENT_PRESETS, DEFAULT_ACCENT};
use crate::error::{AnalyzerError, Result};
use crate::render::raster::{DOWNLOAD_DPI, REPORT_DPI};
use crate::state::theme::Theme;

pub const SETTINGS_EXTENSION: &str = "json";

/// User preferences, saved and loaded explicitly from the header bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub accent: Rgb,
    /// Name of the preset the accent came from, if it was not hand-picked.
    pub accent_preset: Option<String>,
    pub download_dpi: u32,
    pub report_dpi: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            accent: DEFAULT_ACCENT,
            accent_preset: Some(ACCENT_PRESETS[0].0.to_string()),
            download_dpi: DOWNLOAD_DPI,
            report_dpi: REPORT_DPI,
        }
    }
}

impl Settings {
    /// Switch to a named accent preset. Unknown names leave the accent alone.
    pub fn apply_preset(&mut self, name: &str) -> bool {
        match ACCENT_PRESETS.iter().find(|(preset, _)| *preset == name) {
            Some((preset, color)) => {
                self.accent = *color;
                self.accent_preset = Some(preset.to_string());
                true
            }
            None => false,
        }
    }

    /// Set a custom accent colour; clears the preset unless it matches one.
    pub fn set_accent(&mut self, color: Rgb) {
        self.accent = color;
        self.accent_preset = ACCENT_PRESETS
            .iter()
            .find(|(_, preset)| *preset == color)
            .map(|(name, _)| name.to_string());
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        if settings.download_dpi == 0 || settings.report_dpi == 0 {
            return Err(AnalyzerError::Settings {
                message: "DPI values must be positive".to_string(),
            });
        }
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!("Settings saved to {:?}", path);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        tracing::info!("Settings loaded from {:?}", path);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_presets() {
        let s = Settings::default();
        assert_eq!(s.accent.to_hex(), "#A3C9F9");
        assert_eq!(s.accent_preset.as_deref(), Some("Sky Blue"));
        assert_eq!(s.download_dpi, 300);
        assert_eq!(s.report_dpi, 120);
    }

    #[test]
    fn presets_and_custom_colours() {
        let mut s = Settings::default();
        assert!(s.apply_preset("Lavender"));
        assert_eq!(s.accent.to_hex(), "#D5B3FF");
        assert!(!s.apply_preset("Neon"));
        assert_eq!(s.accent_preset.as_deref(), Some("Lavender"));

        s.set_accent(Rgb::new(1, 2, 3));
        assert_eq!(s.accent_preset, None);
        s.set_accent(Rgb::new(0xD3, 0xD3, 0xD3));
        assert_eq!(s.accent_preset.as_deref(), Some("Soft Gray"));
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut s = Settings::default();
        s.theme = Theme::Dark;
        s.apply_preset("Peach");
        s.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), s);
    }

    #[test]
    fn partial_and_invalid_json() {
        let s = Settings::from_json(r##"{"accent": "#FFBCB3"}"##).unwrap();
        assert_eq!(s.accent.to_hex(), "#FFBCB3");
        assert_eq!(s.report_dpi, 120);

        assert!(matches!(
            Settings::from_json(r#"{"report_dpi": 0}"#),
            Err(AnalyzerError::Settings { .. })
        ));
        assert!(matches!(
            Settings::from_json(r#"{"accent": "blue"}"#),
            Err(AnalyzerError::Settings { .. })
        ));
    }
}
