//! Configuration file management.
//!
//! Loads application configuration from a TOML file in the user's config
//! directory. A missing file means defaults; a malformed file is an error.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio input configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for the system default device
    /// - numeric index (0, 1, 2, etc.) from `wavetap list-devices`
    /// - device name from `wavetap list-devices`
    #[serde(default = "default_device")]
    pub device: String,
}

fn default_device() -> String {
    "default".to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
        }
    }
}

/// Waveform pipeline and canvas configuration. Fixed at startup, not
/// runtime-mutable.
#[derive(Debug, Serialize, Deserialize)]
pub struct WaveformConfig {
    /// Keep every Nth captured sample (must be >= 1)
    #[serde(default = "default_downsample_factor")]
    pub downsample_factor: usize,
    /// Most recent samples shown in the scrolling window (must be >= 1)
    #[serde(default = "default_max_visible_samples")]
    pub max_visible_samples: usize,
    /// Logical canvas width the waveform is projected onto
    #[serde(default = "default_canvas_width")]
    pub canvas_width: f64,
    /// Logical canvas height
    #[serde(default = "default_canvas_height")]
    pub canvas_height: f64,
}

fn default_downsample_factor() -> usize {
    50
}

fn default_max_visible_samples() -> usize {
    5000
}

fn default_canvas_width() -> f64 {
    800.0
}

fn default_canvas_height() -> f64 {
    300.0
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            downsample_factor: default_downsample_factor(),
            max_visible_samples: default_max_visible_samples(),
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WavetapConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub waveform: WaveformConfig,
}

impl WavetapConfig {
    /// Loads configuration from the user's config directory, falling back
    /// to defaults when no file exists.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the file exists but cannot be read or parsed
    /// - If a constant fails validation
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;
        let config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            tracing::debug!("No config file, using defaults");
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects constants the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.waveform.downsample_factor < 1 {
            return Err(anyhow!("waveform.downsample_factor must be >= 1"));
        }
        if self.waveform.max_visible_samples < 1 {
            return Err(anyhow!("waveform.max_visible_samples must be >= 1"));
        }
        if self.waveform.canvas_width <= 0.0 || self.waveform.canvas_height <= 0.0 {
            return Err(anyhow!("waveform canvas dimensions must be positive"));
        }
        Ok(())
    }
}

/// Path of the config file, creating its directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    let config_dir = home.join(".config").join("wavetap");
    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("wavetap.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_expected_values() {
        let config = WavetapConfig::default();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.waveform.downsample_factor, 50);
        assert_eq!(config.waveform.max_visible_samples, 5000);
        assert_eq!(config.waveform.canvas_width, 800.0);
        assert_eq!(config.waveform.canvas_height, 300.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: WavetapConfig = toml::from_str(
            r#"
            [waveform]
            downsample_factor = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.waveform.downsample_factor, 10);
        assert_eq!(config.waveform.max_visible_samples, 5000);
        assert_eq!(config.audio.device, "default");
    }

    #[test]
    fn zero_constants_are_rejected() {
        let config: WavetapConfig = toml::from_str(
            r#"
            [waveform]
            downsample_factor = 0
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config: WavetapConfig = toml::from_str(
            r#"
            [waveform]
            max_visible_samples = 0
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
