use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::presenter::DEFAULT_PUSH_DELAY;
use crate::presenter::surface::WindowSpec;
use crate::theme::Mode;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "deckhand";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presenter: Option<PresenterConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<MotionConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// 1-based slide to open on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_slide: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_push_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced: Option<bool>,
}

pub const KEYS: &[&str] = &[
    "defaults.theme",
    "defaults.start_slide",
    "presenter.width",
    "presenter.height",
    "presenter.initial_push_delay_ms",
    "motion.reduced",
];

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `deckhand config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# deckhand configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                if Mode::from_name(value).is_none() {
                    anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'.");
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.start_slide" => {
                let slide = match value.parse::<usize>() {
                    Ok(n) if n >= 1 => n,
                    _ => anyhow::bail!(
                        "Invalid start_slide: {value}. Must be a slide number (1 or more)."
                    ),
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .start_slide = Some(slide);
            }
            "presenter.width" | "presenter.height" => {
                let size = match value.parse::<f32>() {
                    Ok(v) if v.is_finite() && v >= 200.0 => v,
                    _ => anyhow::bail!("Invalid {key}: {value}. Must be a number of at least 200."),
                };
                let presenter = self.presenter.get_or_insert_with(PresenterConfig::default);
                if key == "presenter.width" {
                    presenter.width = Some(size);
                } else {
                    presenter.height = Some(size);
                }
            }
            "presenter.initial_push_delay_ms" => {
                let Ok(ms) = value.parse::<u64>() else {
                    anyhow::bail!(
                        "Invalid initial_push_delay_ms: {value}. Must be a whole number of milliseconds."
                    );
                };
                self.presenter
                    .get_or_insert_with(PresenterConfig::default)
                    .initial_push_delay_ms = Some(ms);
            }
            "motion.reduced" => {
                let Ok(reduced) = value.parse::<bool>() else {
                    anyhow::bail!("Invalid motion.reduced: {value}. Must be 'true' or 'false'.");
                };
                self.motion.get_or_insert_with(MotionConfig::default).reduced = Some(reduced);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: {}",
                KEYS.join(", ")
            ),
        }
        Ok(())
    }

    pub fn theme(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.theme.as_deref())
    }

    pub fn start_slide(&self) -> Option<usize> {
        self.defaults.as_ref().and_then(|d| d.start_slide)
    }

    pub fn reduced_motion(&self) -> bool {
        self.motion
            .as_ref()
            .and_then(|m| m.reduced)
            .unwrap_or(false)
    }

    pub fn window_spec(&self) -> WindowSpec {
        let defaults = WindowSpec::default();
        let presenter = self.presenter.clone().unwrap_or_default();
        WindowSpec {
            width: presenter.width.unwrap_or(defaults.width),
            height: presenter.height.unwrap_or(defaults.height),
            ..defaults
        }
    }

    pub fn push_delay(&self) -> Duration {
        self.presenter
            .as_ref()
            .and_then(|p| p.initial_push_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PUSH_DELAY)
    }
}
