//! Monitor settings

use std::path::PathBuf;

use civ_decoder::{Band, BandPlan, DecoderConfig};
use serde::{Deserialize, Serialize};

use crate::error::MonitorError;
use crate::framer::CONTROLLER_ADDR;

/// Monitor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Decoder configuration (radio model, clock display, frequency scale)
    #[serde(default)]
    pub decoder: DecoderConfig,
    /// Band edges and default filters
    #[serde(default)]
    pub band_plan: BandPlan,
    /// Our address on the CI-V bus
    #[serde(default = "default_controller_address")]
    pub controller_address: u8,
    /// Band assumed until the first frequency report
    #[serde(default = "default_initial_band")]
    pub initial_band: Band,
    /// Print the band memory as JSON on exit
    #[serde(default)]
    pub dump_on_exit: bool,
    /// Serial port to read from; stdin hex lines when unset
    #[serde(default)]
    pub port: Option<String>,
    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

fn default_controller_address() -> u8 {
    CONTROLLER_ADDR
}

fn default_initial_band() -> Band {
    Band::Band20M
}

fn default_baud_rate() -> u32 {
    19200
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            decoder: DecoderConfig::default(),
            band_plan: BandPlan::default(),
            controller_address: default_controller_address(),
            initial_band: default_initial_band(),
            dump_on_exit: false,
            port: None,
            baud_rate: default_baud_rate(),
        }
    }
}

impl Settings {
    /// Get the XDG config directory for civ-monitor
    /// Uses $XDG_CONFIG_HOME/civ-monitor, falls back to ~/.config/civ-monitor
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("civ-monitor"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("civ-monitor"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk, defaults when missing or unreadable
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::from_json(&s).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_json(s: &str) -> Result<Self, MonitorError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<(), MonitorError> {
        let path = Self::settings_path().ok_or(MonitorError::NoConfigDir)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        Ok(())
    }
}
