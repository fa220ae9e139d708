use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::core::targets::SplitTarget;

/// Persistent user settings that are saved between sessions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Last committed aggregate split target
    pub last_target: Option<SplitTarget>,

    /// Dataset ids selected in the last rebalance
    #[serde(default)]
    pub last_selection: Vec<String>,
}

impl Settings {
    /// Get the path to the settings file inside the platform config dir
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "dataset-rebalancer")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from disk, or return defaults if the file doesn't
    /// exist or is corrupted
    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            info!("Loading settings from: {:?}", config_path);

            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
                    Ok(settings) => {
                        info!("Successfully loaded settings");
                        return settings;
                    }
                    Err(e) => {
                        warn!("Failed to parse settings file: {}. Using defaults.", e);
                    }
                },
                Err(e) => {
                    // It's normal for the file not to exist on first run
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!("Failed to read settings file: {}. Using defaults.", e);
                    } else {
                        info!("No settings file found. Using defaults.");
                    }
                }
            }
        } else {
            warn!("Could not determine config directory. Using defaults.");
        }

        Self::default()
    }

    /// Save settings to disk
    pub fn save(&self) {
        if let Some(config_path) = Self::config_path() {
            if let Some(parent) = config_path.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!("Failed to create config directory: {}", e);
                    return;
                }
            }

            match serde_json::to_string_pretty(self) {
                Ok(json) => {
                    if let Err(e) = fs::write(&config_path, json) {
                        warn!("Failed to write settings file: {}", e);
                    } else {
                        info!("Settings saved to: {:?}", config_path);
                    }
                }
                Err(e) => {
                    warn!("Failed to serialize settings: {}", e);
                }
            }
        } else {
            warn!("Could not determine config directory. Settings not saved.");
        }
    }
}
