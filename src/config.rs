//! Layout configuration
//!
//! Stored in `~/.config/dockyard/config.yaml`. Every field has a default, so
//! a partial file (or none at all) is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DockError;

/// Tunables shared by every group and tab of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Height of a group's tab strip in logical pixels
    #[serde(default = "default_tab_height")]
    pub tab_height: f32,

    /// Edge band of a directional drop target, in percent of its size
    #[serde(default = "default_drop_edge_threshold")]
    pub drop_edge_threshold: f32,

    /// Text colour forced onto the drag ghost image
    ///
    /// The ghost is detached from the tab strip, so colour inherited from
    /// there would otherwise be lost.
    #[serde(default = "default_drag_image_color")]
    pub drag_image_color: String,
}

fn default_tab_height() -> f32 {
    35.0
}

fn default_drop_edge_threshold() -> f32 {
    20.0
}

fn default_drag_image_color() -> String {
    "var(--active-group-visible-panel-color)".to_string()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tab_height: default_tab_height(),
            drop_edge_threshold: default_drop_edge_threshold(),
            drag_image_color: default_drag_image_color(),
        }
    }
}

impl LayoutConfig {
    /// Load config from the user config dir, or return defaults if absent or invalid
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, DockError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DockError::Config(format!("Failed to read config at {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            DockError::Config(format!("Failed to parse config at {}: {}", path.display(), e))
        })
    }

    /// Save config to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), DockError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DockError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| DockError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            DockError::Config(format!("Failed to write config to {}: {}", path.display(), e))
        })?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
