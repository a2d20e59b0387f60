//! Configuration system

use serde::{Deserialize, Serialize};

/// Configuration trait for serde-backed settings types
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file (format chosen by extension)
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file (format chosen by extension)
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Settings for the resource registry and asset scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSettings {
    /// Asset tree roots scanned for authored content
    pub asset_roots: Vec<String>,

    /// Root directory of the imported resource library
    pub library_root: String,

    /// Seconds between asset-tree re-scans
    pub scan_interval_secs: f32,

    /// Seconds between dirty-resource flushes
    pub save_interval_secs: f32,

    /// Offset between the two maintenance timers so their work never lands
    /// on the same tick
    pub maintenance_offset_secs: f32,

    /// Asset-tree path of the default shader assigned to new materials
    pub default_shader: String,
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            asset_roots: vec!["Engine/Assets".to_string(), "Assets".to_string()],
            library_root: "Library".to_string(),
            scan_interval_secs: 5.0,
            save_interval_secs: 5.0,
            maintenance_offset_secs: 2.5,
            default_shader: "Engine/Assets/Defaults/Default Shader.shader".to_string(),
        }
    }
}

impl Config for ResourceSettings {}
