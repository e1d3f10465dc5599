//! Configuration module
//!
//! Handles loading and saving netreplay configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::replay::{DecodeMode, DecodeOptions, Schema};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Decoding settings
    #[serde(default)]
    pub decode: DecodeConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Decoding configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Sections expected before the packet stream ("bare" or "full")
    #[serde(default)]
    pub schema: Schema,
    /// Decode packet payloads into root messages
    #[serde(default)]
    pub decode_contents: bool,
}

impl DecodeConfig {
    pub fn options(&self) -> DecodeOptions {
        DecodeOptions {
            mode: if self.decode_contents {
                DecodeMode::Decoded
            } else {
                DecodeMode::Raw
            },
            schema: self.schema,
        }
    }
}

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report format
    #[serde(default)]
    pub format: OutputFormat,
    /// Maximum packets listed by the `packets` command
    #[serde(default = "default_max_packets")]
    pub max_packets: usize,
}

fn default_max_packets() -> usize {
    100
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            max_packets: default_max_packets(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        tracing::debug!("Loading configuration from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> ConfigResult<Self> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("netreplay/config.toml")),
            Some(PathBuf::from("./netreplay.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                return Self::load(path);
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> ConfigResult<String> {
    let config = Config {
        decode: DecodeConfig {
            schema: Schema::Full,
            decode_contents: true,
        },
        output: OutputConfig {
            format: OutputFormat::Json,
            max_packets: 25,
        },
    };

    Ok(toml::to_string_pretty(&config)?)
}
