//! Configuration management for assetlens.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file is valid.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inference engine settings
    pub inference: InferenceConfig,

    /// Directory scan settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Metadata extraction settings
    pub metadata: MetadataConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.assetlens.assetlens/config.toml
    /// - Linux: ~/.config/assetlens/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\assetlens\config\config.toml
    ///
    /// Falls back to ~/.assetlens/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "assetlens", "assetlens")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".assetlens").join("config.toml")
            })
    }

    /// Get the resolved model path (with ~ expansion).
    pub fn model_path(&self) -> PathBuf {
        let path_str = self.inference.model_path.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::TensorLayout;
    use crate::pipeline::metadata::MergePolicy;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.processing.parallel_workers, 1);
        assert!(!config.processing.recursive);
        assert!(!config.inference.use_gpu);
        assert_eq!(config.limits.max_file_size_mb, 100);
        assert_eq!(config.inference.tensor_layout, TensorLayout::Interleaved);
        assert_eq!(config.metadata.merge_policy, MergePolicy::LastWriteWins);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[inference]"));
        assert!(toml.contains("[processing]"));
        assert!(toml.contains("tensor_layout = \"interleaved\""));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [inference]
            model_path = "/models/tagger.onnx"
            use_gpu = true
            tensor_layout = "planar"

            [metadata]
            merge_policy = "namespaced"
            "#,
        )
        .unwrap();
        assert_eq!(config.model_path(), PathBuf::from("/models/tagger.onnx"));
        assert!(config.inference.use_gpu);
        assert_eq!(config.inference.tensor_layout, TensorLayout::Planar);
        assert_eq!(config.metadata.merge_policy, MergePolicy::Namespaced);
        assert!(config.metadata.include_file_info);
        assert_eq!(config.limits.decode_timeout_ms, 5000);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = Config::from_toml("[processing\nrecursive = true").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_model_path_tilde_expansion() {
        let mut config = Config::default();
        config.inference.model_path = PathBuf::from("~/models/tagger.onnx");
        let resolved = config.model_path();
        assert!(!resolved.to_string_lossy().starts_with('~'));
        assert!(resolved.ends_with("models/tagger.onnx"));
    }
}
