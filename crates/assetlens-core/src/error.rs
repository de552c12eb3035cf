//! Error types for the assetlens cataloging pipeline.
//!
//! Errors are organized by stage. Per-file errors ([`PipelineError`]) are caught
//! by the catalog scan and recorded as skips; directory-level errors
//! ([`CatalogError`]) end the scan.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::FailureKind;

/// Top-level error type for assetlens operations.
#[derive(Error, Debug)]
pub enum AssetError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Per-file pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Directory-level catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Inference engine errors outside of a single file (e.g. model loading)
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised by an inference engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The model could not be loaded into a session
    #[error("Failed to load model {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// The engine cannot serve requests (poisoned session, missing model)
    #[error("Inference engine unavailable: {0}")]
    Unavailable(String),

    /// The input tensors were rejected before inference
    #[error("Invalid engine input: {0}")]
    InvalidInput(String),

    /// The engine failed while running the model
    #[error("Inference failed: {0}")]
    Inference(String),

    /// The engine produced no usable output
    #[error("Invalid engine output: {0}")]
    InvalidOutput(String),
}

/// Pipeline processing errors for a single file, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// File not found at evaluation time
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Tag inference failed
    #[error("Inference failed for {path}: {source}")]
    Engine {
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },
}

impl PipelineError {
    /// Classify the error for the scan report.
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::FileNotFound(_) => FailureKind::NotFound,
            PipelineError::Decode { .. } => FailureKind::Decode,
            PipelineError::Engine { .. } => FailureKind::Engine,
            PipelineError::Timeout { .. } => FailureKind::Timeout,
            PipelineError::FileTooLarge { .. } | PipelineError::ImageTooLarge { .. } => {
                FailureKind::TooLarge
            }
            PipelineError::UnsupportedFormat { .. } => FailureKind::Unsupported,
        }
    }
}

/// Directory-level errors that abort a whole scan.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The scan root does not exist
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// The scan root exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The scan root could not be listed
    #[error("Cannot read directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for assetlens results.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = PipelineError::FileNotFound(PathBuf::from("a.jpg"));
        assert_eq!(err.kind(), FailureKind::NotFound);

        let err = PipelineError::Engine {
            path: PathBuf::from("a.jpg"),
            source: EngineError::Inference("shape mismatch".into()),
        };
        assert_eq!(err.kind(), FailureKind::Engine);

        let err = PipelineError::ImageTooLarge {
            path: PathBuf::from("a.jpg"),
            width: 20000,
            height: 10,
            max_dim: 10000,
        };
        assert_eq!(err.kind(), FailureKind::TooLarge);
    }

    #[test]
    fn test_engine_error_message_includes_source() {
        let err = PipelineError::Engine {
            path: PathBuf::from("/photos/a.jpg"),
            source: EngineError::Unavailable("session lock poisoned".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("/photos/a.jpg"));
        assert!(msg.contains("session lock poisoned"));
    }
}
