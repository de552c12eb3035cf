//! Sub-configuration structs with their defaults.

use crate::inference::TensorLayout;
use crate::output::OutputFormat;
use crate::pipeline::metadata::MergePolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Inference engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Path to the ONNX tagging model (supports `~`)
    pub model_path: PathBuf,

    /// Prefer hardware acceleration when the engine supports it
    pub use_gpu: bool,

    /// Element order the model expects inside its [1, 3, 224, 224] input
    pub tensor_layout: TensorLayout,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/image_model.onnx"),
            use_gpu: false,
            tensor_layout: TensorLayout::default(),
        }
    }
}

/// Directory scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of files evaluated concurrently (1 = strictly sequential)
    pub parallel_workers: usize,

    /// Descend into subdirectories of the scan root
    pub recursive: bool,

    /// File extensions treated as images
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 1,
            recursive: false,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "bmp".to_string(),
                "gif".to_string(),
                "tif".to_string(),
                "tiff".to_string(),
                "webp".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Inference timeout in milliseconds.
    ///
    /// A timed-out run is abandoned, not cancelled: it keeps the engine busy
    /// until it returns, so the files queued behind it wait on the same
    /// engine and may time out in turn.
    pub infer_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            infer_timeout_ms: 30000,
        }
    }
}

/// Metadata extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// How same-named tags from different directories are merged
    pub merge_policy: MergePolicy,

    /// Append file type and file system entries after the EXIF tags
    pub include_file_info: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            merge_policy: MergePolicy::LastWriteWins,
            include_file_info: true,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: OutputFormat,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
