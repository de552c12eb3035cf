//! assetlens core - embeddable image asset evaluation and cataloging.
//!
//! assetlens scans a directory of images and builds a searchable in-memory
//! catalog. Each image goes through a fixed pipeline:
//!
//! ```text
//! File → Validate → Metadata → Decode → Dominant colors + Tensor → Tags → Keywords/Description
//! ```
//!
//! Tags come from a pre-trained model behind the [`InferenceEngine`] trait;
//! [`OnnxEngine`] runs ONNX models through ONNX Runtime.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use assetlens_core::{AssetCatalog, Config, EngineOptions, ImageEvaluator, OnnxEngine};
//!
//! #[tokio::main]
//! async fn main() -> assetlens_core::Result<()> {
//!     let config = Config::load()?;
//!     let engine = OnnxEngine::open(&config.model_path(), EngineOptions::default())?;
//!     let evaluator = ImageEvaluator::new(&config, Arc::new(engine));
//!
//!     let mut catalog = AssetCatalog::new(evaluator, &config);
//!     let report = catalog.scan("./assets".as_ref()).await?;
//!     println!("Indexed {} images", report.indexed);
//!
//!     for asset in catalog.search("canon") {
//!         println!("- {}: {}", asset.file_path.display(), asset.description);
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod catalog;
pub mod color;
pub mod config;
pub mod error;
pub mod inference;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use catalog::{AssetCatalog, ScanEvent, StopSignal};
pub use color::{ColorClassifier, ColorHistogram, PrimaryColor};
pub use config::Config;
pub use error::{
    AssetError, CatalogError, ConfigError, EngineError, PipelineError, PipelineResult, Result,
};
pub use inference::{
    EngineOptions, ImagePreprocessor, InferenceEngine, NamedTensor, OnnxEngine,
    TagInferenceEngine, TensorLayout,
};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{DescriptionSynthesizer, ImageEvaluator, MergePolicy, MetadataExtractor};
pub use types::{Asset, FailureKind, ImageAsset, ImageKind, ScanReport, SkippedFile};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
