//! Per-file evaluation pipeline components.
//!
//! This module contains the stages one image goes through:
//! - **discovery**: Find image files in a scan root
//! - **validate**: Existence, size, and signature checks
//! - **metadata**: Flatten embedded EXIF metadata
//! - **decode**: Load and decode pixels with limits and timeout
//! - **describe**: Build description and keywords
//! - **evaluator**: Orchestrates the stages for one file

pub mod decode;
pub mod describe;
pub mod discovery;
pub mod evaluator;
pub mod metadata;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use describe::{DescriptionSynthesizer, Synthesis};
pub use discovery::FileDiscovery;
pub use evaluator::ImageEvaluator;
pub use metadata::{merge_fields, MergePolicy, MetadataEntry, MetadataExtractor};
pub use validate::Validator;
