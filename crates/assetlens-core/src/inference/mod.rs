//! Model-based tag inference.
//!
//! The pipeline treats the model runtime as an opaque [`InferenceEngine`]:
//! named f32 tensors in, named f32 tensors out. [`OnnxEngine`] is the ONNX
//! Runtime implementation; tests substitute their own engines.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use assetlens_core::inference::{EngineOptions, ImagePreprocessor, OnnxEngine, TagInferenceEngine};
//!
//! let engine = OnnxEngine::open("models/image_model.onnx".as_ref(), EngineOptions::default())?;
//! let tagger = TagInferenceEngine::new(Arc::new(engine));
//! let tensor = ImagePreprocessor::default().to_tensor("photo.jpg".as_ref())?;
//! let tags = tagger.infer(&tensor)?; // e.g. ["Tag-0.73", "Tag-0.91"]
//! ```

pub(crate) mod onnx;
pub(crate) mod preprocess;
pub(crate) mod tagger;

pub use onnx::OnnxEngine;
pub use preprocess::{ImagePreprocessor, TensorLayout, INPUT_SIZE};
pub use tagger::{decode_tags, TagInferenceEngine, TAG_THRESHOLD};

use crate::error::EngineError;

/// Input name used when the model does not advertise one.
pub const DEFAULT_INPUT_NAME: &str = "input";

/// A named, flat f32 tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTensor {
    pub name: String,
    pub shape: Vec<i64>,
    pub data: Vec<f32>,
}

impl NamedTensor {
    /// Build a tensor, checking that `data` fills `shape` exactly.
    pub fn new(
        name: impl Into<String>,
        shape: Vec<i64>,
        data: Vec<f32>,
    ) -> Result<Self, EngineError> {
        let expected = shape
            .iter()
            .try_fold(1usize, |acc, &d| usize::try_from(d).ok().map(|d| acc * d));
        match expected {
            Some(len) if len == data.len() => Ok(Self {
                name: name.into(),
                shape,
                data,
            }),
            _ => Err(EngineError::InvalidInput(format!(
                "shape {:?} does not match {} elements",
                shape,
                data.len()
            ))),
        }
    }
}

/// Options used when opening an engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Prefer a hardware-accelerated execution provider
    pub use_gpu: bool,
}

/// An opened model that maps named input tensors to named output tensors.
///
/// Implementations must be safe to call from several workers; an engine that
/// cannot run concurrently serializes `run` internally.
pub trait InferenceEngine: Send + Sync {
    /// Name of the tensor input the model reads.
    fn input_name(&self) -> &str {
        DEFAULT_INPUT_NAME
    }

    /// Run the model. Outputs are returned in model order.
    fn run(&self, inputs: Vec<NamedTensor>) -> Result<Vec<NamedTensor>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_tensor_shape_check() {
        assert!(NamedTensor::new("input", vec![1, 3], vec![0.0; 3]).is_ok());

        let err = NamedTensor::new("input", vec![1, 3, 2], vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let err = NamedTensor::new("input", vec![-1, 3], vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
