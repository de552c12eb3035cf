//! Thresholded tag decoding over the engine's score vector.

use std::sync::Arc;

use ndarray::Array4;

use crate::error::EngineError;

use super::{InferenceEngine, NamedTensor};

/// Scores must be strictly greater than this to become tags.
pub const TAG_THRESHOLD: f32 = 0.5;

/// Runs the tagging model and turns its scores into tag labels.
#[derive(Clone)]
pub struct TagInferenceEngine {
    engine: Arc<dyn InferenceEngine>,
}

impl TagInferenceEngine {
    /// Wrap a shared, already opened engine.
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        Self { engine }
    }

    /// Infer tags for a preprocessed [1, 3, 224, 224] tensor.
    ///
    /// Only the first output tensor is read; it is treated as a flat score
    /// sequence regardless of its shape.
    pub fn infer(&self, tensor: &Array4<f32>) -> Result<Vec<String>, EngineError> {
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let data: Vec<f32> = tensor.iter().copied().collect();
        let input = NamedTensor::new(self.engine.input_name(), shape, data)?;

        let outputs = self.engine.run(vec![input])?;
        let scores = outputs
            .first()
            .ok_or_else(|| EngineError::InvalidOutput("Model produced no outputs".to_string()))?;

        let tags = decode_tags(&scores.data);
        tracing::trace!(
            "  {} of {} scores above threshold",
            tags.len(),
            scores.data.len()
        );
        Ok(tags)
    }
}

/// Emit `Tag-<score>` (two decimals) for every score above [`TAG_THRESHOLD`],
/// in output order.
pub fn decode_tags(scores: &[f32]) -> Vec<String> {
    scores
        .iter()
        .filter(|&&score| score > TAG_THRESHOLD)
        .map(|score| format!("Tag-{score:.2}"))
        .collect()
}
