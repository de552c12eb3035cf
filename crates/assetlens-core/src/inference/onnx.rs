//! ONNX Runtime session management and inference.
//!
//! Loads the tagging model from an ONNX file and runs it on preprocessed
//! image tensors.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;

use crate::error::EngineError;

use super::{EngineOptions, InferenceEngine, NamedTensor, DEFAULT_INPUT_NAME};

/// Wraps an ONNX Runtime session.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`; concurrent
/// callers are serialized around each run.
pub struct OnnxEngine {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
    model_path: PathBuf,
}

impl OnnxEngine {
    /// Open a model file and create its session.
    ///
    /// The session is closed when the engine is dropped.
    pub fn open(model_path: &Path, options: EngineOptions) -> Result<Self, EngineError> {
        if !model_path.exists() {
            return Err(EngineError::Load {
                path: model_path.to_path_buf(),
                message: "Model file not found".to_string(),
            });
        }

        let builder = Session::builder().map_err(|e| EngineError::Load {
            path: model_path.to_path_buf(),
            message: format!("Failed to create ONNX session builder: {e}"),
        })?;
        let mut builder = Self::apply_execution_providers(builder, model_path, options)?;

        tracing::info!("Loading tagging model from {:?}", model_path);
        let session = builder
            .commit_from_file(model_path)
            .map_err(|e| EngineError::Load {
                path: model_path.to_path_buf(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| DEFAULT_INPUT_NAME.to_string());

        tracing::debug!(
            "Loaded model from {:?} (input: {:?}, outputs: {:?})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            model_path: model_path.to_path_buf(),
        })
    }

    /// Path of the loaded model file.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Explicitly close the session. Equivalent to dropping the engine.
    pub fn close(self) {
        tracing::debug!("Closing model session for {:?}", self.model_path);
    }

    #[cfg(feature = "cuda")]
    fn apply_execution_providers(
        builder: ort::session::builder::SessionBuilder,
        model_path: &Path,
        options: EngineOptions,
    ) -> Result<ort::session::builder::SessionBuilder, EngineError> {
        if !options.use_gpu {
            return Ok(builder);
        }
        tracing::info!("Registering CUDA execution provider");
        builder
            .with_execution_providers([
                ort::execution_providers::CUDAExecutionProvider::default().build()
            ])
            .map_err(|e| EngineError::Load {
                path: model_path.to_path_buf(),
                message: format!("Failed to register CUDA execution provider: {e}"),
            })
    }

    #[cfg(not(feature = "cuda"))]
    fn apply_execution_providers(
        builder: ort::session::builder::SessionBuilder,
        _model_path: &Path,
        options: EngineOptions,
    ) -> Result<ort::session::builder::SessionBuilder, EngineError> {
        if options.use_gpu {
            tracing::warn!(
                "GPU inference requested but this build has no CUDA support; using CPU. \
                 Rebuild with `--features cuda` to enable it."
            );
        }
        Ok(builder)
    }
}

impl InferenceEngine for OnnxEngine {
    fn input_name(&self) -> &str {
        &self.input_name
    }

    fn run(&self, inputs: Vec<NamedTensor>) -> Result<Vec<NamedTensor>, EngineError> {
        // The tagging models take exactly one image tensor.
        let mut inputs = inputs.into_iter();
        let input = match (inputs.next(), inputs.next()) {
            (Some(input), None) => input,
            (None, _) => {
                return Err(EngineError::InvalidInput("no input tensor given".to_string()));
            }
            (Some(_), Some(_)) => {
                return Err(EngineError::InvalidInput(
                    "model accepts a single input tensor".to_string(),
                ));
            }
        };

        let input_value = Value::from_array((input.shape, input.data))
            .map_err(|e| EngineError::InvalidInput(format!("Failed to create input tensor: {e}")))?;

        let session_inputs = ort::inputs![input.name.as_str() => input_value];

        let mut session = self
            .session
            .lock()
            .map_err(|e| EngineError::Unavailable(format!("Session lock poisoned: {e}")))?;

        let outputs = session
            .run(session_inputs)
            .map_err(|e| EngineError::Inference(format!("ONNX inference failed: {e}")))?;

        let mut tensors = Vec::new();
        for (name, value) in outputs.iter() {
            let (shape, data) = value.try_extract_tensor::<f32>().map_err(|e| {
                EngineError::InvalidOutput(format!("Failed to extract output {name:?}: {e}"))
            })?;
            tensors.push(NamedTensor {
                name: name.to_string(),
                shape: shape.iter().copied().collect(),
                data: data.to_vec(),
            });
        }

        if tensors.is_empty() {
            return Err(EngineError::InvalidOutput(
                "Model produced no outputs".to_string(),
            ));
        }
        Ok(tensors)
    }
}
