//! Single-file evaluation, wiring every stage together.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::color::ColorClassifier;
use crate::config::{Config, LimitsConfig};
use crate::error::{EngineError, PipelineError, PipelineResult};
use crate::inference::{ImagePreprocessor, InferenceEngine, TagInferenceEngine};
use crate::types::ImageAsset;

use super::decode::ImageDecoder;
use super::describe::DescriptionSynthesizer;
use super::metadata::MetadataExtractor;
use super::validate::Validator;

/// Turns one image file into an [`ImageAsset`].
///
/// Stages run in order: validate, metadata, decode, color scan and tensor
/// construction, tag inference, synthesis. Any stage error ends evaluation of
/// that file except metadata, which never fails.
pub struct ImageEvaluator {
    validator: Validator,
    metadata: MetadataExtractor,
    decoder: ImageDecoder,
    preprocessor: ImagePreprocessor,
    tagger: TagInferenceEngine,
    limits: LimitsConfig,
}

impl ImageEvaluator {
    /// Build an evaluator around an opened engine.
    pub fn new(config: &Config, engine: Arc<dyn InferenceEngine>) -> Self {
        Self {
            validator: Validator::new(config.limits.clone()),
            metadata: MetadataExtractor::new(config.metadata.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            preprocessor: ImagePreprocessor::new(config.inference.tensor_layout),
            tagger: TagInferenceEngine::new(engine),
            limits: config.limits.clone(),
        }
    }

    /// Evaluate the image at `path`.
    pub async fn evaluate(&self, path: &Path) -> PipelineResult<ImageAsset> {
        let start = Instant::now();
        tracing::debug!("Evaluating: {:?}", path);

        self.validator.validate(path)?;
        tracing::trace!("  Validate: {:?}", start.elapsed());

        let metadata_start = Instant::now();
        let metadata = self.metadata.extract(path);
        tracing::trace!(
            "  Metadata: {:?} ({} entries)",
            metadata_start.elapsed(),
            metadata.len()
        );

        let decode_start = Instant::now();
        let decoded = self.decoder.decode(path).await?;
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());

        // Color scan and resize are CPU-bound; run them off the async workers.
        let features_start = Instant::now();
        let preprocessor = self.preprocessor;
        let image = decoded.image;
        let (primary_colors, tensor) = tokio::task::spawn_blocking(move || {
            let colors = ColorClassifier::dominant_colors(&image);
            let tensor = preprocessor.image_to_tensor(&image);
            (colors, tensor)
        })
        .await
        .map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Task join error: {}", e),
        })?;
        tracing::trace!("  Colors + tensor: {:?}", features_start.elapsed());

        // On timeout the blocking run is left to finish on its own thread.
        let infer_start = Instant::now();
        let tagger = self.tagger.clone();
        let infer_result = timeout(
            Duration::from_millis(self.limits.infer_timeout_ms),
            tokio::task::spawn_blocking(move || tagger.infer(&tensor)),
        )
        .await;
        let tags = match infer_result {
            Ok(Ok(Ok(tags))) => tags,
            Ok(Ok(Err(source))) => {
                return Err(PipelineError::Engine {
                    path: path.to_path_buf(),
                    source,
                })
            }
            Ok(Err(e)) => {
                return Err(PipelineError::Engine {
                    path: path.to_path_buf(),
                    source: EngineError::Inference(format!("Task join error: {}", e)),
                })
            }
            Err(_) => {
                return Err(PipelineError::Timeout {
                    path: path.to_path_buf(),
                    stage: "inference".to_string(),
                    timeout_ms: self.limits.infer_timeout_ms,
                })
            }
        };
        tracing::trace!("  Inference: {:?} ({} tags)", infer_start.elapsed(), tags.len());

        let synthesis = DescriptionSynthesizer::synthesize(&tags, &metadata);

        tracing::debug!(
            "Evaluated {:?} in {:?} ({}x{}, {} tags, {} colors)",
            path,
            start.elapsed(),
            decoded.width,
            decoded.height,
            tags.len(),
            primary_colors.len()
        );

        Ok(ImageAsset {
            file_path: path.to_path_buf(),
            description: synthesis.description,
            keywords: synthesis.keywords,
            metadata,
            tags,
            width: decoded.width,
            height: decoded.height,
            format: decoded.format,
            primary_colors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PrimaryColor;
    use crate::inference::NamedTensor;
    use crate::types::ImageKind;
    use image::{Rgb, RgbImage};

    struct ScoresEngine(Vec<f32>);

    impl InferenceEngine for ScoresEngine {
        fn run(&self, _inputs: Vec<NamedTensor>) -> Result<Vec<NamedTensor>, EngineError> {
            Ok(vec![NamedTensor {
                name: "output".into(),
                shape: vec![1, self.0.len() as i64],
                data: self.0.clone(),
            }])
        }
    }

    struct BrokenEngine;

    impl InferenceEngine for BrokenEngine {
        fn run(&self, _inputs: Vec<NamedTensor>) -> Result<Vec<NamedTensor>, EngineError> {
            Err(EngineError::Inference("model exploded".into()))
        }
    }

    fn evaluator(engine: impl InferenceEngine + 'static) -> ImageEvaluator {
        ImageEvaluator::new(&Config::default(), Arc::new(engine))
    }

    #[tokio::test]
    async fn test_evaluate_builds_complete_asset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        RgbImage::from_pixel(40, 20, Rgb([250, 5, 5])).save(&path).unwrap();

        let asset = evaluator(ScoresEngine(vec![0.2, 0.75]))
            .evaluate(&path)
            .await
            .unwrap();

        assert_eq!(asset.file_path, path);
        assert_eq!((asset.width, asset.height), (40, 20));
        assert_eq!(asset.format, ImageKind::Png);
        assert_eq!(asset.tags, vec!["Tag-0.75"]);
        assert_eq!(asset.description, "This image likely contains: Tag-0.75.");
        assert_eq!(asset.keywords[0], "Tag-0.75");
        assert!(asset.keywords.contains(&"red.png".to_string()));
        assert_eq!(asset.primary_colors.into_iter().collect::<Vec<_>>(), vec![PrimaryColor::Red]);
    }

    #[tokio::test]
    async fn test_evaluate_engine_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.png");
        RgbImage::from_pixel(8, 8, Rgb([0, 0, 0])).save(&path).unwrap();

        let err = evaluator(BrokenEngine).evaluate(&path).await.unwrap_err();
        assert!(matches!(err, PipelineError::Engine { .. }));
        assert!(err.to_string().contains("model exploded"));
    }

    #[tokio::test]
    async fn test_evaluate_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F']).unwrap();

        let err = evaluator(ScoresEngine(vec![0.9]))
            .evaluate(&path)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_evaluate_missing_file() {
        let err = evaluator(ScoresEngine(vec![0.9]))
            .evaluate(Path::new("/nonexistent/gone.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }
}
