//! Image preprocessing for tag inference.
//!
//! The tagging model expects:
//! - Input size: 224×224 pixels
//! - Normalization: pixel / 255, so values lie in [0, 1]
//! - Channel order: RGB
//! - Tensor shape: [1, 3, 224, 224]
//!
//! How pixels are laid out inside that buffer is fixed by the model, see
//! [`TensorLayout`].

use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PipelineError;

/// Side length of the model input.
pub const INPUT_SIZE: usize = 224;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// Element order written into the [1, 3, 224, 224] buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// Row-major pixel traversal with R, G, B written consecutively per pixel.
    #[default]
    Interleaved,
    /// NCHW: one contiguous plane per channel.
    Planar,
}

/// Turns images into model input tensors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePreprocessor {
    layout: TensorLayout,
}

impl ImagePreprocessor {
    /// Create a preprocessor writing tensors in the given layout.
    pub fn new(layout: TensorLayout) -> Self {
        Self { layout }
    }

    /// Decode the file at `path` and build its input tensor.
    pub fn to_tensor(&self, path: &Path) -> Result<Array4<f32>, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }
        let image = image::ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot open image: {e}"),
            })?
            .decode()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(self.image_to_tensor(&image))
    }

    /// Build the input tensor for an already decoded image.
    ///
    /// Resizes to exactly 224×224 regardless of aspect ratio.
    pub fn image_to_tensor(&self, image: &DynamicImage) -> Array4<f32> {
        let resized = image.resize_exact(INPUT_SIZE as u32, INPUT_SIZE as u32, FilterType::Lanczos3);
        let rgb = resized.to_rgb8();
        let raw = rgb.as_raw();
        let plane = INPUT_SIZE * INPUT_SIZE;

        match self.layout {
            TensorLayout::Interleaved => {
                // Logical element order equals the raw RGB byte order.
                Array4::from_shape_fn((1, CHANNELS, INPUT_SIZE, INPUT_SIZE), |(_, c, y, x)| {
                    let offset = c * plane + y * INPUT_SIZE + x;
                    normalize(raw[offset])
                })
            }
            TensorLayout::Planar => {
                Array4::from_shape_fn((1, CHANNELS, INPUT_SIZE, INPUT_SIZE), |(_, c, y, x)| {
                    let offset = (y * INPUT_SIZE + x) * CHANNELS + c;
                    normalize(raw[offset])
                })
            }
        }
    }
}

fn normalize(value: u8) -> f32 {
    value as f32 / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_shape_after_downscale() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(640, 480));
        let tensor = ImagePreprocessor::default().image_to_tensor(&img);
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn test_shape_after_upscale() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(10, 7));
        let tensor = ImagePreprocessor::new(TensorLayout::Planar).image_to_tensor(&img);
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn test_normalization_range() {
        let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([255, 255, 255])));
        let tensor = ImagePreprocessor::default().image_to_tensor(&white);
        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < 1e-6));

        let black = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([0, 0, 0])));
        let tensor = ImagePreprocessor::default().image_to_tensor(&black);
        assert!(tensor.iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn test_interleaved_layout_writes_rgb_per_pixel() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(224, 224, Rgb([255, 0, 51])));
        let tensor = ImagePreprocessor::new(TensorLayout::Interleaved).image_to_tensor(&img);
        let flat: Vec<f32> = tensor.iter().copied().collect();
        assert!((flat[0] - 1.0).abs() < 1e-6);
        assert!(flat[1].abs() < 1e-6);
        assert!((flat[2] - 0.2).abs() < 1e-6);
        assert!((flat[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_planar_layout_writes_channel_planes() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(224, 224, Rgb([255, 0, 51])));
        let tensor = ImagePreprocessor::new(TensorLayout::Planar).image_to_tensor(&img);
        assert!((tensor[[0, 0, 100, 100]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 1, 100, 100]].abs() < 1e-6);
        assert!((tensor[[0, 2, 100, 100]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_to_tensor_missing_file() {
        let err = ImagePreprocessor::default()
            .to_tensor(Path::new("/nonexistent/image.png"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_to_tensor_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = ImagePreprocessor::default().to_tensor(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[test]
    fn test_to_tensor_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        RgbImage::from_pixel(32, 16, Rgb([10, 20, 30])).save(&path).unwrap();
        let tensor = ImagePreprocessor::default().to_tensor(&path).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }
}
