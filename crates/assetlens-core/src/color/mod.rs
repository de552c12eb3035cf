//! Dominant color classification.
//!
//! Every pixel is assigned to its nearest palette color by Euclidean distance
//! in RGB space. A color is dominant when its share of the pixels is strictly
//! greater than [`DOMINANT_SHARE`].
//!
//! The scan covers every pixel at full resolution so the threshold really
//! means "5% of all pixels". It is O(width × height × palette) and meant for
//! catalog build time.

mod palette;

pub use palette::{PrimaryColor, PALETTE, PALETTE_SIZE};

use image::DynamicImage;
use std::collections::BTreeSet;

/// Minimum pixel share (exclusive) for a color to count as dominant.
pub const DOMINANT_SHARE: f64 = 0.05;

/// Per-color pixel counts for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorHistogram {
    counts: [u64; PALETTE_SIZE],
    total: u64,
}

impl ColorHistogram {
    /// Pixels assigned to `color`.
    pub fn count(&self, color: PrimaryColor) -> u64 {
        self.counts[color.index()]
    }

    /// Total pixels scanned (width × height).
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Fraction of pixels assigned to `color`, 0.0 for an empty image.
    pub fn share(&self, color: PrimaryColor) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(color) as f64 / self.total as f64
        }
    }

    /// Colors whose count strictly exceeds `DOMINANT_SHARE * total`.
    pub fn dominant(&self) -> BTreeSet<PrimaryColor> {
        let threshold = DOMINANT_SHARE * self.total as f64;
        PALETTE
            .iter()
            .map(|(color, _)| *color)
            .filter(|color| self.count(*color) as f64 > threshold)
            .collect()
    }
}

/// Maps pixels onto the fixed palette.
pub struct ColorClassifier;

impl ColorClassifier {
    /// Nearest palette color for an RGB triple.
    ///
    /// Compares squared distances, which orders (and ties) exactly like the
    /// Euclidean distance. Only a strictly smaller distance replaces the
    /// current best, so the first palette entry wins a tie.
    pub fn nearest(rgb: [u8; 3]) -> PrimaryColor {
        let mut closest = PALETTE[0].0;
        let mut min_distance = u32::MAX;

        for (color, reference) in PALETTE.iter() {
            let distance = squared_distance(rgb, *reference);
            if distance < min_distance {
                closest = *color;
                min_distance = distance;
            }
        }

        closest
    }

    /// Count every pixel of the image by nearest palette color.
    pub fn histogram(image: &DynamicImage) -> ColorHistogram {
        let rgb = image.to_rgb8();
        let mut counts = [0u64; PALETTE_SIZE];

        for pixel in rgb.as_raw().chunks_exact(3) {
            let color = Self::nearest([pixel[0], pixel[1], pixel[2]]);
            counts[color.index()] += 1;
        }

        ColorHistogram {
            counts,
            total: u64::from(rgb.width()) * u64::from(rgb.height()),
        }
    }

    /// Palette colors covering more than 5% of the image.
    pub fn dominant_colors(image: &DynamicImage) -> BTreeSet<PrimaryColor> {
        Self::histogram(image).dominant()
    }
}

fn squared_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = i32::from(x) - i32::from(y);
            (d * d) as u32
        })
        .sum()
}
