//! Core data types for the assetlens catalog.
//!
//! These types represent the output of evaluating an image and the summary of
//! a catalog scan.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::color::PrimaryColor;

/// A searchable catalog record.
pub trait Asset {
    /// Path of the source file (the catalog key).
    fn file_path(&self) -> &Path;

    /// Human-readable description derived from the asset's tags.
    fn description(&self) -> &str;

    /// Ordered keywords used for search. May contain duplicates.
    fn keywords(&self) -> &[String];
}

/// The complete record for an evaluated image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    // === File Identification ===
    /// Path to the source file
    pub file_path: PathBuf,

    // === Derived Search Fields ===
    /// "This image likely contains: ..." sentence
    pub description: String,

    /// Tags followed by normalized metadata values
    pub keywords: Vec<String>,

    // === Metadata ===
    /// Flattened tag-name to tag-value mapping, in extraction order
    pub metadata: IndexMap<String, String>,

    // === AI-Generated Content ===
    /// Tags in model output order
    pub tags: Vec<String>,

    // === Image Properties ===
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Detected container format
    pub format: ImageKind,

    /// Palette colors covering more than 5% of the pixels
    pub primary_colors: BTreeSet<PrimaryColor>,
}

impl Asset for ImageAsset {
    fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Image container formats the decoder recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageKind {
    Jpeg,
    Png,
    Bmp,
    Gif,
    Tiff,
    WebP,
    Ico,
    Pnm,
    Avif,
    Unknown,
}

impl ImageKind {
    /// Upper-case display name ("JPEG", "PNG", ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "JPEG",
            ImageKind::Png => "PNG",
            ImageKind::Bmp => "BMP",
            ImageKind::Gif => "GIF",
            ImageKind::Tiff => "TIFF",
            ImageKind::WebP => "WEBP",
            ImageKind::Ico => "ICO",
            ImageKind::Pnm => "PNM",
            ImageKind::Avif => "AVIF",
            ImageKind::Unknown => "Unknown",
        }
    }
}

impl From<image::ImageFormat> for ImageKind {
    fn from(format: image::ImageFormat) -> Self {
        match format {
            image::ImageFormat::Jpeg => ImageKind::Jpeg,
            image::ImageFormat::Png => ImageKind::Png,
            image::ImageFormat::Bmp => ImageKind::Bmp,
            image::ImageFormat::Gif => ImageKind::Gif,
            image::ImageFormat::Tiff => ImageKind::Tiff,
            image::ImageFormat::WebP => ImageKind::WebP,
            image::ImageFormat::Ico => ImageKind::Ico,
            image::ImageFormat::Pnm => ImageKind::Pnm,
            image::ImageFormat::Avif => ImageKind::Avif,
            _ => ImageKind::Unknown,
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a file was left out of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Decode,
    Engine,
    Timeout,
    TooLarge,
    Unsupported,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureKind::NotFound => "not found",
            FailureKind::Decode => "decode",
            FailureKind::Engine => "engine",
            FailureKind::Timeout => "timeout",
            FailureKind::TooLarge => "too large",
            FailureKind::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// A file the scan skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub reason: String,
}

/// Summary of one catalog scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    /// Image files found in the directory
    pub discovered: usize,

    /// Assets added to the catalog
    pub indexed: usize,

    /// Files that failed evaluation, in discovery order
    pub skipped: Vec<SkippedFile>,

    /// Whether the scan was stopped before all files were evaluated
    pub interrupted: bool,

    /// Total scan time in seconds
    pub total_seconds: f64,
}

impl ScanReport {
    /// Number of skipped files.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Skip counts grouped by failure kind.
    pub fn skipped_by_kind(&self) -> IndexMap<FailureKind, usize> {
        let mut counts = IndexMap::new();
        for skip in &self.skipped {
            *counts.entry(skip.kind).or_insert(0) += 1;
        }
        counts
    }
}
