//! Embedded metadata extraction.
//!
//! Every EXIF field the reader finds (primary and thumbnail IFDs, all tag
//! contexts) is flattened into one ordered name → value map. Extraction never
//! fails: problems are logged and an empty map is returned.

use exif::{Context, In, Reader};
use image::ImageFormat;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::config::MetadataConfig;
use crate::types::ImageKind;

/// How tags with the same name from different directories are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Key by tag name; a later tag overwrites the value in place.
    #[default]
    LastWriteWins,
    /// Key by `"<directory> <tag>"` so nothing collides.
    Namespaced,
}

/// One raw entry before merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub directory: &'static str,
    pub name: String,
    pub value: String,
}

impl MetadataEntry {
    fn new(directory: &'static str, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            directory,
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Reads embedded metadata from image files.
pub struct MetadataExtractor {
    config: MetadataConfig,
}

impl MetadataExtractor {
    /// Create an extractor with the given settings.
    pub fn new(config: MetadataConfig) -> Self {
        Self { config }
    }

    /// Extract all metadata from the file at `path`.
    ///
    /// A file without EXIF data, or in a container that cannot carry it
    /// (BMP, GIF, ICO, ...), still reports its file entries. Any read failure
    /// yields an empty map.
    pub fn extract(&self, path: &Path) -> IndexMap<String, String> {
        let format = match Self::sniff_format(path) {
            Ok(format) => format,
            Err(e) => {
                tracing::warn!("Cannot open {:?} for metadata: {}", path, e);
                return IndexMap::new();
            }
        };

        let mut entries = if format.map_or(true, can_carry_exif) {
            match Self::read_exif(path) {
                Some(entries) => entries,
                None => return IndexMap::new(),
            }
        } else {
            tracing::debug!("No EXIF container in {:?}", path);
            Vec::new()
        };

        if self.config.include_file_info {
            entries.extend(Self::file_info(path, format));
        }
        merge_fields(entries, self.config.merge_policy)
    }

    /// Format guessed from the file contents; `None` when unrecognized.
    fn sniff_format(path: &Path) -> std::io::Result<Option<ImageFormat>> {
        let reader = image::ImageReader::open(path)?.with_guessed_format()?;
        Ok(reader.format())
    }

    /// `None` when the file or its metadata container could not be read.
    fn read_exif(path: &Path) -> Option<Vec<MetadataEntry>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Cannot open {:?} for metadata: {}", path, e);
                return None;
            }
        };
        let mut reader = BufReader::new(file);

        let exif = match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => {
                tracing::debug!("No EXIF data in {:?}", path);
                return Some(Vec::new());
            }
            Err(e) => {
                tracing::warn!("Failed to read EXIF from {:?}: {}", path, e);
                return None;
            }
        };

        let entries = exif
            .fields()
            .map(|field| {
                let value = field.display_value().to_string();
                MetadataEntry::new(
                    directory_name(field.ifd_num, field.tag.context()),
                    field.tag.to_string(),
                    value.trim_matches('"'),
                )
            })
            .collect();
        Some(entries)
    }

    /// Detected type and file system entries, in the order a metadata
    /// reader reports them after the embedded directories.
    fn file_info(path: &Path, format: Option<ImageFormat>) -> Vec<MetadataEntry> {
        let mut entries = Vec::new();

        if let Some(format) = format {
            entries.push(MetadataEntry::new(
                "File Type",
                "Detected File Type Name",
                ImageKind::from(format).as_str(),
            ));
            entries.push(MetadataEntry::new(
                "File Type",
                "Detected MIME Type",
                format.to_mime_type(),
            ));
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            entries.push(MetadataEntry::new("File", "File Name", name));
        }
        match std::fs::metadata(path) {
            Ok(meta) => entries.push(MetadataEntry::new(
                "File",
                "File Size",
                format!("{} bytes", meta.len()),
            )),
            Err(e) => tracing::warn!("Cannot stat {:?}: {}", path, e),
        }

        entries
    }
}

/// Containers the EXIF reader understands. Unrecognized content is still
/// handed to the reader, which also knows HEIF.
fn can_carry_exif(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Tiff | ImageFormat::Png | ImageFormat::WebP
    )
}

/// Flatten entries into one map according to `policy`.
///
/// Under [`MergePolicy::LastWriteWins`] a repeated name keeps the position of
/// its first occurrence and the value of its last.
pub fn merge_fields(
    entries: impl IntoIterator<Item = MetadataEntry>,
    policy: MergePolicy,
) -> IndexMap<String, String> {
    let mut merged = IndexMap::new();
    for entry in entries {
        let key = match policy {
            MergePolicy::LastWriteWins => entry.name,
            MergePolicy::Namespaced => format!("{} {}", entry.directory, entry.name),
        };
        merged.insert(key, entry.value);
    }
    merged
}

fn directory_name(ifd: In, context: Context) -> &'static str {
    if ifd == In::THUMBNAIL {
        return "Thumbnail";
    }
    match context {
        Context::Tiff => "IFD0",
        Context::Exif => "Exif SubIFD",
        Context::Gps => "GPS",
        Context::Interop => "Interoperability",
        _ => "Unknown",
    }
}
