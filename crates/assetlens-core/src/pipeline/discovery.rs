//! File discovery for finding images in a scan root.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::CatalogError;

/// Discovers image files in directories.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Discover all supported image files in `root`, sorted by path.
    ///
    /// Only files directly inside `root` are considered unless the
    /// configuration enables recursion. Errors on individual entries below
    /// the root are logged and skipped.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, CatalogError> {
        let meta = std::fs::metadata(root).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CatalogError::DirectoryNotFound(root.to_path_buf())
            } else {
                CatalogError::DirectoryUnreadable {
                    path: root.to_path_buf(),
                    source: e,
                }
            }
        })?;
        if !meta.is_dir() {
            return Err(CatalogError::NotADirectory(root.to_path_buf()));
        }
        // Surface permission problems on the root itself instead of an empty scan.
        std::fs::read_dir(root).map_err(|e| CatalogError::DirectoryUnreadable {
            path: root.to_path_buf(),
            source: e,
        })?;

        let mut walker = WalkDir::new(root).follow_links(true).min_depth(1);
        if !self.config.recursive {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        for entry in walker.into_iter() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let entry_path = entry.path();
            if entry_path.is_file() && self.is_supported(entry_path) {
                files.push(entry_path.to_path_buf());
            }
        }

        // Sort by path for deterministic ordering
        files.sort();
        Ok(files)
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.to_lowercase() == ext_lower)
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_is_supported() {
        let discovery = FileDiscovery::new(ProcessingConfig::default());

        assert!(discovery.is_supported(Path::new("test.jpg")));
        assert!(discovery.is_supported(Path::new("test.JPG")));
        assert!(discovery.is_supported(Path::new("test.jpeg")));
        assert!(discovery.is_supported(Path::new("test.png")));
        assert!(discovery.is_supported(Path::new("test.bmp")));
        assert!(discovery.is_supported(Path::new("test.tif")));
        assert!(!discovery.is_supported(Path::new("test.txt")));
        assert!(!discovery.is_supported(Path::new("README")));
    }

    #[test]
    fn test_discover_sorted_and_non_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.png"));
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("notes.txt"));
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested").join("c.png"));

        let files = FileDiscovery::new(ProcessingConfig::default())
            .discover(dir.path())
            .unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn test_discover_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested").join("c.png"));

        let config = ProcessingConfig {
            recursive: true,
            ..Default::default()
        };
        let files = FileDiscovery::new(config).discover(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.jpg"), dir.path().join("nested").join("c.png")]
        );
    }

    #[test]
    fn test_discover_missing_root() {
        let err = FileDiscovery::new(ProcessingConfig::default())
            .discover(Path::new("/nonexistent/photos"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_discover_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.jpg");
        touch(&file);
        let err = FileDiscovery::new(ProcessingConfig::default())
            .discover(&file)
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotADirectory(_)));
    }
}
