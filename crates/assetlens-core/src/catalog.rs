//! In-memory asset catalog with keyword search.
//!
//! A scan evaluates every discovered file and replaces the catalog contents
//! with the results. Files that fail evaluation are recorded in the
//! [`ScanReport`] and never abort the scan.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures_util::{future, stream, StreamExt};
use indexmap::IndexMap;

use crate::config::Config;
use crate::error::CatalogError;
use crate::pipeline::{FileDiscovery, ImageEvaluator};
use crate::types::{ImageAsset, ScanReport, SkippedFile};

/// Cooperative cancellation flag shared between a scan and its controller.
///
/// Once set, files already being evaluated finish but no new file starts.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the scan to stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress notifications emitted while scanning.
#[derive(Debug)]
pub enum ScanEvent<'a> {
    /// Discovery finished with this many candidate files
    Discovered { total: usize },
    /// A file was evaluated and added
    Indexed(&'a ImageAsset),
    /// A file failed evaluation
    Skipped(&'a SkippedFile),
}

struct CatalogEntry {
    asset: ImageAsset,
    /// Lower-cased keywords used for matching
    search_keys: Vec<String>,
}

impl CatalogEntry {
    fn new(asset: ImageAsset) -> Self {
        let search_keys = asset.keywords.iter().map(|k| k.to_lowercase()).collect();
        Self { asset, search_keys }
    }

    fn matches(&self, needle: &str) -> bool {
        self.search_keys.iter().any(|key| key.contains(needle))
    }
}

/// Evaluated assets keyed by file path, in discovery order.
pub struct AssetCatalog {
    evaluator: ImageEvaluator,
    discovery: FileDiscovery,
    parallel_workers: usize,
    entries: IndexMap<PathBuf, CatalogEntry>,
    report: ScanReport,
}

impl AssetCatalog {
    /// Create an empty catalog.
    pub fn new(evaluator: ImageEvaluator, config: &Config) -> Self {
        Self {
            evaluator,
            discovery: FileDiscovery::new(config.processing.clone()),
            parallel_workers: config.processing.parallel_workers.max(1),
            entries: IndexMap::new(),
            report: ScanReport::default(),
        }
    }

    /// Scan `directory`, replacing the catalog contents.
    pub async fn scan(&mut self, directory: &Path) -> Result<&ScanReport, CatalogError> {
        self.scan_with(directory, &StopSignal::new(), |_| {}).await
    }

    /// Scan `directory` with cancellation and progress callbacks.
    ///
    /// A directory-level error leaves the previous contents untouched.
    pub async fn scan_with<F>(
        &mut self,
        directory: &Path,
        stop: &StopSignal,
        mut on_event: F,
    ) -> Result<&ScanReport, CatalogError>
    where
        F: FnMut(&ScanEvent<'_>),
    {
        let start = Instant::now();
        let files = self.discovery.discover(directory)?;
        tracing::info!("Found {} images in {:?}", files.len(), directory);
        on_event(&ScanEvent::Discovered { total: files.len() });

        let mut entries = IndexMap::with_capacity(files.len());
        let mut report = ScanReport {
            discovered: files.len(),
            ..Default::default()
        };

        // `buffered` yields in input order, so insertion order is discovery order
        let evaluator = &self.evaluator;
        let mut results = stream::iter(files)
            .take_while(|_| future::ready(!stop.is_stopped()))
            .map(|path| async move {
                let result = evaluator.evaluate(&path).await;
                (path, result)
            })
            .buffered(self.parallel_workers);

        while let Some((path, result)) = results.next().await {
            match result {
                Ok(asset) => {
                    on_event(&ScanEvent::Indexed(&asset));
                    entries.insert(path, CatalogEntry::new(asset));
                }
                Err(e) => {
                    tracing::warn!("Skipped {:?}: {}", path, e);
                    let skipped = SkippedFile {
                        path,
                        kind: e.kind(),
                        reason: e.to_string(),
                    };
                    on_event(&ScanEvent::Skipped(&skipped));
                    report.skipped.push(skipped);
                }
            }
        }
        drop(results);

        report.indexed = entries.len();
        report.interrupted =
            stop.is_stopped() && report.indexed + report.skipped.len() < report.discovered;
        report.total_seconds = start.elapsed().as_secs_f64();

        if report.interrupted {
            tracing::warn!(
                "Scan interrupted after {} of {} files",
                report.indexed + report.skipped.len(),
                report.discovered
            );
        }
        tracing::info!(
            "Indexed {} of {} images in {:.2}s ({} skipped)",
            report.indexed,
            report.discovered,
            report.total_seconds,
            report.skipped.len()
        );

        self.entries = entries;
        self.report = report;
        Ok(&self.report)
    }

    /// Assets with a keyword containing `keyword`, ignoring case, in catalog
    /// order. The query is matched as given, surrounding whitespace included.
    /// A blank query matches nothing.
    pub fn search(&self, keyword: &str) -> Vec<&ImageAsset> {
        if keyword.trim().is_empty() {
            return Vec::new();
        }
        let needle = keyword.to_lowercase();
        self.entries
            .values()
            .filter(|entry| entry.matches(&needle))
            .map(|entry| &entry.asset)
            .collect()
    }

    /// Look up the asset for a path.
    pub fn get(&self, path: &Path) -> Option<&ImageAsset> {
        self.entries.get(path).map(|entry| &entry.asset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All assets in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ImageAsset> {
        self.entries.values().map(|entry| &entry.asset)
    }

    /// Report of the most recent scan.
    pub fn report(&self) -> &ScanReport {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::inference::{InferenceEngine, NamedTensor};
    use crate::types::FailureKind;
    use image::{Rgb, RgbImage};

    struct FixedEngine;

    impl InferenceEngine for FixedEngine {
        fn run(&self, _inputs: Vec<NamedTensor>) -> Result<Vec<NamedTensor>, EngineError> {
            Ok(vec![NamedTensor {
                name: "output".into(),
                shape: vec![1, 3],
                data: vec![0.1, 0.6, 0.9],
            }])
        }
    }

    fn catalog_with(config: Config) -> AssetCatalog {
        let evaluator = ImageEvaluator::new(&config, Arc::new(FixedEngine));
        AssetCatalog::new(evaluator, &config)
    }

    fn write_image(dir: &Path, name: &str, color: [u8; 3]) {
        RgbImage::from_pixel(16, 16, Rgb(color))
            .save(dir.join(name))
            .unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "good.png", [255, 0, 0]);
        std::fs::write(dir.path().join("bad.jpg"), b"not an image at all").unwrap();

        let mut catalog = catalog_with(Config::default());
        let report = catalog.scan(dir.path()).await.unwrap();

        assert_eq!(report.discovered, 2);
        assert_eq!(report.indexed, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, dir.path().join("bad.jpg"));
        assert_eq!(report.skipped[0].kind, FailureKind::Decode);
        assert!(!report.interrupted);

        assert_eq!(catalog.len(), 1);
        let asset = catalog.get(&dir.path().join("good.png")).unwrap();
        assert_eq!(asset.tags, vec!["Tag-0.60", "Tag-0.90"]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "Sunset Beach.png", [250, 120, 0]);
        write_image(dir.path(), "forest.png", [0, 100, 0]);

        let mut catalog = catalog_with(Config::default());
        catalog.scan(dir.path()).await.unwrap();

        let hits = catalog.search("sunset");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_path, dir.path().join("Sunset Beach.png"));

        assert_eq!(catalog.search("SUNSET_BEACH").len(), 1);
        assert_eq!(catalog.search("tag-0.90").len(), 2);
        assert!(catalog.search("mountain").is_empty());
        assert!(catalog.search(" tag-0.90 ").is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_returns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", [0, 0, 255]);

        let mut catalog = catalog_with(Config::default());
        catalog.scan(dir.path()).await.unwrap();
        assert!(catalog.search("").is_empty());
        assert!(catalog.search("   ").is_empty());
    }

    #[tokio::test]
    async fn test_rescan_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", [0, 0, 255]);
        write_image(dir.path(), "b.png", [0, 255, 0]);

        let mut catalog = catalog_with(Config::default());
        catalog.scan(dir.path()).await.unwrap();
        let first: Vec<ImageAsset> = catalog.iter().cloned().collect();

        catalog.scan(dir.path()).await.unwrap();
        let second: Vec<ImageAsset> = catalog.iter().cloned().collect();
        assert_eq!(first, second);

        std::fs::remove_file(dir.path().join("a.png")).unwrap();
        catalog.scan(dir.path()).await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(&dir.path().join("a.png")).is_none());
    }

    #[tokio::test]
    async fn test_parallel_scan_keeps_discovery_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["d.png", "a.png", "c.png", "b.png"] {
            write_image(dir.path(), name, [128, 128, 128]);
        }

        let mut config = Config::default();
        config.processing.parallel_workers = 3;
        let mut catalog = catalog_with(config);
        catalog.scan(dir.path()).await.unwrap();

        let names: Vec<_> = catalog
            .iter()
            .map(|a| a.file_path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png", "d.png"]);
    }

    #[tokio::test]
    async fn test_stop_before_scan_indexes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", [0, 0, 0]);

        let stop = StopSignal::new();
        stop.stop();
        let mut catalog = catalog_with(Config::default());
        let report = catalog.scan_with(dir.path(), &stop, |_| {}).await.unwrap();
        assert!(report.interrupted);
        assert_eq!(report.indexed, 0);
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_stop_during_scan_keeps_finished_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            write_image(dir.path(), name, [0, 0, 0]);
        }

        let stop = StopSignal::new();
        let mut catalog = catalog_with(Config::default());
        let report = catalog
            .scan_with(dir.path(), &stop, |event| {
                if let ScanEvent::Indexed(_) = event {
                    stop.stop();
                }
            })
            .await
            .unwrap();

        assert_eq!(report.discovered, 3);
        assert_eq!(report.indexed, 1);
        assert!(report.skipped.is_empty());
        assert!(report.interrupted);
        assert!(catalog.get(&dir.path().join("a.png")).is_some());
    }

    #[tokio::test]
    async fn test_inference_timeout_is_skipped() {
        struct SlowEngine;

        impl InferenceEngine for SlowEngine {
            fn run(&self, _inputs: Vec<NamedTensor>) -> Result<Vec<NamedTensor>, EngineError> {
                std::thread::sleep(std::time::Duration::from_millis(300));
                Ok(vec![])
            }
        }

        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", [0, 0, 0]);
        write_image(dir.path(), "b.png", [9, 9, 9]);

        let mut config = Config::default();
        config.limits.infer_timeout_ms = 20;
        let evaluator = ImageEvaluator::new(&config, Arc::new(SlowEngine));
        let mut catalog = AssetCatalog::new(evaluator, &config);
        let report = catalog.scan(dir.path()).await.unwrap();

        assert_eq!(report.indexed, 0);
        assert!(!report.interrupted);
        let kinds: Vec<_> = report.skipped.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![FailureKind::Timeout, FailureKind::Timeout]);
        assert!(report.skipped[0].reason.contains("inference"));
    }

    #[tokio::test]
    async fn test_scan_events() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", [0, 0, 0]);
        std::fs::write(dir.path().join("b.png"), b"garbage").unwrap();

        let mut events = Vec::new();
        let mut catalog = catalog_with(Config::default());
        catalog
            .scan_with(dir.path(), &StopSignal::new(), |event| {
                events.push(match event {
                    ScanEvent::Discovered { total } => format!("discovered {total}"),
                    ScanEvent::Indexed(asset) => format!("indexed {}", asset.width),
                    ScanEvent::Skipped(skip) => format!("skipped {}", skip.kind),
                })
            })
            .await
            .unwrap();
        assert_eq!(events, vec!["discovered 2", "indexed 16", "skipped decode"]);
    }

    #[tokio::test]
    async fn test_missing_directory_keeps_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", [0, 0, 0]);

        let mut catalog = catalog_with(Config::default());
        catalog.scan(dir.path()).await.unwrap();

        let err = catalog
            .scan(&dir.path().join("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::DirectoryNotFound(_)));
        assert_eq!(catalog.len(), 1);
    }
}
