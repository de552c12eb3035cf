//! Shared command setup: config overrides, model loading, progress, Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use assetlens_core::{
    AssetCatalog, Config, EngineOptions, ImageEvaluator, OnnxEngine, ScanEvent, ScanReport,
    StopSignal,
};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

/// Flags shared by every command that scans a directory.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// ONNX tagging model (overrides inference.model_path)
    #[arg(short, long, env = "ASSETLENS_MODEL")]
    pub model: Option<PathBuf>,

    /// Prefer GPU inference
    #[arg(long)]
    pub gpu: bool,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Number of files evaluated concurrently
    #[arg(short, long)]
    pub parallel: Option<usize>,
}

/// Apply command-line flags on top of the loaded configuration.
pub fn apply_overrides(config: &mut Config, args: &EngineArgs) -> anyhow::Result<()> {
    if let Some(model) = &args.model {
        config.inference.model_path = model.clone();
    }
    if args.gpu {
        config.inference.use_gpu = true;
    }
    if args.recursive {
        config.processing.recursive = true;
    }
    if let Some(parallel) = args.parallel {
        if parallel == 0 {
            anyhow::bail!("--parallel must be at least 1");
        }
        config.processing.parallel_workers = parallel;
    }
    Ok(())
}

/// Open the tagging model and assemble an empty catalog.
pub fn build_catalog(config: &Config) -> anyhow::Result<AssetCatalog> {
    let model_path = config.model_path();
    if !model_path.exists() {
        anyhow::bail!(
            "Model file not found: {:?}\n\n  Hint: Pass --model or set inference.model_path \
             (see `assetlens config path`).",
            model_path
        );
    }

    let engine = OnnxEngine::open(
        &model_path,
        EngineOptions {
            use_gpu: config.inference.use_gpu,
        },
    )?;
    tracing::info!("Tagging model loaded from {:?}", engine.model_path());

    let evaluator = ImageEvaluator::new(config, Arc::new(engine));
    Ok(AssetCatalog::new(evaluator, config))
}

/// A stop signal that trips on the first Ctrl-C.
pub fn stop_on_ctrl_c() -> StopSignal {
    let stop = StopSignal::new();
    let handle = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; finishing in-flight files");
            handle.stop();
        }
    });
    stop
}

/// Create a progress bar for a scan; the length is set once discovery finishes.
pub fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("discovering...");
    pb
}

/// Advance `progress` for one scan event.
pub fn track_progress(progress: &ProgressBar, event: &ScanEvent<'_>) {
    match event {
        ScanEvent::Discovered { total } => {
            progress.set_length(*total as u64);
            progress.set_message("");
        }
        ScanEvent::Indexed(_) | ScanEvent::Skipped(_) => {
            progress.inc(1);
            let elapsed = progress.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                progress.set_message(format!("{:.1} img/sec", progress.position() as f64 / elapsed));
            }
        }
    }
}

/// Print a formatted summary of a scan to stderr.
pub fn print_summary(report: &ScanReport) {
    let rate = if report.total_seconds > 0.0 {
        (report.indexed + report.skipped_count()) as f64 / report.total_seconds
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Indexed:      {:>8}", report.indexed);
    if report.skipped_count() > 0 {
        eprintln!("    Skipped:      {:>8}", report.skipped_count());
        for (kind, count) in report.skipped_by_kind() {
            eprintln!("      {:<12}{:>8}", kind.to_string(), count);
        }
    }
    if report.interrupted {
        eprintln!("    Interrupted:  {:>8}", "yes");
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Discovered:   {:>8}", report.discovered);
    eprintln!("    Duration:     {:>7.1}s", report.total_seconds);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");

    if !report.skipped.is_empty() {
        let dim = console::Style::new().for_stderr().dim();
        eprintln!();
        for skipped in &report.skipped {
            eprintln!(
                "  {} {}",
                console::style("✗").for_stderr().red(),
                dim.apply_to(format!("{}: {}", skipped.path.display(), skipped.reason))
            );
        }
    }
}
