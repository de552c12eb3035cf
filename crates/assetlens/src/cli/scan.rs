//! The `assetlens scan` command: evaluate a directory and emit asset records.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use assetlens_core::{Config, OutputFormat, OutputWriter, ScanEvent};
use clap::{Args, ValueEnum};

use super::setup::{self, EngineArgs};

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    /// One JSON array of records
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Jsonl => OutputFormat::Jsonl,
        }
    }
}

/// Arguments for the `scan` command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory of images to scan
    #[arg(required = true)]
    pub dir: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to output.format from the config)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,
}

/// Execute the scan command.
pub async fn execute(args: ScanArgs, mut config: Config) -> anyhow::Result<()> {
    setup::apply_overrides(&mut config, &args.engine)?;
    let format = args
        .format
        .map(OutputFormat::from)
        .unwrap_or(config.output.format);

    let mut catalog = setup::build_catalog(&config)?;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut writer = OutputWriter::new(sink, format, config.output.pretty);
    // The progress callback cannot fail, so the first write error is kept here.
    let mut write_error: Option<io::Error> = None;

    let stop = setup::stop_on_ctrl_c();
    let progress = setup::create_progress_bar();

    let report = catalog
        .scan_with(&args.dir, &stop, |event| {
            setup::track_progress(&progress, event);
            if let ScanEvent::Indexed(asset) = event {
                if write_error.is_none() {
                    if let Err(e) = writer.write(*asset) {
                        write_error = Some(e);
                    }
                }
            }
        })
        .await?;
    progress.finish_and_clear();

    if let Some(e) = write_error {
        return Err(anyhow::anyhow!("Failed to write output: {e}"));
    }
    writer.finish()?;
    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }

    setup::print_summary(report);
    Ok(())
}
