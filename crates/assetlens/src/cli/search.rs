//! The `assetlens search` command: scan, then query the catalog by keyword.

use std::path::PathBuf;

use assetlens_core::{AssetCatalog, Config, ImageAsset};
use clap::Args;
use console::{style, Style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;

use super::setup::{self, EngineArgs};

/// Typing this at the prompt ends the session.
const EXIT_COMMAND: &str = "exit";

/// Arguments for the `search` command.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Directory of images to scan
    #[arg(required = true)]
    pub dir: PathBuf,

    /// Keyword to look up; omit for an interactive prompt
    pub query: Option<String>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Execute the search command.
pub async fn execute(args: SearchArgs, mut config: Config) -> anyhow::Result<()> {
    setup::apply_overrides(&mut config, &args.engine)?;
    let mut catalog = setup::build_catalog(&config)?;

    let stop = setup::stop_on_ctrl_c();
    let progress = setup::create_progress_bar();
    let report = catalog
        .scan_with(&args.dir, &stop, |event| setup::track_progress(&progress, event))
        .await?;
    progress.finish_and_clear();
    setup::print_summary(report);

    match args.query {
        Some(query) => print_results(&query, &catalog.search(&query)),
        None => prompt_loop(&catalog)?,
    }
    Ok(())
}

/// Read queries until `exit`, Ctrl-C, or end of input.
fn prompt_loop(catalog: &AssetCatalog) -> anyhow::Result<()> {
    let theme = search_theme();
    let dim = Style::new().for_stderr().dim();
    eprintln!();
    eprintln!(
        "  {}",
        dim.apply_to(format!(
            "{} images indexed. Type a keyword to search, '{EXIT_COMMAND}' to quit.",
            catalog.len()
        ))
    );

    loop {
        let input = Input::<String>::with_theme(&theme)
            .with_prompt("Search")
            .allow_empty(true)
            .interact_text();
        let query = match handle_interrupt(input)? {
            Some(query) => query,
            None => break,
        };
        if is_exit(&query) {
            break;
        }
        if query.trim().is_empty() {
            continue;
        }
        print_results(&query, &catalog.search(&query));
    }
    Ok(())
}

fn print_results(query: &str, results: &[&ImageAsset]) {
    if results.is_empty() {
        eprintln!("  No images match {query:?}");
        return;
    }
    eprintln!("  {} result(s) for {query:?}:", results.len());
    for line in format_results(results) {
        println!("{line}");
    }
}

/// One `- <path>: <description>` line per result.
fn format_results(results: &[&ImageAsset]) -> Vec<String> {
    results
        .iter()
        .map(|asset| format!("- {}: {}", asset.file_path.display(), asset.description))
        .collect()
}

fn is_exit(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(EXIT_COMMAND)
}

/// Map an interrupted prompt (Ctrl-C, closed terminal) to `Ok(None)`.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e))
            if matches!(
                e.kind(),
                std::io::ErrorKind::Interrupted | std::io::ErrorKind::UnexpectedEof
            ) =>
        {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Prompt theme: cyan `?` prefix, green check on submit.
fn search_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetlens_core::ImageKind;

    fn asset(path: &str, description: &str) -> ImageAsset {
        ImageAsset {
            file_path: PathBuf::from(path),
            description: description.to_string(),
            keywords: vec![],
            metadata: Default::default(),
            tags: vec![],
            width: 1,
            height: 1,
            format: ImageKind::Jpeg,
            primary_colors: Default::default(),
        }
    }

    #[test]
    fn test_format_results() {
        let a = asset("/photos/a.jpg", "This image likely contains: Tag-0.91.");
        let b = asset("/photos/b.jpg", "This image likely contains: .");
        assert_eq!(
            format_results(&[&a, &b]),
            vec![
                "- /photos/a.jpg: This image likely contains: Tag-0.91.",
                "- /photos/b.jpg: This image likely contains: .",
            ]
        );
    }

    #[test]
    fn test_is_exit() {
        assert!(is_exit("exit"));
        assert!(is_exit("  EXIT "));
        assert!(!is_exit("exits"));
        assert!(!is_exit(""));
    }

    #[test]
    fn test_handle_interrupt() {
        let interrupted: dialoguer::Result<String> = Err(dialoguer::Error::IO(
            std::io::Error::new(std::io::ErrorKind::Interrupted, "ctrl-c"),
        ));
        assert!(handle_interrupt(interrupted).unwrap().is_none());

        let ok: dialoguer::Result<String> = Ok("cat".into());
        assert_eq!(handle_interrupt(ok).unwrap(), Some("cat".to_string()));
    }
}
