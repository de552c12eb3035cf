//! JSON and JSON Lines output for asset records.
//!
//! Records are streamed as they are produced. In JSON mode the writer emits a
//! single array, opening it on the first record and closing it in
//! [`OutputWriter::finish`].

use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::str::FromStr;

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON array of records
    #[default]
    Json,
    /// One JSON object per line (newline-delimited JSON)
    #[serde(alias = "jsonlines", alias = "ndjson")]
    Jsonl,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::Jsonl),
            _ => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown output format {s:?} (expected json or jsonl)"))
    }
}

/// A writer that streams records as JSON or JSONL.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
    finished: bool,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects JSON output; JSONL is always one object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
            finished: false,
        }
    }

    /// Write one record.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let separator = if self.items_written == 0 { "[" } else { "," };
                if self.pretty {
                    writeln!(self.writer, "{separator}")?;
                    serde_json::to_writer_pretty(&mut self.writer, item)
                        .map_err(io::Error::other)?;
                } else {
                    write!(self.writer, "{separator}")?;
                    serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                }
            }
            OutputFormat::Jsonl => {
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Write every record in `items`.
    pub fn write_all<'a, T, I>(&mut self, items: I) -> io::Result<()>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        for item in items {
            self.write(item)?;
        }
        Ok(())
    }

    /// Get the number of records written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Close the JSON array (an empty one if nothing was written) and flush.
    pub fn finish(&mut self) -> io::Result<()> {
        if !self.finished && self.format == OutputFormat::Json {
            if self.items_written == 0 {
                writeln!(self.writer, "[]")?;
            } else if self.pretty {
                writeln!(self.writer, "\n]")?;
            } else {
                writeln!(self.writer, "]")?;
            }
        }
        self.finished = true;
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageAsset, ImageKind};
    use std::path::PathBuf;

    fn asset(name: &str) -> ImageAsset {
        ImageAsset {
            file_path: PathBuf::from(format!("/photos/{name}")),
            description: "This image likely contains: Tag-0.90.".to_string(),
            keywords: vec!["Tag-0.90".to_string()],
            metadata: Default::default(),
            tags: vec!["Tag-0.90".to_string()],
            width: 4,
            height: 3,
            format: ImageKind::Png,
            primary_colors: Default::default(),
        }
    }

    fn render(format: OutputFormat, pretty: bool, items: &[ImageAsset]) -> String {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, format, pretty);
        writer.write_all(items).unwrap();
        writer.finish().unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_json_is_one_array() {
        let output = render(OutputFormat::Json, false, &[asset("a.png"), asset("b.png")]);
        let parsed: Vec<ImageAsset> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].file_path, PathBuf::from("/photos/b.png"));
    }

    #[test]
    fn test_pretty_json_parses() {
        let output = render(OutputFormat::Json, true, &[asset("a.png"), asset("b.png")]);
        assert!(output.contains('\n'));
        let parsed: Vec<ImageAsset> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, vec![asset("a.png"), asset("b.png")]);
    }

    #[test]
    fn test_empty_json_array() {
        assert_eq!(render(OutputFormat::Json, false, &[]).trim(), "[]");
        assert_eq!(render(OutputFormat::Jsonl, false, &[]), "");
    }

    #[test]
    fn test_write_jsonl() {
        let output = render(OutputFormat::Jsonl, true, &[asset("a.png"), asset("b.png")]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: ImageAsset = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.file_path, PathBuf::from("/photos/a.png"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("jsonl"), Some(OutputFormat::Jsonl));
        assert_eq!(OutputFormat::parse("NDJSON"), Some(OutputFormat::Jsonl));
        assert_eq!(OutputFormat::parse("invalid"), None);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
