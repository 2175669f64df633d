//! Rendering of search results to stdout

use clap::ValueEnum;
use codehound_search::FileMatch;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Output format for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One block per file with `row:col: line` entries, then a summary
    #[value(name = "text")]
    #[default]
    Text,

    /// A JSON array of file matches
    #[value(name = "json")]
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Invalid output format: '{s}'. Valid options are: text, json"
            )),
        }
    }
}

/// File and line totals for a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    pub lines: usize,
}

impl Summary {
    pub fn of(matches: &[FileMatch]) -> Self {
        Self {
            files: matches.len(),
            lines: matches.iter().map(|file| file.matches.len()).sum(),
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} files, {} matching lines", self.files, self.lines)
    }
}

/// Write `matches` to `out` in `format`
///
/// # Errors
/// Returns I/O and serialization errors from writing to `out`
pub fn render<W: Write>(
    matches: &[FileMatch],
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => render_text(matches, out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, matches)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn render_text<W: Write>(matches: &[FileMatch], out: &mut W) -> std::io::Result<()> {
    for file in matches {
        writeln!(
            out,
            "{}/{} ({})",
            file.repository_name(),
            file.path(),
            file.hit.html_url
        )?;
        for line_match in &file.matches {
            let line = file.content.line(line_match.row).unwrap_or_default();
            writeln!(out, "  {}:{}: {}", line_match.row, line_match.col, line.trim())?;
        }
        writeln!(out)?;
    }
    writeln!(out, "{}", Summary::of(matches))
}
