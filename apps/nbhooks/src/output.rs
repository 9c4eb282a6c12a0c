//! Output rendering for the run report and per-cell diagnostics.
//!
//! Supports `human` (default) and `json` outputs. Color is always an
//! explicit argument; nothing here consults the environment.

use crate::lint::CellViolation;
use crate::models::notebook::Cell;
use crate::models::{FileReport, FileStatus, Summary};
use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonVal};
use std::io::{self, Write};

/// How much of the report to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Nothing at all; the exit status is the only signal.
    Quiet,
    /// Dirty files and the summary.
    #[default]
    Normal,
    /// Every file and the summary.
    Verbose,
}

impl Verbosity {
    /// Quiet wins over verbose.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        }
    }
}

/// Report format. Unknown names are rejected by clap and by the config loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Human,
    Json,
}

const LABEL_WIDTH: usize = 8;

fn paint_status(status: FileStatus, color: bool) -> String {
    let label = format!("{:<width$}", status.as_str(), width = LABEL_WIDTH);
    if !color {
        return label;
    }
    match status {
        FileStatus::Dirty => label.red().to_string(),
        FileStatus::Clean => label.green().to_string(),
        FileStatus::Ignored => label.yellow().to_string(),
    }
}

fn bold(s: &str, color: bool) -> String {
    if color {
        s.bold().to_string()
    } else {
        s.to_string()
    }
}

fn count_clause(n: usize, singular: &str, plural: &str, state: &str) -> String {
    format!("{} {} {}", n, if n == 1 { singular } else { plural }, state)
}

/// Summary sentence joining the non-zero counts, e.g.
/// `1 file is dirty, 2 files are clean`.
pub fn summary_line(summary: &Summary) -> String {
    let mut parts = Vec::new();
    if summary.dirty > 0 {
        parts.push(count_clause(summary.dirty, "file is", "files are", "dirty"));
    }
    if summary.clean > 0 {
        parts.push(count_clause(summary.clean, "file is", "files are", "clean"));
    }
    if summary.ignored > 0 {
        parts.push(count_clause(summary.ignored, "file was", "files were", "ignored"));
    }
    parts.join(", ")
}

/// Render the human report. Empty in quiet mode.
pub fn format_report(reports: &[FileReport], verbosity: Verbosity, color: bool) -> String {
    if verbosity == Verbosity::Quiet {
        return String::new();
    }
    if reports.is_empty() {
        return "No files were checked".to_string();
    }
    let indent = " ".repeat(LABEL_WIDTH);
    let mut lines = Vec::new();
    for r in reports {
        let status = r.status();
        if verbosity != Verbosity::Verbose && status != FileStatus::Dirty {
            continue;
        }
        lines.push(format!("{}{}", paint_status(status, color), r.name));
        if let Some(err) = r.error() {
            lines.push(format!("{}{}", indent, bold(&err, color)));
        }
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(bold(&summary_line(&Summary::from_reports(reports)), color));
    lines.join("\n")
}

/// Closing mood line printed after a human report.
pub fn format_verdict(reports: &[FileReport], color: bool) -> String {
    let dirty = reports.iter().any(|r| r.status() == FileStatus::Dirty);
    match (dirty, color) {
        (true, true) => ":(".red().bold().to_string(),
        (false, true) => ":)".green().bold().to_string(),
        (true, false) => ":(".to_string(),
        (false, false) => ":)".to_string(),
    }
}

#[derive(Serialize)]
struct JsonFile<'a> {
    name: &'a str,
    status: FileStatus,
    error: Option<String>,
}

/// Compose the JSON report (pure) for printing and tests.
pub fn compose_report_json(reports: &[FileReport]) -> JsonVal {
    let files: Vec<JsonFile<'_>> = reports
        .iter()
        .map(|r| JsonFile {
            name: &r.name,
            status: r.status(),
            error: r.error(),
        })
        .collect();
    json!({"files": files, "summary": Summary::from_reports(reports)})
}

/// Print the report in the requested mode. Quiet prints nothing.
///
/// Human reports go to stderr, JSON to stdout.
pub fn print_report(
    reports: &[FileReport],
    mode: OutputMode,
    verbosity: Verbosity,
    color: bool,
) -> io::Result<()> {
    if verbosity == Verbosity::Quiet {
        return Ok(());
    }
    match mode {
        OutputMode::Json => {
            let out = serde_json::to_string_pretty(&compose_report_json(reports))?;
            writeln!(io::stdout().lock(), "{}", out)
        }
        OutputMode::Human => {
            let mut err = io::stderr().lock();
            writeln!(err, "{}", format_report(reports, verbosity, color))?;
            writeln!(err, "{}", format_verdict(reports, color))
        }
    }
}

/// Diagnostic block for one offending cell: where it is, which rules fired,
/// and the cell content before fixing.
pub fn write_cell_diagnostics<W: Write>(
    out: &mut W,
    file: &str,
    v: &CellViolation,
    color: bool,
) -> io::Result<()> {
    let header = format!("{}: cell {}", file, v.index);
    writeln!(out, "{}", bold(&header, color))?;
    for rule in &v.rules {
        let bullet = if color {
            "✖".red().to_string()
        } else {
            "-".to_string()
        };
        writeln!(out, "  {} {}", bullet, rule.statement())?;
    }
    let dump = serde_json::to_string_pretty(&Cell::Code(v.original.clone()))?;
    for line in dump.lines() {
        writeln!(out, "    {}", line)?;
    }
    Ok(())
}
