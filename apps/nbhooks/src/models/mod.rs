//! Shared data models: the notebook document and per-file report entries.

pub mod notebook;

use crate::rules::Rule;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Status label shown in reports.
pub enum FileStatus {
    Dirty,
    Clean,
    Ignored,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Dirty => "dirty",
            FileStatus::Clean => "clean",
            FileStatus::Ignored => "ignored",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Result of checking one file.
pub enum FileOutcome {
    Clean,
    /// Rules fired; `issues` holds the distinct rules in rule order.
    Dirty {
        issues: Vec<Rule>,
        write_error: Option<String>,
    },
    /// The file could not be read or parsed.
    Ignored { error: String },
}

#[derive(Debug, Clone, PartialEq)]
/// One entry of the run report.
pub struct FileReport {
    pub name: String,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn status(&self) -> FileStatus {
        match self.outcome {
            FileOutcome::Clean => FileStatus::Clean,
            FileOutcome::Dirty { .. } => FileStatus::Dirty,
            FileOutcome::Ignored { .. } => FileStatus::Ignored,
        }
    }

    /// Text shown under the file name: issue statements for dirty files,
    /// the read/parse error for ignored ones.
    pub fn error(&self) -> Option<String> {
        match &self.outcome {
            FileOutcome::Clean => None,
            FileOutcome::Dirty {
                issues,
                write_error,
            } => {
                let mut text = issues
                    .iter()
                    .map(|r| r.statement())
                    .collect::<Vec<_>>()
                    .join("; ");
                if let Some(e) = write_error {
                    text.push_str(&format!("; failed to write fixes: {}", e));
                }
                Some(text)
            }
            FileOutcome::Ignored { error } => Some(error.clone()),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
/// Aggregated per-status counts used by printers.
pub struct Summary {
    pub dirty: usize,
    pub clean: usize,
    pub ignored: usize,
    pub total: usize,
}

impl Summary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Summary::default();
        for r in reports {
            match r.status() {
                FileStatus::Dirty => summary.dirty += 1,
                FileStatus::Clean => summary.clean += 1,
                FileStatus::Ignored => summary.ignored += 1,
            }
        }
        summary.total = reports.len();
        summary
    }
}
