//! Lint runner: applies the rules to code cells and aggregates per-file
//! outcomes.
//!
//! Files are processed one at a time in source order. A read or parse
//! failure marks that file `ignored` and the run continues; a dirty file
//! from disk is rewritten with its fixes unless `write` is disabled.

use crate::codec;
use crate::error::Result;
use crate::models::notebook::{CodeCell, Notebook};
use crate::models::{FileOutcome, FileReport};
use crate::output;
use crate::rules::{MetadataPolicy, Rule, RULES};
use crate::sources::NotebookSource;
use std::collections::BTreeSet;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Rules that fired on one code cell, with the cell as it was before fixing.
#[derive(Debug, Clone, PartialEq)]
pub struct CellViolation {
    pub index: usize,
    pub rules: Vec<Rule>,
    pub original: CodeCell,
}

/// Evaluate every rule against `cell` and apply the fixes of those that
/// fired, repeating until a pass fires nothing. Returns `None` when the
/// cell is clean.
///
/// A fix can expose another rule: clearing denied metadata also drops
/// `pin_output`, after which outputs and the execution count are checked.
pub fn lint_cell(
    index: usize,
    cell: &mut CodeCell,
    policy: &MetadataPolicy,
) -> Option<CellViolation> {
    let original = cell.clone();
    let mut fired: Vec<Rule> = Vec::new();
    // no fix re-arms a rule that already fired, so passes settle within RULES.len()
    for _ in 0..=RULES.len() {
        let pass: Vec<Rule> = RULES
            .iter()
            .copied()
            .filter(|r| r.applies(cell, policy))
            .collect();
        if pass.is_empty() {
            break;
        }
        for rule in &pass {
            rule.fix(cell, policy);
        }
        fired.extend(pass);
    }
    if fired.is_empty() {
        return None;
    }
    let rules = RULES.iter().copied().filter(|r| fired.contains(r)).collect();
    Some(CellViolation {
        index,
        rules,
        original,
    })
}

#[derive(Debug, Default, Clone, PartialEq)]
/// Verdict for one notebook. Dirty iff any code cell had a violation.
pub struct NotebookCheck {
    pub violations: Vec<CellViolation>,
}

impl NotebookCheck {
    pub fn is_dirty(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Distinct rules that fired anywhere in the notebook, in rule order.
    pub fn issues(&self) -> Vec<Rule> {
        RULES
            .iter()
            .copied()
            .filter(|r| self.violations.iter().any(|v| v.rules.contains(r)))
            .collect()
    }
}

/// Lint all code cells of `nb` in place. Markdown and raw cells are skipped.
pub fn lint_notebook(nb: &mut Notebook, policy: &MetadataPolicy) -> NotebookCheck {
    let violations = nb
        .code_cells_mut()
        .filter_map(|(i, cell)| lint_cell(i, cell, policy))
        .collect();
    NotebookCheck { violations }
}

/// Run-wide knobs for `run_lint`.
pub struct LintOptions<'a> {
    pub policy: &'a MetadataPolicy,
    /// Rewrite dirty files in place.
    pub write: bool,
    /// Colorize diagnostic blocks.
    pub color: bool,
}

/// Check every source in order and return one report entry per source.
///
/// `stdin` backs the `-` source. Cell diagnostics are written to `diag`;
/// pass `io::sink()` to silence them.
pub fn run_lint<R: Read, W: Write>(
    sources: &BTreeSet<NotebookSource>,
    opts: &LintOptions<'_>,
    stdin: &mut R,
    diag: &mut W,
) -> Vec<FileReport> {
    sources
        .iter()
        .map(|src| {
            debug!(source = %src, "checking");
            FileReport {
                name: src.to_string(),
                outcome: check_source(src, opts, stdin, diag),
            }
        })
        .collect()
}

fn check_source<R: Read, W: Write>(
    src: &NotebookSource,
    opts: &LintOptions<'_>,
    stdin: &mut R,
    diag: &mut W,
) -> FileOutcome {
    let mut nb = match read_source(src, stdin).and_then(|text| codec::parse(&text)) {
        Ok(nb) => nb,
        Err(e) => {
            debug!(source = %src, error = %e, "ignored");
            return FileOutcome::Ignored {
                error: e.to_string(),
            };
        }
    };

    let check = lint_notebook(&mut nb, opts.policy);
    if !check.is_dirty() {
        return FileOutcome::Clean;
    }

    let name = src.to_string();
    for v in &check.violations {
        if let Err(e) = output::write_cell_diagnostics(diag, &name, v, opts.color) {
            debug!(error = %e, "diagnostic stream closed");
        }
    }

    let mut write_error = None;
    if let (true, NotebookSource::Path(path)) = (opts.write, src) {
        if let Err(e) = write_notebook(path, &nb) {
            warn!(path = %path.display(), error = %e, "failed to write fixes");
            write_error = Some(e.to_string());
        }
    }
    FileOutcome::Dirty {
        issues: check.issues(),
        write_error,
    }
}

fn read_source<R: Read>(src: &NotebookSource, stdin: &mut R) -> Result<String> {
    match src {
        NotebookSource::Stdin => {
            let mut text = String::new();
            stdin.read_to_string(&mut text)?;
            Ok(text)
        }
        NotebookSource::Path(p) => Ok(fs::read_to_string(p)?),
    }
}

fn write_notebook(path: &Path, nb: &Notebook) -> Result<()> {
    let text = codec::to_string(nb)?;
    fs::write(path, text)?;
    Ok(())
}
