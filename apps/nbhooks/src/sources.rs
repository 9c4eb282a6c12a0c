//! Resolution of positional arguments into notebook sources.

use crate::error::{Error, Result};
use glob::{glob, Pattern};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension matched when a directory is expanded.
pub const NOTEBOOK_EXT: &str = "ipynb";

/// A notebook to check. Stdin orders before every path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum NotebookSource {
    Stdin,
    Path(PathBuf),
}

impl fmt::Display for NotebookSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotebookSource::Stdin => f.write_str("<stdin>"),
            NotebookSource::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

/// `exclude` globs, matched against paths relative to the repository root.
#[derive(Debug, Clone, Default)]
pub struct Excludes {
    root: PathBuf,
    patterns: Vec<Pattern>,
}

impl Excludes {
    /// Compile `patterns`; `root` should be absolute.
    pub fn new<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|source| Error::Glob {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Excludes {
            root: root.to_path_buf(),
            patterns,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Paths outside the root are matched in absolute form.
    pub fn matches(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let abs = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let rel = abs.strip_prefix(&self.root).unwrap_or(&abs);
        self.patterns.iter().any(|p| p.matches_path(rel))
    }
}

/// Expand arguments into a deduplicated, sorted set of sources.
///
/// `-` selects stdin, files are taken as given and directories expand to
/// every `*.ipynb` beneath them minus `exclude` matches. Anything else
/// fails with `Error::InvalidPath` before any file is read.
pub fn collect_sources<S: AsRef<str>>(
    args: &[S],
    exclude: &Excludes,
) -> Result<BTreeSet<NotebookSource>> {
    let mut sources = BTreeSet::new();
    for arg in args {
        let arg = arg.as_ref();
        let path = Path::new(arg);
        if arg == "-" {
            sources.insert(NotebookSource::Stdin);
        } else if path.is_file() {
            sources.insert(NotebookSource::Path(path.to_path_buf()));
        } else if path.is_dir() {
            let found = expand_dir(path, exclude)?;
            debug!(dir = %path.display(), count = found.len(), "expanded directory");
            sources.extend(found.into_iter().map(NotebookSource::Path));
        } else {
            return Err(Error::InvalidPath(path.to_path_buf()));
        }
    }
    Ok(sources)
}

fn expand_dir(dir: &Path, exclude: &Excludes) -> Result<Vec<PathBuf>> {
    let escaped = Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{}/**/*.{}", escaped.trim_end_matches('/'), NOTEBOOK_EXT);
    let entries = glob(&pattern).map_err(|source| Error::Glob {
        pattern: pattern.clone(),
        source,
    })?;
    let mut out = Vec::new();
    for entry in entries.flatten() {
        if entry.is_file() && !exclude.matches(&entry) {
            out.push(entry);
        }
    }
    Ok(out)
}
