//! Typed view of an nbformat v4 notebook.
//!
//! Only the fields the rules read or write are typed. Everything else is
//! captured in `extra` maps so a rewrite round-trips unknown keys unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// Metadata key that exempts a code cell from the output rules.
pub const PIN_OUTPUT: &str = "pin_output";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Top-level notebook document.
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: Map<String, Json>,
    pub nbformat: u32,
    #[serde(default)]
    pub nbformat_minor: u32,
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

impl Notebook {
    /// Code cells in document order, mutably.
    pub fn code_cells_mut(&mut self) -> impl Iterator<Item = (usize, &mut CodeCell)> + '_ {
        self.cells
            .iter_mut()
            .enumerate()
            .filter_map(|(i, cell)| match cell {
                Cell::Code(code) => Some((i, code)),
                _ => None,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
/// A notebook cell, tagged by `cell_type`.
pub enum Cell {
    Code(CodeCell),
    Markdown(TextCell),
    Raw(TextCell),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCell {
    #[serde(default)]
    pub execution_count: Option<i64>,
    #[serde(default)]
    pub metadata: Map<String, Json>,
    #[serde(default)]
    pub outputs: Vec<Json>,
    #[serde(default)]
    pub source: Source,
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

impl CodeCell {
    pub fn new(source: &str) -> Self {
        Self {
            execution_count: None,
            metadata: Map::new(),
            outputs: Vec::new(),
            source: Source::Text(source.to_string()),
            extra: Map::new(),
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.metadata.contains_key(PIN_OUTPUT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Markdown and raw cells. Never inspected, kept only for round-trip.
pub struct TextCell {
    #[serde(default)]
    pub metadata: Map<String, Json>,
    #[serde(default)]
    pub source: Source,
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// nbformat multiline string: either one string or a list of lines.
pub enum Source {
    Text(String),
    Lines(Vec<String>),
}

impl Default for Source {
    fn default() -> Self {
        Source::Text(String::new())
    }
}

impl Source {
    pub fn text(&self) -> String {
        match self {
            Source::Text(s) => s.clone(),
            Source::Lines(lines) => lines.concat(),
        }
    }

    /// Replace the text, keeping the representation it was read with.
    pub fn set_text(&mut self, text: String) {
        *self = match self {
            Source::Text(_) => Source::Text(text),
            Source::Lines(_) => {
                Source::Lines(text.split_inclusive('\n').map(String::from).collect())
            }
        };
    }
}
