//! nbhooks core library.
//!
//! Pre-commit checks for Jupyter notebooks: code cells must not carry
//! execution counts, outputs, disallowed metadata, or an active
//! `show_answer` directive. Offending notebooks are fixed in place.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `codec`: Notebook parsing and nbformat-style serialization.
//! - `sources`: Expansion of arguments into notebook sources.
//! - `rules`: The ordered issue rules and the metadata policy.
//! - `lint`: Cell and file processors plus the run loop.
//! - `models`: Notebook document and report data models.
//! - `output`: Human/JSON report printers and cell diagnostics.
//! - `error`: Error taxonomy and exit codes.
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod lint;
pub mod models;
pub mod output;
pub mod rules;
pub mod sources;
