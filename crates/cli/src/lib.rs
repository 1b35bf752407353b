use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub mod commands;

/// Read a coverage input file fully into memory.
///
/// All parsers operate on fully materialized strings; there is no streaming
/// parse path.
pub fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read coverage input: {}", path.display()))
}
