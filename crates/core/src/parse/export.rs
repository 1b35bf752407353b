//! Parser for the structured JSON export produced by `llvm-cov export`.
//!
//! Only `data[0].functions[].name` and `.count` are consumed; region,
//! segment, and expansion detail is ignored (function-level granularity
//! only).

use std::collections::HashSet;

use serde::Deserialize;

use crate::model::{CoverageError, CoverageSet};
use crate::parse::ZeroCountPolicy;

#[derive(Debug, Deserialize)]
struct ExportDocument {
    data: Vec<ExportData>,
}

#[derive(Debug, Deserialize)]
struct ExportData {
    #[serde(default)]
    functions: Vec<ExportFunction>,
}

#[derive(Debug, Deserialize)]
struct ExportFunction {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    count: Option<u64>,
}

/// Parse an `llvm-cov export` JSON document into a [`CoverageSet`].
///
/// A document missing the top-level `data` array (or with an empty one) is
/// rejected whole as [`CoverageError::MalformedInput`]. Entries missing
/// `name` or `count` are skipped. The export format defines at most one
/// entry per function; a duplicate name is a data error reported as
/// [`CoverageError::DuplicateKey`], never silently reduced.
pub fn parse_json_export(
    input: &str,
    zero_counts: ZeroCountPolicy,
) -> Result<CoverageSet, CoverageError> {
    let document: ExportDocument =
        serde_json::from_str(input).map_err(|e| CoverageError::MalformedInput(e.to_string()))?;
    let first = document
        .data
        .first()
        .ok_or_else(|| CoverageError::MalformedInput("export `data` array is empty".to_string()))?;

    let mut set = CoverageSet::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for function in &first.functions {
        let (name, count) = match (&function.name, function.count) {
            (Some(name), Some(count)) => (name, count),
            _ => continue,
        };
        if !seen.insert(name.as_str()) {
            return Err(CoverageError::DuplicateKey {
                file: String::new(),
                function: name.clone(),
            });
        }
        if count > 0 || zero_counts == ZeroCountPolicy::Keep {
            // Export entries carry no file path; all keys land in the empty file.
            set.record("", name.clone(), count)?;
        }
    }

    Ok(set)
}
