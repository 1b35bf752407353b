//! Parser for the textual dump produced by `llvm-profdata show
//! --all-functions --text`.
//!
//! The dump is a sequence of per-function blocks followed by a summary
//! trailer:
//!
//! ```text
//! Counters:
//!   file.cpp:functionName:
//!     Hash: 0x000000000000000a
//!     Counters: 2
//!     Function count: 5
//! Instrumentation level: Front-end
//! Total functions: 1
//! ...
//! ```
//!
//! Blocks missing any of the `Hash`/`Counters`/`Function count` fields are
//! skipped rather than failing the whole document; the tool must still report
//! the counters it could parse.

use crate::model::{CoverageError, CoverageSet};
use crate::parse::ZeroCountPolicy;

/// First line of the summary trailer emitted after the function blocks.
const SUMMARY_MARKER: &str = "Instrumentation level:";

/// Parse raw profile text into a [`CoverageSet`].
pub fn parse_raw_profile_text(
    input: &str,
    zero_counts: ZeroCountPolicy,
) -> Result<CoverageSet, CoverageError> {
    let body = strip_summary_trailer(input);
    let lines: Vec<&str> = body.lines().collect();

    let mut set = CoverageSet::new();
    let mut i = 0;
    while i < lines.len() {
        // A block starts at a label line (ends with ':') whose next line is
        // the Hash field. This also skips the leading "Counters:" section
        // header, which is followed by another label rather than a field.
        let label = lines[i].trim();
        let next_is_hash =
            i + 1 < lines.len() && lines[i + 1].trim().starts_with("Hash:");
        if label.is_empty() || !label.ends_with(':') || !next_is_hash {
            i += 1;
            continue;
        }

        // Collect the block's field lines.
        let mut hash = None;
        let mut counters = None;
        let mut function_count = None;
        let mut j = i + 1;
        while j < lines.len() {
            let field = lines[j].trim();
            if let Some(value) = field.strip_prefix("Hash:") {
                hash = Some(value.trim());
            } else if let Some(value) = field.strip_prefix("Counters:") {
                counters = Some(value.trim());
            } else if let Some(value) = field.strip_prefix("Function count:") {
                function_count = Some(value.trim());
            } else {
                break;
            }
            j += 1;
        }

        // Malformed blocks (missing fields, unparsable count) are skipped.
        let count = match (hash, counters, function_count) {
            (Some(_), Some(_), Some(raw)) => raw.parse::<u64>().ok(),
            _ => None,
        };
        if let Some(count) = count {
            let (file, function) = split_label(label);
            if count > 0 || zero_counts == ZeroCountPolicy::Keep {
                set.record(file, function, count)?;
            }
        }

        i = j;
    }

    Ok(set)
}

/// Drop everything from the summary trailer onward. A dump without a trailer
/// is tolerated; the whole input is then treated as function blocks.
fn strip_summary_trailer(input: &str) -> &str {
    for line in input.lines() {
        if line.trim_start().starts_with(SUMMARY_MARKER) {
            // Lines borrow from `input`, so the line's start offset within
            // `input` falls out of pointer arithmetic.
            let offset = line.as_ptr() as usize - input.as_ptr() as usize;
            return &input[..offset];
        }
    }
    input
}

/// Split a block label into (file, function) on the last colon-separated
/// segment. A label with no interior colon has no file.
fn split_label(label: &str) -> (String, String) {
    let label = label.strip_suffix(':').unwrap_or(label);
    match label.rsplit_once(':') {
        Some((file, function)) => (file.to_string(), function.to_string()),
        None => (String::new(), label.to_string()),
    }
}
