//! Ingestion formats that produce a [`CoverageSet`].
//!
//! Format support grew over time (plain function names, file-qualified names,
//! raw profile text, structured JSON export), so the formats form a small
//! closed set of tagged variants behind one [`parse`] entry point rather than
//! ad hoc per-format globals.

pub mod export;
pub mod raw_profile;

pub use export::parse_json_export;
pub use raw_profile::parse_raw_profile_text;

use crate::model::{CoverageError, CoverageSet};

/// What to do with functions whose recorded call count is zero.
///
/// Dropping them keeps serialized output small; keeping them distinguishes
/// "parsed as zero" from "never observed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroCountPolicy {
    /// Omit zero-count functions from the resulting set (the default).
    #[default]
    Drop,
    /// Retain zero-count functions as explicit keys.
    Keep,
}

/// The closed set of input formats covdiff understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Textual dump from `llvm-profdata show --all-functions --text`.
    RawProfileText,
    /// Structured JSON from `llvm-cov export`.
    JsonExport,
    /// covdiff's own canonical persisted JSON form.
    PersistedJson,
}

impl FormatKind {
    /// Resolve a user-facing format name (as accepted by the CLI).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "raw-text" => Some(Self::RawProfileText),
            "json-export" => Some(Self::JsonExport),
            "persisted" => Some(Self::PersistedJson),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RawProfileText => "raw-text",
            Self::JsonExport => "json-export",
            Self::PersistedJson => "persisted",
        }
    }
}

/// Parse `input` in the given format into a [`CoverageSet`].
///
/// The zero-count policy applies to the tool formats; the persisted form
/// round-trips exactly what was saved.
pub fn parse(
    kind: FormatKind,
    input: &str,
    zero_counts: ZeroCountPolicy,
) -> Result<CoverageSet, CoverageError> {
    match kind {
        FormatKind::RawProfileText => parse_raw_profile_text(input, zero_counts),
        FormatKind::JsonExport => parse_json_export(input, zero_counts),
        FormatKind::PersistedJson => CoverageSet::from_json(input),
    }
}
