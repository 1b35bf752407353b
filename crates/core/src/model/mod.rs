//! Coverage data model: function keys, call-count sets, and their persisted
//! JSON form.
//!
//! A [`CoverageSet`] holds the call counts recorded for one instrumented run.
//! It is constructed empty, populated by repeated [`CoverageSet::record`]
//! calls during parsing or loading, and then handed to the diff engine.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the coverage model, parsers, and demangling adapter.
#[derive(Debug, Error)]
pub enum CoverageError {
    /// The input document does not match the expected grammar/schema.
    #[error("Malformed coverage input: {0}")]
    MalformedInput(String),
    /// A key was recorded twice with conflicting non-zero counts.
    #[error("Call count for function `{function}` in file `{file}` was already recorded")]
    DuplicateKey { file: String, function: String },
    /// The demangler returned a different number of names than were sent.
    #[error("Name translation returned {received} names for {sent} inputs")]
    TranslationCountMismatch { sent: usize, received: usize },
    /// The external demangler could not be invoked or misbehaved.
    #[error("Demangler error: {0}")]
    Translator(String),
}

/// Identifies one instrumented function within a coverage set.
///
/// `file` is empty when the source format does not record a file path (e.g. a
/// pure function-name stream). An empty file and a real filename are distinct
/// keys even for the same function name.
///
/// The derived `Ord` is lexicographic by (file, function), which is the
/// deterministic tie-break order used by the diff engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionKey {
    pub file: String,
    pub function: String,
}

impl FunctionKey {
    pub fn new(file: impl Into<String>, function: impl Into<String>) -> Self {
        Self { file: file.into(), function: function.into() }
    }

    /// Human-readable `<file: >function` label; the `file: ` prefix is
    /// included only when `file` is non-empty.
    pub fn qualified_name(&self) -> String {
        if self.file.is_empty() {
            self.function.clone()
        } else {
            format!("{}: {}", self.file, self.function)
        }
    }
}

/// Canonical on-disk shape: files -> function -> count.
///
/// BTreeMaps keep the serialized key order stable across runs so saved files
/// stay diffable.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedCoverage {
    files: BTreeMap<String, BTreeMap<String, u64>>,
}

/// A mapping from [`FunctionKey`] to a non-negative call count for one run.
///
/// Keys are unique within a set; iteration order is unspecified. Recording a
/// key that already holds a non-zero count fails with
/// [`CoverageError::DuplicateKey`] rather than silently overwriting, since a
/// silent overwrite hides malformed input. Re-recording over a zero count is
/// allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageSet {
    counts: HashMap<FunctionKey, u64>,
}

impl CoverageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the call count for `(file, function)`.
    pub fn record(
        &mut self,
        file: impl Into<String>,
        function: impl Into<String>,
        count: u64,
    ) -> Result<(), CoverageError> {
        self.record_key(FunctionKey::new(file, function), count)
    }

    /// Store the call count for an already-built key.
    pub fn record_key(&mut self, key: FunctionKey, count: u64) -> Result<(), CoverageError> {
        if let Some(&existing) = self.counts.get(&key) {
            if existing != 0 {
                return Err(CoverageError::DuplicateKey {
                    file: key.file,
                    function: key.function,
                });
            }
        }
        self.counts.insert(key, count);
        Ok(())
    }

    /// The recorded count, or 0 if the key is absent. Absence is not an
    /// error; it represents "never observed".
    pub fn call_count(&self, file: &str, function: &str) -> u64 {
        self.counts
            .get(&FunctionKey { file: file.to_string(), function: function.to_string() })
            .copied()
            .unwrap_or(0)
    }

    /// The recorded count for a key, or 0 if absent.
    pub fn count_for(&self, key: &FunctionKey) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// All recorded keys, in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &FunctionKey> {
        self.counts.keys()
    }

    /// All recorded (key, count) pairs, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&FunctionKey, u64)> {
        self.counts.iter().map(|(k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Serialize to the canonical persisted JSON form (§ persisted format):
    /// `{"files": {"<file-or-empty>": {"<function>": <count>, ...}, ...}}`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_persisted())
    }

    /// Pretty-printed variant of [`CoverageSet::to_json`] for saved files.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_persisted())
    }

    /// Reconstruct a set from the canonical persisted JSON form.
    ///
    /// A document missing the top-level `files` key, or carrying negative or
    /// non-integer counts, is rejected as [`CoverageError::MalformedInput`].
    pub fn from_json(input: &str) -> Result<Self, CoverageError> {
        let decoded: PersistedCoverage =
            serde_json::from_str(input).map_err(|e| CoverageError::MalformedInput(e.to_string()))?;
        let mut set = CoverageSet::new();
        for (file, functions) in decoded.files {
            for (function, count) in functions {
                set.record(file.clone(), function, count)?;
            }
        }
        Ok(set)
    }

    fn to_persisted(&self) -> PersistedCoverage {
        let mut files: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
        for (key, count) in self.iter() {
            files.entry(key.file.clone()).or_default().insert(key.function.clone(), count);
        }
        PersistedCoverage { files }
    }
}
