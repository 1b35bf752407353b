//! Demangling adapter: rewrites a coverage set's function names through an
//! externally supplied name-translation capability.
//!
//! The translation itself (typically `c++filt`) is an external collaborator.
//! The core only knows the [`NameTranslator`] trait: an ordered batch of N
//! mangled names in, N translated names out.

use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use crate::model::{CoverageError, CoverageSet, FunctionKey};

/// Batch name-translation capability (demangling).
///
/// Implementations must return exactly one output name per input name, in
/// the same order. Names they do not recognize as mangled are returned
/// unchanged.
pub trait NameTranslator {
    fn translate(&self, names: &[String]) -> Result<Vec<String>, CoverageError>;
}

/// Rewrite every function name in `set` through `translator`, leaving counts
/// and file fields untouched.
///
/// All names are sent in one batch; translation *i* maps back onto the key
/// that contributed name *i*. If the translator returns the wrong number of
/// names the call fails with [`CoverageError::TranslationCountMismatch`] and
/// `set` is left unmodified. Two names translating to the same result stay
/// distinct keys under different files; a collision under the same file hits
/// the duplicate-key policy. Either failure leaves `set` untouched.
pub fn demangle(
    set: &mut CoverageSet,
    translator: &dyn NameTranslator,
) -> Result<(), CoverageError> {
    if set.is_empty() {
        return Ok(());
    }

    // Fix the batch order by key so a collision between a zero and a
    // non-zero count resolves the same way on every run, rather than by
    // map iteration order.
    let mut entries: Vec<(FunctionKey, u64)> = set.iter().map(|(k, c)| (k.clone(), c)).collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let names: Vec<String> = entries.iter().map(|(key, _)| key.function.clone()).collect();

    let translated = translator.translate(&names)?;
    if translated.len() != names.len() {
        return Err(CoverageError::TranslationCountMismatch {
            sent: names.len(),
            received: translated.len(),
        });
    }

    // Rebuild into a fresh set and swap only on full success, so a
    // duplicate-key collision cannot leave a partially remapped set behind.
    let mut rebuilt = CoverageSet::new();
    for ((key, count), name) in entries.into_iter().zip(translated) {
        rebuilt.record(key.file, name, count)?;
    }
    *set = rebuilt;
    Ok(())
}

/// Demangler backed by an external filter process, `c++filt -n` by default.
///
/// The command is given as a single string and split on whitespace, matching
/// how a demangler is typically passed on the command line. Mangled names go
/// to the child's stdin one per line; translated names come back one per
/// line on stdout.
///
/// MacOS's c++filt strips leading underscores by default, unlike GNU
/// c++filt; `-n` forces the GNU behavior on both.
pub struct CxxFiltTranslator {
    command: String,
}

impl CxxFiltTranslator {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }

    pub fn default_tool() -> Self {
        Self::new("c++filt -n")
    }
}

impl NameTranslator for CxxFiltTranslator {
    fn translate(&self, names: &[String]) -> Result<Vec<String>, CoverageError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        // Allow tests to feed synthetic output via env to avoid needing a
        // demangler installed.
        if let Some(fake) = std::env::var_os("COVDIFF_FAKE_DEMANGLED") {
            let body = fs::read_to_string(&fake).map_err(|e| {
                CoverageError::Translator(format!("failed to read COVDIFF_FAKE_DEMANGLED: {e}"))
            })?;
            return Ok(body.lines().map(|line| line.to_string()).collect());
        }

        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| CoverageError::Translator("empty demangler command".to_string()))?;

        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CoverageError::Translator(format!("failed to spawn {program}: {e}")))?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            CoverageError::Translator(format!("no stdin handle for {program}"))
        })?;
        let payload = format!("{}\n", names.join("\n"));
        stdin
            .write_all(payload.as_bytes())
            .map_err(|e| CoverageError::Translator(format!("failed to write to {program}: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .map_err(|e| CoverageError::Translator(format!("failed to wait for {program}: {e}")))?;
        if !output.status.success() {
            return Err(CoverageError::Translator(format!(
                "{program} exited with {}",
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().map(|line| line.to_string()).collect())
    }
}
