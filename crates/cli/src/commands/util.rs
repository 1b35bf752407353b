use std::path::Path;

use anyhow::{anyhow, Context, Result};

use covdiff_core::model::CoverageSet;
use covdiff_core::parse::{self, FormatKind, ZeroCountPolicy};
use covdiff_core::profile::LlvmToolchain;

use crate::read_input;

/// Resolve an explicit `--format` flag value, if one was given.
pub fn resolve_format(flag: Option<&str>) -> Result<Option<FormatKind>> {
    match flag {
        None => Ok(None),
        Some(name) => FormatKind::from_name(name).map(Some).ok_or_else(|| {
            anyhow!("Unknown format `{name}`; expected raw-text, json-export, or persisted")
        }),
    }
}

/// Load one coverage input into a [`CoverageSet`].
///
/// With an explicit format the file is read as text and handed to that
/// parser. Otherwise the extension decides: `.profraw`/`.profdata` are
/// dumped through `llvm-profdata show` first, `.json` is treated as the
/// canonical persisted form, and anything else as an already-dumped raw
/// profile text.
pub fn load_coverage(
    path: &Path,
    format: Option<FormatKind>,
    zero_counts: ZeroCountPolicy,
) -> Result<CoverageSet> {
    if let Some(kind) = format {
        let body = read_input(path)?;
        return parse::parse(kind, &body, zero_counts)
            .with_context(|| format!("Failed to parse {} as {}", path.display(), kind.name()));
    }

    let extension = path.extension().and_then(|os| os.to_str()).unwrap_or("");
    match extension {
        "profraw" | "profdata" => {
            let toolchain = LlvmToolchain::resolve();
            let text = toolchain
                .show_text(path)
                .with_context(|| format!("Failed to dump profile {}", path.display()))?;
            parse::parse(FormatKind::RawProfileText, &text, zero_counts)
                .with_context(|| format!("Failed to parse profile dump for {}", path.display()))
        }
        "json" => {
            let body = read_input(path)?;
            parse::parse(FormatKind::PersistedJson, &body, zero_counts).with_context(|| {
                format!("Failed to parse {} as persisted coverage JSON", path.display())
            })
        }
        _ => {
            let body = read_input(path)?;
            parse::parse(FormatKind::RawProfileText, &body, zero_counts)
                .with_context(|| format!("Failed to parse {} as raw profile text", path.display()))
        }
    }
}

/// Map the `--keep-zero-counts` flag onto the parser policy.
pub fn zero_count_policy(keep_zero_counts: bool) -> ZeroCountPolicy {
    if keep_zero_counts {
        ZeroCountPolicy::Keep
    } else {
        ZeroCountPolicy::Drop
    }
}
