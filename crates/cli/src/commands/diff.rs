use std::path::Path;

use anyhow::{Context, Result};

use covdiff_core::demangle::{demangle, CxxFiltTranslator};
use covdiff_core::diff::diff;
use covdiff_core::model::CoverageSet;

use crate::commands::{load_coverage, resolve_format, zero_count_policy};

/// Compare two coverage inputs and print one call count difference per line,
/// ordered by ascending absolute difference.
pub fn diff_command(
    coverage_a: &str,
    coverage_b: &str,
    format: Option<&str>,
    demangler: Option<String>,
    no_demangle: bool,
    keep_zero_counts: bool,
) -> Result<()> {
    let format = resolve_format(format)?;
    let zero_counts = zero_count_policy(keep_zero_counts);

    let mut set_a = load_coverage(Path::new(coverage_a), format, zero_counts)?;
    let mut set_b = load_coverage(Path::new(coverage_b), format, zero_counts)?;

    if !no_demangle {
        match demangler {
            Some(command) => {
                // An explicitly requested demangler must work.
                let translator = CxxFiltTranslator::new(&command);
                demangle(&mut set_a, &translator)
                    .with_context(|| format!("Failed to demangle {coverage_a} via `{command}`"))?;
                demangle(&mut set_b, &translator)
                    .with_context(|| format!("Failed to demangle {coverage_b} via `{command}`"))?;
            }
            None => try_default_demangle(&mut set_a, &mut set_b),
        }
    }

    for difference in diff(&set_a, &set_b) {
        println!("{difference}");
    }

    Ok(())
}

/// Try demangling both sets with `c++filt -n`, failing silently.
///
/// Both sets are remapped or neither is, so the two sides always diff under
/// the same naming. `-n` forces GNU underscore handling on MacOS's older
/// c++filt.
fn try_default_demangle(set_a: &mut CoverageSet, set_b: &mut CoverageSet) {
    let translator = CxxFiltTranslator::default_tool();
    let mut demangled_a = set_a.clone();
    let mut demangled_b = set_b.clone();
    if demangle(&mut demangled_a, &translator).is_ok()
        && demangle(&mut demangled_b, &translator).is_ok()
    {
        *set_a = demangled_a;
        *set_b = demangled_b;
    }
}
