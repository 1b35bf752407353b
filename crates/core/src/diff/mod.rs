//! Diff engine: compares two coverage sets and produces a deterministic,
//! sorted list of human-readable call-count differences.

use std::collections::BTreeSet;
use std::fmt;

use crate::model::{CoverageSet, FunctionKey};

/// One function whose call count differs between run A and run B.
///
/// Renders as `<file: >function call count difference: <a> != <b>`; the
/// `file: ` prefix appears only when the key carries a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallCountDifference {
    pub key: FunctionKey,
    pub count_a: u64,
    pub count_b: u64,
}

impl CallCountDifference {
    /// Absolute call count difference; the primary sort key of a report.
    pub fn magnitude(&self) -> u64 {
        self.count_a.abs_diff(self.count_b)
    }
}

impl fmt::Display for CallCountDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} call count difference: {} != {}",
            self.key.qualified_name(),
            self.count_a,
            self.count_b
        )
    }
}

/// Compare two coverage sets.
///
/// Produces one difference per key in the union of both sets' keys whose
/// counts differ; a key absent from one side counts as 0 there. Ordering is
/// ascending by absolute difference, with ties broken by [`FunctionKey`]
/// lexicographic order so output is reproducible regardless of internal map
/// iteration order. Never fails on well-formed sets; this function performs
/// no I/O.
pub fn diff(a: &CoverageSet, b: &CoverageSet) -> Vec<CallCountDifference> {
    // BTreeSet both dedups the union and fixes a deterministic visit order.
    let keys: BTreeSet<&FunctionKey> = a.keys().chain(b.keys()).collect();

    let mut differences: Vec<CallCountDifference> = keys
        .into_iter()
        .filter_map(|key| {
            let count_a = a.count_for(key);
            let count_b = b.count_for(key);
            if count_a == count_b {
                return None;
            }
            Some(CallCountDifference { key: key.clone(), count_a, count_b })
        })
        .collect();

    differences
        .sort_by(|x, y| x.magnitude().cmp(&y.magnitude()).then_with(|| x.key.cmp(&y.key)));
    differences
}
