use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::commands::{load_coverage, resolve_format, zero_count_policy};

/// Ingest a coverage input and emit the canonical persisted JSON form.
pub fn convert_command(
    input: &str,
    format: Option<&str>,
    output: Option<String>,
    pretty: bool,
    keep_zero_counts: bool,
) -> Result<()> {
    let format = resolve_format(format)?;
    let zero_counts = zero_count_policy(keep_zero_counts);

    let coverage = load_coverage(Path::new(input), format, zero_counts)?;
    let json = if pretty { coverage.to_json_pretty() } else { coverage.to_json() }
        .context("Failed to serialize coverage to JSON")?;

    match output {
        Some(path) => {
            fs::write(&path, &json)
                .with_context(|| format!("Failed to write coverage JSON to {path}"))?;
            println!("Wrote {} functions to {path}", coverage.len());
        }
        None => println!("{json}"),
    }

    Ok(())
}
