use std::path::Path;

use anyhow::{Context, Result};

use covdiff_core::profile::{metadata_path, record_raw_profile};

/// Run an instrumented executable and record its raw coverage profile.
pub fn record_command(executable: &str, output: &str, args: &[String]) -> Result<()> {
    let output_path = Path::new(output);
    let metadata = record_raw_profile(Path::new(executable), args, output_path)
        .with_context(|| format!("Failed to record coverage for {executable}"))?;

    println!("Recorded raw coverage:");
    println!("  Profile: {output}");
    println!("  Executable: {}", metadata.executable);
    println!("  SHA-256: {}", metadata.sha256);
    println!("  Recorded at: {}", metadata.recorded_at);
    println!("  Metadata: {}", metadata_path(output_path).display());

    Ok(())
}
