use anyhow::Result;
use clap::{Parser, Subcommand};
use covdiff::commands;

/// Coverage call-count diffing CLI.
///
/// This CLI is a thin wrapper around `covdiff-core` (exposed in code as
/// `covdiff_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "covdiff",
    version,
    about = "Diff function call counts between two instrumented runs",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an instrumented executable and record a raw coverage profile.
    ///
    /// The executable must be built with the
    /// "-fprofile-instr-generate -fcoverage-mapping" flags; the profile is
    /// directed to the output file via the LLVM_PROFILE_FILE environment
    /// variable. Run metadata (executable hash, timestamp) is written next
    /// to the profile.
    Record {
        /// Executable to run.
        executable: String,

        /// Output raw coverage file (e.g. coverage.profraw).
        #[arg(short, long)]
        output: String,

        /// Additional arguments forwarded to the executable.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Compare two coverage inputs and print call count differences.
    ///
    /// Prints one difference per line, ordered by ascending absolute call
    /// count difference. Inputs may be raw profiles (dumped through
    /// llvm-profdata), persisted coverage JSON, or llvm-cov JSON exports;
    /// the format is inferred from the extension unless --format is given.
    Diff {
        /// Coverage input for run A.
        coverage_a: String,

        /// Coverage input for run B.
        coverage_b: String,

        /// Input format for both sides: raw-text, json-export, or persisted.
        #[arg(long)]
        format: Option<String>,

        /// Demangler command (e.g. "c++filt -n"). Without this flag,
        /// "c++filt -n" is tried and failures are ignored; with it, a
        /// demangling failure aborts the diff.
        #[arg(short, long)]
        demangler: Option<String>,

        /// Skip demangling entirely.
        #[arg(long, default_value_t = false)]
        no_demangle: bool,

        /// Keep zero-count functions instead of dropping them.
        #[arg(long, default_value_t = false)]
        keep_zero_counts: bool,
    },

    /// Convert a coverage input into the canonical persisted JSON form.
    Convert {
        /// Coverage input to convert.
        input: String,

        /// Input format: raw-text, json-export, or persisted.
        #[arg(long)]
        format: Option<String>,

        /// Output file; prints to stdout when omitted.
        #[arg(short, long)]
        output: Option<String>,

        /// Pretty-print the JSON output.
        #[arg(long, default_value_t = false)]
        pretty: bool,

        /// Keep zero-count functions instead of dropping them.
        #[arg(long, default_value_t = false)]
        keep_zero_counts: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Record { executable, output, args } => {
            commands::record_command(&executable, &output, &args)?
        }
        Command::Diff {
            coverage_a,
            coverage_b,
            format,
            demangler,
            no_demangle,
            keep_zero_counts,
        } => commands::diff_command(
            &coverage_a,
            &coverage_b,
            format.as_deref(),
            demangler,
            no_demangle,
            keep_zero_counts,
        )?,
        Command::Convert { input, format, output, pretty, keep_zero_counts } => {
            commands::convert_command(&input, format.as_deref(), output, pretty, keep_zero_counts)?
        }
    }

    Ok(())
}
