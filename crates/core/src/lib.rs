//! covdiff-core
//!
//! Core library for diffing function call counts between two instrumented
//! runs of (possibly two builds of) the same program.
//!
//! This crate defines the coverage data model, the parsers that turn external
//! tool output into coverage sets, the diff engine, the demangling adapter,
//! and thin wrappers around the LLVM profiling toolchain.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends (CLI, scripting bindings, etc.).

pub mod demangle;
pub mod diff;
pub mod model;
pub mod parse;
pub mod profile;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
