use std::fs;
use std::path::{Path, PathBuf};

use predicates::prelude::*;
use tempfile::tempdir;

fn write_persisted(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

/// Persisted-JSON inputs diff end to end, ordered by ascending absolute
/// difference with the file prefix rendered only for file-qualified keys.
#[test]
fn diff_persisted_inputs_prints_ordered_differences() {
    let dir = tempdir().unwrap();
    let a = write_persisted(
        dir.path(),
        "a.json",
        r#"{"files": {"": {"fn_small": 2, "fn_big": 9}, "quick.cpp": {"swap": 3}}}"#,
    );
    let b = write_persisted(
        dir.path(),
        "b.json",
        r#"{"files": {"": {"fn_small": 1, "fn_big": 4}, "quick.cpp": {"swap": 4}}}"#,
    );

    assert_cmd::cargo::cargo_bin_cmd!("covdiff")
        .arg("diff")
        .arg(&a)
        .arg(&b)
        .arg("--no-demangle")
        .assert()
        .success()
        .stdout(
            "fn_small call count difference: 2 != 1\n\
             quick.cpp: swap call count difference: 3 != 4\n\
             fn_big call count difference: 9 != 4\n",
        );
}

/// Diffing a run against itself prints nothing.
#[test]
fn diff_identical_inputs_prints_nothing() {
    let dir = tempdir().unwrap();
    let a = write_persisted(dir.path(), "a.json", r#"{"files": {"": {"fn": 5}}}"#);

    assert_cmd::cargo::cargo_bin_cmd!("covdiff")
        .arg("diff")
        .arg(&a)
        .arg(&a)
        .arg("--no-demangle")
        .assert()
        .success()
        .stdout("");
}

/// llvm-cov export documents diff when the format is forced.
#[test]
fn diff_json_export_inputs_with_explicit_format() {
    let dir = tempdir().unwrap();
    let a = write_persisted(
        dir.path(),
        "a.export.json",
        r#"{"data": [{"functions": [{"name": "fn", "count": 5}]}]}"#,
    );
    let b = write_persisted(
        dir.path(),
        "b.export.json",
        r#"{"data": [{"functions": [{"name": "fn", "count": 3}]}]}"#,
    );

    assert_cmd::cargo::cargo_bin_cmd!("covdiff")
        .arg("diff")
        .arg(&a)
        .arg(&b)
        .args(["--format", "json-export", "--no-demangle"])
        .assert()
        .success()
        .stdout("fn call count difference: 5 != 3\n");
}

/// .profraw inputs go through the llvm-profdata dump path; with the dump
/// faked the same text serves both sides, so the diff is empty.
#[test]
fn diff_profraw_inputs_via_fake_profdata_dump() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.profraw");
    let b = dir.path().join("b.profraw");
    fs::write(&a, b"raw").unwrap();
    fs::write(&b, b"raw").unwrap();

    let fake_text = dir.path().join("show.txt");
    fs::write(
        &fake_text,
        "  main:\n    Hash: 0x01\n    Counters: 1\n    Function count: 1\nInstrumentation level: Front-end\n",
    )
    .unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("covdiff")
        .arg("diff")
        .arg(&a)
        .arg(&b)
        .arg("--no-demangle")
        .env("COVDIFF_FAKE_PROFDATA_TEXT", &fake_text)
        .assert()
        .success()
        .stdout("");
}

/// An explicitly requested demangler rewrites names before diffing.
#[test]
fn diff_with_explicit_demangler_rewrites_names() {
    let dir = tempdir().unwrap();
    let a = write_persisted(dir.path(), "a.json", r#"{"files": {"": {"_Z8MangledAv": 5}}}"#);
    let b = write_persisted(dir.path(), "b.json", r#"{"files": {}}"#);

    let fake_demangled = dir.path().join("demangled.txt");
    fs::write(&fake_demangled, "MangledA()\n").unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("covdiff")
        .arg("diff")
        .arg(&a)
        .arg(&b)
        .args(["--demangler", "c++filt -n"])
        .env("COVDIFF_FAKE_DEMANGLED", &fake_demangled)
        .assert()
        .success()
        .stdout("MangledA() call count difference: 5 != 0\n");
}

/// A broken explicit demangler aborts the diff; the implicit default one
/// fails silently instead.
#[test]
fn diff_explicit_demangler_failure_is_fatal() {
    let dir = tempdir().unwrap();
    let a = write_persisted(dir.path(), "a.json", r#"{"files": {"": {"_Z2fnv": 1}}}"#);
    let b = write_persisted(dir.path(), "b.json", r#"{"files": {}}"#);

    assert_cmd::cargo::cargo_bin_cmd!("covdiff")
        .arg("diff")
        .arg(&a)
        .arg(&b)
        .args(["--demangler", "c--filt-definitely-not-installed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to demangle"));
}

/// Malformed persisted JSON exits non-zero with a typed parse error.
#[test]
fn diff_malformed_persisted_json_fails() {
    let dir = tempdir().unwrap();
    let a = write_persisted(dir.path(), "a.json", r#"{"functions": {}}"#);
    let b = write_persisted(dir.path(), "b.json", r#"{"files": {}}"#);

    assert_cmd::cargo::cargo_bin_cmd!("covdiff")
        .arg("diff")
        .arg(&a)
        .arg(&b)
        .arg("--no-demangle")
        .assert()
        .failure()
        .stderr(predicate::str::contains("persisted coverage JSON"));
}
