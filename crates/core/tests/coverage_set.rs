use covdiff_core::model::{CoverageError, CoverageSet, FunctionKey};

fn simple_coverage() -> CoverageSet {
    let mut coverage = CoverageSet::new();
    coverage.record("", "fn1", 1).unwrap();
    coverage.record("", "fn2", 2).unwrap();
    coverage.record("file.cpp", "fn3", 3).unwrap();
    coverage
}

#[test]
fn library_reports_its_version() {
    assert_eq!(covdiff_core::version(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn new_set_is_empty() {
    let coverage = CoverageSet::new();
    assert!(coverage.is_empty());
    assert_eq!(coverage.len(), 0);
}

#[test]
fn recorded_counts_are_returned() {
    let mut coverage = CoverageSet::new();
    coverage.record("", "fn1", 1).unwrap();
    assert_eq!(coverage.call_count("", "fn1"), 1);
    coverage.record("", "fn2", 2).unwrap();
    assert_eq!(coverage.call_count("", "fn2"), 2);
}

#[test]
fn absent_key_reads_as_zero() {
    let coverage = simple_coverage();
    assert_eq!(coverage.call_count("", "never_seen"), 0);
    // An empty file and a real filename are distinct keys.
    assert_eq!(coverage.call_count("other.cpp", "fn1"), 0);
}

#[test]
fn duplicate_nonzero_recording_is_rejected() {
    let mut coverage = CoverageSet::new();
    coverage.record("", "fn1", 1).unwrap();
    let err = coverage.record("", "fn1", 3).unwrap_err();
    assert!(matches!(
        err,
        CoverageError::DuplicateKey { ref file, ref function } if file.is_empty() && function == "fn1"
    ));
    // The original count survives the failed recording.
    assert_eq!(coverage.call_count("", "fn1"), 1);
}

#[test]
fn zero_count_may_be_overwritten() {
    let mut coverage = CoverageSet::new();
    coverage.record("", "fn1", 0).unwrap();
    coverage.record("", "fn1", 5).unwrap();
    assert_eq!(coverage.call_count("", "fn1"), 5);
}

#[test]
fn same_function_in_different_files_is_distinct() {
    let mut coverage = CoverageSet::new();
    coverage.record("", "fn1", 1).unwrap();
    coverage.record("file.cpp", "fn1", 3).unwrap();
    assert_eq!(coverage.call_count("", "fn1"), 1);
    assert_eq!(coverage.call_count("file.cpp", "fn1"), 3);
    assert_eq!(coverage.len(), 2);
}

#[test]
fn qualified_name_includes_file_only_when_present() {
    assert_eq!(FunctionKey::new("", "fn").qualified_name(), "fn");
    assert_eq!(FunctionKey::new("a.cpp", "fn").qualified_name(), "a.cpp: fn");
}

#[test]
fn json_encoding_uses_files_nesting() {
    let coverage = simple_coverage();
    let json = coverage.to_json().unwrap();
    // BTreeMap serialization sorts files and functions, so the exact string
    // is stable.
    assert_eq!(json, r#"{"files":{"":{"fn1":1,"fn2":2},"file.cpp":{"fn3":3}}}"#);
}

#[test]
fn json_round_trip_is_lossless() {
    let coverage = simple_coverage();
    let decoded = CoverageSet::from_json(&coverage.to_json().unwrap()).unwrap();
    assert_eq!(decoded.len(), coverage.len());
    for (key, count) in coverage.iter() {
        assert_eq!(decoded.call_count(&key.file, &key.function), count);
    }
    assert_eq!(decoded, coverage);
}

#[test]
fn from_json_rejects_missing_files_key() {
    let err = CoverageSet::from_json(r#"{"functions": {}}"#).unwrap_err();
    assert!(matches!(err, CoverageError::MalformedInput(_)));
}

#[test]
fn from_json_rejects_negative_counts() {
    let err = CoverageSet::from_json(r#"{"files": {"": {"fn": -1}}}"#).unwrap_err();
    assert!(matches!(err, CoverageError::MalformedInput(_)));
}

#[test]
fn from_json_rejects_non_json_input() {
    let err = CoverageSet::from_json("not json at all").unwrap_err();
    assert!(matches!(err, CoverageError::MalformedInput(_)));
}
