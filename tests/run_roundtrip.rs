use std::fs;

use ridicule::{run, Config, Error};

const STORE: &str = "package store\n\
\n\
import \"context\"\n\
\n\
type Store interface {\n\
\tGet(ctx context.Context, key string) ([]byte, error)\n\
\tPut(ctx context.Context, key string, value []byte) error\n\
}\n";

#[test]
fn writes_next_to_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("store.go");
    fs::write(&source, STORE).unwrap();

    let config = Config::new(source, None, true).unwrap();
    let report = run(&config).unwrap();

    assert_eq!(report.destination, dir.path().join("store_mock.go"));
    assert_eq!(report.interfaces, 1);
    assert_eq!(report.methods, 2);
    assert!(report.warnings.is_empty());
    assert!(report.normalized);

    let written = fs::read_to_string(&report.destination).unwrap();
    assert!(written.starts_with(
        "// Code generated by ridicule. DO NOT EDIT.\n// Source: store.go\n\npackage store\n"
    ));
    assert!(written.contains("func (mock *MockStore) Put(ctx context.Context, key string, value []byte) (r0 error) {"));
}

#[test]
fn rerun_replaces_the_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("store.go");
    let dest = dir.path().join("mocks.go");
    fs::write(&source, STORE).unwrap();
    fs::write(&dest, "stale").unwrap();

    let config = Config::new(source, Some(dest.clone()), false).unwrap();
    run(&config).unwrap();
    let first = fs::read_to_string(&dest).unwrap();
    run(&config).unwrap();

    assert_eq!(fs::read_to_string(&dest).unwrap(), first);
    assert!(first.starts_with("package store\n"));
    let entries = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 2, "no temporaries left behind");
}

#[test]
fn missing_source_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new(dir.path().join("nope.go"), None, true).unwrap();
    let err = run(&config).unwrap_err();
    assert!(matches!(err, Error::Read { .. }), "{err:?}");
    assert!(!dir.path().join("nope_mock.go").exists());
}

#[test]
fn parse_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("bad.go");
    fs::write(&source, "type I interface {}\n").unwrap();

    let config = Config::new(source, None, true).unwrap();
    let err = run(&config).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "{err:?}");
    assert!(!dir.path().join("bad_mock.go").exists());
}
