use std::path::Path;

use ridicule::{generate, SynthOptions};

fn mocks_for(src: &str) -> String {
    let generated = generate(src, Path::new("iface.go"), &SynthOptions::default())
        .unwrap_or_else(|e| panic!("generation failed: {e}"));
    assert!(generated.normalized, "output should re-parse");
    generated.text
}

#[test]
fn greeter_with_two_results() {
    let out = mocks_for(
        "package greet\n\
         \n\
         type Greeter interface {\n\
         \tGreet(name string) (string, error)\n\
         }\n",
    );
    assert_eq!(
        out,
        r#"package greet

import (
	"github.com/stretchr/testify/mock"
)

// MockGreeter mocks the Greeter interface
type MockGreeter struct {
	mock.Mock
}

var _ Greeter = &MockGreeter{}

// Greet mocks the Greet method
func (mock *MockGreeter) Greet(name string) (r0 string, r1 error) {
	args := mock.Called(name)

	if args.Get(0) != nil {
		argOk := false
		r0, argOk = args.Get(0).(string)
		if !argOk {
			panic("incorrect type supplied for return value [0], expected string")
		}
	}

	if args.Get(1) != nil {
		argOk := false
		r1, argOk = args.Get(1).(error)
		if !argOk {
			panic("incorrect type supplied for return value [1], expected error")
		}
	}

	return r0, r1
}
"#
    );
}

#[test]
fn logger_without_results_only_records() {
    let out = mocks_for("package log\n\ntype Logger interface {\n\tLog(msg string)\n}\n");
    assert!(out.contains(
        "// Log mocks the Log method\n\
         func (mock *MockLogger) Log(msg string) {\n\
         \tmock.Called(msg)\n\
         }\n"
    ));
    assert!(!out.contains("return"));
    assert!(!out.contains("args"));
}

#[test]
fn embedded_interface_composes_its_mock() {
    let out = mocks_for(
        "package stream\n\
         \n\
         type Closer interface {\n\
         \tClose() error\n\
         }\n\
         \n\
         type Reader interface {\n\
         \tCloser\n\
         \tRead(p []byte) (int, error)\n\
         }\n",
    );
    assert!(out.contains(
        "// MockReader mocks the Reader interface\n\
         type MockReader struct {\n\
         \tmock.Mock\n\
         \tMockCloser\n\
         }\n"
    ));
    assert!(out.contains("var _ Closer = &MockCloser{}\nvar _ Reader = &MockReader{}\n"));
    assert!(out.contains("func (mock *MockReader) Read(p []byte) (r0 int, r1 error) {"));
    // Close is promoted from MockCloser, not redeclared
    assert!(!out.contains("func (mock *MockReader) Close("));
    assert!(out.contains("func (mock *MockCloser) Close() (r0 error) {"));
}

#[test]
fn variadic_parameter_named_args() {
    let out = mocks_for(
        "package work\n\
         \n\
         import \"context\"\n\
         \n\
         type Doer interface {\n\
         \tDo(ctx context.Context, args ...int) error\n\
         }\n",
    );
    assert!(out.starts_with(
        "package work\n\
         \n\
         import (\n\
         \t\"context\"\n\
         \n\
         \t\"github.com/stretchr/testify/mock\"\n\
         )\n"
    ));
    assert!(out.contains(
        "func (mock *MockDoer) Do(ctx context.Context, args ...int) (r0 error) {\n\
         \t_args := mock.Called(ctx, args)\n"
    ));
    assert!(out.contains("\tif _args.Get(0) != nil {\n"));
}

#[test]
fn unused_source_imports_are_dropped() {
    let out = mocks_for(
        "package store\n\
         \n\
         import (\n\
         \t\"fmt\"\n\
         \t\"io\"\n\
         )\n\
         \n\
         func describe() string { return fmt.Sprint(1) }\n\
         \n\
         type Store interface {\n\
         \tOpen(name string) (io.ReadCloser, error)\n\
         }\n",
    );
    assert!(out.contains("import (\n\t\"io\"\n\n\t\"github.com/stretchr/testify/mock\"\n)\n"));
    assert!(!out.contains("\"fmt\""));
    assert!(!out.contains("describe"));
}

#[test]
fn generic_interface() {
    let out = mocks_for(
        "package cache\n\
         \n\
         type Cache[K comparable, V any] interface {\n\
         \tGet(key K) (V, bool)\n\
         }\n",
    );
    assert!(out.contains("type MockCache[K comparable, V any] struct {\n"));
    assert!(out.contains("func _[K comparable, V any]() {\n\tvar _ Cache[K, V] = &MockCache[K, V]{}\n}\n"));
    assert!(out.contains("func (mock *MockCache[K, V]) Get(key K) (r0 V, r1 bool) {"));
}

#[test]
fn banner_comes_first() {
    let generated = generate(
        "package p\n\ntype I interface{ M() }\n",
        Path::new("dir/i.go"),
        &SynthOptions::with_banner(ridicule::synth::default_banner("i.go")),
    )
    .unwrap();
    assert!(generated.text.starts_with(
        "// Code generated by ridicule. DO NOT EDIT.\n\
         // Source: i.go\n\
         \n\
         package p\n"
    ));
}

#[test]
fn unsupported_parameter_is_visible_and_warned() {
    let generated = generate(
        "package p\n\ntype Sink interface {\n\tPut(v struct{ X int })\n}\n",
        Path::new("sink.go"),
        &SynthOptions::default(),
    )
    .unwrap();
    assert!(generated.text.contains("Put(v UNSUPPORTED_STRUCT)"));
    let warnings = &generated.contract.warnings;
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].interface, "Sink");
    assert_eq!(warnings[0].member, "Put");
}

#[test]
fn file_without_interfaces_still_has_a_package() {
    let out = mocks_for("package empty\n\ntype T struct{}\n");
    assert_eq!(out, "package empty\n");
}

#[test]
fn syntax_error_is_positioned() {
    let err = generate(
        "package p\n\ntype I interface {\n\tM(\n",
        Path::new("broken.go"),
        &SynthOptions::default(),
    )
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("failed to parse broken.go:\n"), "{msg}");
    let first = msg.lines().nth(1).unwrap_or_default();
    assert!(first.starts_with("  ") && first.contains(": "), "{msg}");
}

#[test]
fn array_lengths_from_expressions_parse() {
    let out = mocks_for(
        "package p\n\
         \n\
         import \"crypto/sha256\"\n\
         \n\
         const N = 4\n\
         \n\
         type Hash [sha256.Size]byte\n\
         \n\
         type Pair [N * 2]int\n\
         \n\
         type Hasher interface {\n\
         \tSum(data []byte) Hash\n\
         }\n",
    );
    assert!(out.contains("func (mock *MockHasher) Sum(data []byte) (r0 Hash) {"));
}

#[test]
fn imports_with_guessed_names_survive() {
    let out = mocks_for(
        "package pods\n\
         \n\
         import \"k8s.io/api/core/v1\"\n\
         \n\
         type Getter interface {\n\
         \tGet(name string) (*v1.Pod, error)\n\
         }\n",
    );
    assert!(out.contains("\t\"k8s.io/api/core/v1\"\n"), "{out}");
    assert!(out.contains("(r0 *v1.Pod, r1 error)"));
}

#[test]
fn constraint_interfaces_get_no_mock() {
    let generated = generate(
        "package num\n\
         \n\
         type Number interface{ ~int | ~float64 }\n\
         \n\
         type Summer interface {\n\
         \tSum(xs []int) int\n\
         }\n",
        Path::new("num.go"),
        &SynthOptions::default(),
    )
    .unwrap();
    assert!(!generated.text.contains("MockNumber"));
    assert!(generated.text.contains("var _ Summer = &MockSummer{}\n"));
    assert_eq!(generated.contract.warnings.len(), 1);
    assert_eq!(generated.contract.warnings[0].interface, "Number");
}
