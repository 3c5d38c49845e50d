use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use go_decl_parser::parse_source;
use ridicule::{extract, generate, render, synth, SynthOptions};
use std::hint::black_box as bb;
use std::path::Path;

// =============================================================================
// Inputs
// =============================================================================

const SMALL_GREETER: &str = r#"
package greet

type Greeter interface {
    Greet(name string) (string, error)
}
"#;

const MEDIUM_STORE: &str = r#"
package store

import (
    "context"
    "io"
    "time"
)

type Closer interface {
    Close() error
}

type Store interface {
    Closer
    Get(ctx context.Context, key string) ([]byte, error)
    Put(ctx context.Context, key string, value []byte, ttl time.Duration) error
    Scan(ctx context.Context, prefix string, fn func(key string, value []byte) bool) error
    Stream(ctx context.Context) (<-chan Entry, error)
    Export(w io.Writer, keys ...string) (n int64, err error)
}

type Entry struct {
    Key   string
    Value []byte
}

func (e Entry) Size() int {
    return len(e.Key) + len(e.Value)
}
"#;

/// A package with `n` interfaces of five methods each.
fn synthetic_package(n: usize) -> String {
    let mut src = String::from("package gen\n\nimport \"context\"\n");
    for i in 0..n {
        src.push_str(&format!(
            "\ntype Service{i} interface {{\n\
             \tGet(ctx context.Context, id int64) (*Item{i}, error)\n\
             \tList(ctx context.Context, filter map[string]string, limit int) ([]*Item{i}, error)\n\
             \tWatch(ctx context.Context) (<-chan Event, error)\n\
             \tApply(fn func(Item{i}) error, opts ...Option) error\n\
             \tClose()\n\
             }}\n"
        ));
    }
    src
}

// =============================================================================
// Benchmark 1: pipeline stages on fixed inputs
// =============================================================================

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");

    for (name, src) in [("small", SMALL_GREETER), ("medium", MEDIUM_STORE)] {
        group.throughput(Throughput::Bytes(src.len() as u64));

        group.bench_with_input(BenchmarkId::new("parse", name), &src, |b, &src| {
            b.iter(|| bb(parse_source(bb(src)).map(|p| p.decls().len())));
        });

        let Ok(parsed) = parse_source(src) else {
            panic!("{name} input must parse");
        };
        group.bench_with_input(BenchmarkId::new("extract", name), &parsed, |b, parsed| {
            b.iter(|| bb(extract::extract(bb(parsed))));
        });

        let contract = extract::extract(&parsed);
        let options = SynthOptions::default();
        group.bench_with_input(BenchmarkId::new("synthesize_render", name), &contract, |b, contract| {
            b.iter(|| {
                let file = synth::synthesize(bb(contract), &options);
                bb(render::render(&file).map(|s| s.len()))
            });
        });

        group.bench_with_input(BenchmarkId::new("generate", name), &src, |b, &src| {
            b.iter(|| bb(generate(bb(src), Path::new("bench.go"), &options).map(|g| g.text.len())));
        });
    }

    group.finish();
}

// =============================================================================
// Benchmark 2: end-to-end scaling with interface count
// =============================================================================

fn bench_scalability(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalability");
    let options = SynthOptions::default();

    for n in [1usize, 10, 100] {
        let src = synthetic_package(n);
        group.throughput(Throughput::Elements((n * 5) as u64));
        group.bench_with_input(BenchmarkId::new("generate_methods", n), &src, |b, src| {
            b.iter(|| bb(generate(bb(src), Path::new("gen.go"), &options).map(|g| g.text.len())));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion registration
// =============================================================================

criterion_group!(benches, bench_stages, bench_scalability);
criterion_main!(benches);
