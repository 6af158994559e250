//! Benchmarks for the option codec and the JIDL reader/writer.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jadn::formats::{jadn as jadn_format, jidl};
use jadn::options::{decode, encode};
use jadn::OptionTable;

const MUSIC: &str = include_str!("../tests/fixtures/music.jidl");
const MESSAGES: &str = include_str!("../tests/fixtures/messages.jidl");

fn bench_options(c: &mut Criterion) {
    let table = OptionTable::global().unwrap();
    let tags = ["{1", "}32", "%^[A-Za-z0-9]+$", "/date-time", "q", "*Tag"];
    let options = decode(table, &tags, "ArrayOf").unwrap();

    let mut group = c.benchmark_group("options");
    group.bench_function("decode", |b| {
        b.iter(|| decode(table, black_box(&tags), "ArrayOf").unwrap())
    });
    group.bench_function("encode", |b| {
        b.iter(|| encode(table, black_box(&options), "ArrayOf").unwrap())
    });
    group.finish();
}

fn bench_jidl(c: &mut Criterion) {
    let table = OptionTable::global().unwrap();
    let style = jidl::JidlStyle::default();

    let mut group = c.benchmark_group("jidl");
    for (name, text) in [("music", MUSIC), ("messages", MESSAGES)] {
        let schema = jidl::loads(table, text).unwrap();
        group.bench_function(format!("parse_{}", name), |b| {
            b.iter(|| jidl::loads(table, black_box(text)).unwrap())
        });
        group.bench_function(format!("print_{}", name), |b| {
            b.iter(|| jidl::dumps(table, black_box(&schema), &style))
        });
    }
    group.finish();
}

fn bench_jadn(c: &mut Criterion) {
    let table = OptionTable::global().unwrap();
    let schema = jidl::loads(table, MUSIC).unwrap();
    let json = jadn_format::dumps(table, &schema, &jadn_format::JadnStyle::default()).unwrap();

    c.bench_function("jadn_loads_music", |b| {
        b.iter(|| jadn_format::loads(table, black_box(&json)).unwrap())
    });
}

criterion_group!(benches, bench_options, bench_jidl, bench_jadn);
criterion_main!(benches);
