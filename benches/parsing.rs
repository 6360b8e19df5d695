//! Benchmarks for slackpack parsing and filtering.
//!
//! Run with: `cargo bench`
//! Run specific group: `cargo bench --bench parsing -- normalize`

use std::collections::BTreeMap;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use chrono_tz::Tz;
use slackpack::core::{DateRange, FilterSpec, apply_filters};
use slackpack::export::Directory;
use slackpack::parsing::{RawMessage, normalize_channel, resolve_markup};

// =============================================================================
// Test Data Generators
// =============================================================================

fn generate_day_json(count: usize) -> String {
    let mut messages = Vec::with_capacity(count);
    for i in 0..count {
        let user = if i % 2 == 0 { "U1" } else { "U2" };
        let ts = 1_672_574_400 + (i as i64 * 60);
        let thread = if i % 5 == 4 {
            format!(r#", "thread_ts": "{}.000100""#, ts - 240)
        } else {
            String::new()
        };
        messages.push(format!(
            r#"{{"type": "message", "ts": "{ts}.000100", "user": "{user}", "text": "Message <@U1> number {i} :tada: &amp; <https://example.com|link>"{thread}}}"#
        ));
    }
    format!("[{}]", messages.join(",\n"))
}

fn directory() -> Directory {
    Directory::new()
        .with_user("U1", "Alice")
        .with_user("U2", "Bob")
        .with_channel("C1", "general")
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let directory = directory();

    for count in [100usize, 1_000, 10_000] {
        let json = generate_day_json(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("deserialize", count), &json, |b, json| {
            b.iter(|| serde_json::from_str::<Vec<RawMessage>>(black_box(json)).unwrap());
        });

        let raws: Vec<RawMessage> = serde_json::from_str(&json).unwrap();
        group.bench_with_input(BenchmarkId::new("channel", count), &raws, |b, raws| {
            b.iter(|| normalize_channel("general", black_box(raws), &directory, Tz::UTC));
        });
    }

    group.finish();
}

fn bench_markup(c: &mut Criterion) {
    let directory = directory();
    let text = "Hey <@U1> and <@U2>, see <#C1|general> and <https://example.com/a/b|the doc> :tada: :+1: &lt;3";

    c.bench_function("resolve_markup", |b| {
        b.iter(|| resolve_markup(black_box(text), &directory));
    });
}

fn bench_filter(c: &mut Criterion) {
    let raws: Vec<RawMessage> = serde_json::from_str(&generate_day_json(10_000)).unwrap();
    let channel = normalize_channel("general", &raws, &directory(), Tz::UTC);
    let channels = BTreeMap::from([("general".to_string(), channel)]);

    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 1, 4).unwrap();
    let spec = FilterSpec::new().with_range("general", DateRange::new(start, end).unwrap());

    c.bench_function("apply_filters_10k", |b| {
        b.iter(|| apply_filters(black_box(channels.clone()), Some(&spec)));
    });
}

criterion_group!(benches, bench_normalize, bench_markup, bench_filter);
criterion_main!(benches);
