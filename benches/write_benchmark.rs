/*!
 * Serialization Benchmarks
 * Direct-to-text writer vs serde_json on representative payloads
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jetjson::{json_record, Features, JsonWriter};
use serde::Serialize;

struct LogEvent {
    level: String,
    target: String,
    message: String,
    line: u32,
    elapsed_ms: f64,
    tags: Vec<String>,
}
json_record!(LogEvent {
    level,
    target,
    message,
    line,
    elapsed_ms,
    tags
});

#[derive(Serialize)]
struct LogEventSerde {
    level: String,
    target: String,
    message: String,
    line: u32,
    elapsed_ms: f64,
    tags: Vec<String>,
}

fn sample_event() -> (LogEvent, LogEventSerde) {
    let tags = vec!["request".to_string(), "db".to_string(), "retry".to_string()];
    (
        LogEvent {
            level: "INFO".to_string(),
            target: "app::storage".to_string(),
            message: "flushed 31 pages in 1.2ms (no stalls)".to_string(),
            line: 481,
            elapsed_ms: 1.207,
            tags: tags.clone(),
        },
        LogEventSerde {
            level: "INFO".to_string(),
            target: "app::storage".to_string(),
            message: "flushed 31 pages in 1.2ms (no stalls)".to_string(),
            line: 481,
            elapsed_ms: 1.207,
            tags,
        },
    )
}

fn bench_record_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_serialize");
    let (event, event_serde) = sample_event();

    group.throughput(Throughput::Bytes(
        serde_json::to_vec(&event_serde).unwrap().len() as u64,
    ));
    group.bench_function("jetjson", |b| {
        b.iter(|| jetjson::to_vec(black_box(&event)).unwrap());
    });
    group.bench_function("serde_json", |b| {
        b.iter(|| serde_json::to_vec(black_box(&event_serde)).unwrap());
    });
    group.finish();
}

fn bench_clean_vs_dirty_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("string_escape");

    let clean = "a plain ascii sentence with no special characters at all".repeat(8);
    let one_special = format!("{}{}", "x".repeat(400), "\n");
    let dirty: String = "line one\nline \"two\"\tcol\\umn\u{2028}".repeat(16);

    for (name, payload) in [
        ("clean", &clean),
        ("one_special", &one_special),
        ("dirty", &dirty),
    ] {
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::new("jetjson", name), payload, |b, payload| {
            b.iter(|| {
                let mut w = JsonWriter::new();
                w.out_mut().write_string(black_box(payload)).unwrap();
                w.into_bytes().unwrap()
            });
        });
        group.bench_with_input(
            BenchmarkId::new("serde_json", name),
            payload,
            |b, payload| {
                b.iter(|| serde_json::to_vec(black_box(payload)).unwrap());
            },
        );
    }
    group.finish();
}

fn bench_integer_lists(c: &mut Criterion) {
    let mut group = c.benchmark_group("integer_list");
    let values: Vec<i64> = (0..1000).map(|i| i * 37 - 500).collect();

    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("jetjson", |b| {
        b.iter(|| jetjson::to_vec(black_box(&values)).unwrap());
    });
    group.bench_function("serde_json", |b| {
        b.iter(|| serde_json::to_vec(black_box(&values)).unwrap());
    });
    group.finish();
}

fn bench_feature_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_modes");
    let (event, _) = sample_event();

    for (name, features) in [
        ("default", Features::default()),
        ("pretty", Features::default() | Features::PRETTY_PRINT),
        (
            "browser_compatible",
            Features::default() | Features::BROWSER_COMPATIBLE,
        ),
        (
            "sorted_nulls",
            Features::default() | Features::SORT_FIELDS | Features::WRITE_NULL_PROPERTIES,
        ),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| jetjson::to_vec_with(black_box(&event), features).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_record_serialize,
    bench_clean_vs_dirty_strings,
    bench_integer_lists,
    bench_feature_modes
);
criterion_main!(benches);
