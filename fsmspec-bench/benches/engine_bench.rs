//! Specification and transition engine benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fsmspec_core::{launch, parse, Channel, NotificationKind, Signal};
use serde_json::{json, Value};

fn toggle_definition() -> Value {
    json!({
        "id": "toggle",
        "initial": "deactivated",
        "states": {
            "deactivated": { "on": { "TOGGLE": "activated" } },
            "activated": { "on": { "TOGGLE": "deactivated" } }
        }
    })
}

/// A chain of `n` states where `NEXT_i` moves from `state_i` to `state_{i+1}`.
fn chain_definition(n: usize) -> Value {
    let mut states = serde_json::Map::new();
    for i in 0..n {
        let on = if i + 1 < n {
            json!({ format!("NEXT_{}", i): format!("state_{}", i + 1), "RESET": "state_0" })
        } else {
            json!({ "RESET": "state_0" })
        };
        states.insert(format!("state_{}", i), json!({ "on": on }));
    }
    json!({ "id": "chain", "initial": "state_0", "states": states })
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("spec_parse");

    let simple = toggle_definition();
    group.bench_function("simple", |b| b.iter(|| black_box(parse(&simple).unwrap())));

    for size in [10usize, 100, 1000] {
        let def = chain_definition(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("chain", size), &def, |b, def| {
            b.iter(|| black_box(parse(def).unwrap()))
        });
    }

    // Rejected: initial state does not exist
    let mut invalid = chain_definition(100);
    invalid["initial"] = json!("missing");
    group.bench_function("invalid_chain_100", |b| {
        b.iter(|| black_box(parse(&invalid).unwrap_err()))
    });

    group.finish();
}

fn bench_send(c: &mut Criterion) {
    let mut group = c.benchmark_group("machine_send");
    group.throughput(Throughput::Elements(1));

    let spec = parse(&toggle_definition()).unwrap();

    group.bench_function("toggle", |b| {
        let mut machine = launch(&spec).unwrap();
        b.iter(|| black_box(machine.send("TOGGLE").len()))
    });

    group.bench_function("unknown_trigger", |b| {
        let mut machine = launch(&spec).unwrap();
        b.iter(|| black_box(machine.send("UNKNOWN").len()))
    });

    group.bench_function("toggle_with_listeners", |b| {
        let mut machine = launch(&spec).unwrap();
        machine.on(Channel::Event, |_| {});
        machine.on(Channel::Transition, |_| {});
        b.iter(|| black_box(machine.send("TOGGLE").len()))
    });

    group.bench_function("vetoed", |b| {
        let mut machine = launch(&spec).unwrap();
        machine.on(Channel::Event, |signal| {
            if let Signal::Event(n) = signal {
                if n.kind() == NotificationKind::Transition {
                    n.stop();
                }
            }
        });
        b.iter(|| black_box(machine.send("TOGGLE").len()))
    });

    group.finish();
}

fn bench_launch(c: &mut Criterion) {
    let spec = parse(&chain_definition(100)).unwrap();
    c.bench_function("machine_launch", |b| b.iter(|| black_box(launch(&spec).unwrap())));
}

criterion_group!(benches, bench_parse, bench_send, bench_launch);
criterion_main!(benches);
