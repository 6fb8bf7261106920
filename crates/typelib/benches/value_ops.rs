// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value Operations Benchmark
//!
//! Measures the hot paths of cross-registry work:
//! - structural equivalence of descriptors (memoized hash vs deep compare)
//! - casting a value to an equivalent descriptor
//! - field-aware equality of compound values

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use typelib::{Registry, Value};

const TYPES: &str = r#"
types:
  - kind: compound
    name: /Inner
    fields:
      - { name: a, type: /long }
      - { name: b, type: /int }
      - { name: c, type: /char }
      - { name: d, type: /short }
  - kind: compound
    name: /Sample
    fields:
      - name: header
        type: /Inner
      - name: readings
        type: "/double[32]"
      - name: history
        type: "/std/vector</Inner>"
"#;

fn make_registry() -> Registry {
    let registry = Registry::with_standard_types();
    registry.import_str(TYPES, "yaml").expect("bench types");
    registry
}

fn bench_is_equivalent(c: &mut Criterion) {
    let r0 = make_registry();
    let r1 = make_registry();
    let t0 = r0.get("/Sample").expect("t0");
    let t1 = r1.get("/Sample").expect("t1");

    c.bench_function("is_equivalent_cross_registry", |b| {
        b.iter(|| black_box(t0.is_equivalent(black_box(&t1))));
    });
}

fn bench_cast(c: &mut Criterion) {
    let r0 = make_registry();
    let r1 = make_registry();
    let value = Value::new(&r0.get("/Sample").expect("t0"));
    let target = r1.get("/Sample").expect("t1");

    c.bench_function("cast_equivalent", |b| {
        b.iter(|| {
            let cast = value.cast(black_box(&target)).expect("cast");
            black_box(cast.is_same())
        });
    });
}

fn bench_structural_eq(c: &mut Criterion) {
    let registry = make_registry();
    let sample_t = registry.get("/Sample").expect("Sample");
    let left = Value::new(&sample_t);
    let history = left.field("history").expect("history");
    history.resize(16).expect("resize");
    for i in 0..32 {
        left.path(&format!(".readings[{}]", i))
            .and_then(|r| r.set(i as f64 * 0.5))
            .expect("reading");
    }
    let right = left.dup().expect("dup");

    c.bench_function("structural_eq_sample", |b| {
        b.iter(|| black_box(left.structural_eq(black_box(&right)).expect("eq")));
    });
}

criterion_group!(benches, bench_is_equivalent, bench_cast, bench_structural_eq);
criterion_main!(benches);
