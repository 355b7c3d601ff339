//! Tick benchmarks
//!
//! Full tick cost (snapshot, conditioning, chain, sink) on a manual clock.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use stickflow_engine::harness::ManualHarness;
use stickflow_engine::{InputUpdate, MacroConfig, MacroEntry, StickflowConfig, build_rule_chain};
use stickflow_pipeline::RuleChain;
use stickflow_test_helpers::must;

fn full_macros() -> MacroConfig {
    MacroConfig {
        rapid_fire: Some(MacroEntry::enabled("R2")),
        button_alias: Some(MacroEntry::enabled("L2")),
        pulse: Some(MacroEntry::enabled("L1")),
        adaptive_compensation: Some(MacroEntry::enabled("R2")),
        proximity_assist: Some(MacroEntry::enabled("L2")),
        ..MacroConfig::default()
    }
}

fn bench_ticks(c: &mut Criterion) {
    let config = StickflowConfig::default();

    let mut empty = ManualHarness::new(&config, RuleChain::new());
    c.bench_function("tick_empty_chain", |b| {
        b.iter(|| black_box(empty.step().ok()))
    });

    let chain = must(build_rule_chain(&full_macros()));
    let mut full = ManualHarness::new(&config, chain);
    full.input()
        .apply_batch(&[InputUpdate::R2(255), InputUpdate::L2(255), InputUpdate::RightY(90)]);
    c.bench_function("tick_full_chain", |b| {
        b.iter(|| black_box(full.step().ok()))
    });
}

fn bench_input(c: &mut Criterion) {
    let shared = stickflow_engine::SharedInput::new();
    let batch = [
        InputUpdate::LeftX(10),
        InputUpdate::LeftY(20),
        InputUpdate::RightX(30),
        InputUpdate::RightY(40),
        InputUpdate::R2(255),
    ];
    c.bench_function("shared_input_batch_and_snapshot", |b| {
        b.iter(|| {
            shared.apply_batch(black_box(&batch));
            black_box(shared.snapshot())
        })
    });
}

criterion_group!(benches, bench_ticks, bench_input);
criterion_main!(benches);
