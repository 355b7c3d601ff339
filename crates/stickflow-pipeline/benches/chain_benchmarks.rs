//! Chain benchmarks
//!
//! Per-tick cost of conditioning, chain application and swap adoption.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;
use stickflow_pipeline::prelude::*;

#[derive(Debug)]
struct Nudge;

impl Rule for Nudge {
    fn name(&self) -> &'static str {
        "nudge"
    }

    fn apply(&mut self, _: &TickContext, _: &InputSnapshot, out: &mut OutputFrame) {
        out.offset_stick(Stick::Right, 0.001, -0.001);
    }
}

fn bench_conditioning(c: &mut Criterion) {
    let mut conditioner = Conditioner::new(&GameProfile::default(), 200.0);
    let input = InputSnapshot {
        right_x: 200,
        right_y: 40,
        r2: 90,
        ..InputSnapshot::default()
    };

    c.bench_function("condition_snapshot", |b| {
        b.iter(|| black_box(conditioner.condition(black_box(&input))))
    });
}

fn bench_chain_apply(c: &mut Criterion) {
    let mut chain: RuleChain = (0..8).map(|_| Box::new(Nudge) as Box<dyn Rule>).collect();
    let input = InputSnapshot::default();
    let ctx = TickContext::new(0, Duration::ZERO, 0.005);

    c.bench_function("chain_apply_8_rules", |b| {
        b.iter(|| {
            let mut frame = OutputFrame::default();
            let _ = black_box(chain.apply(&ctx, black_box(&input), &mut frame));
        })
    });
}

fn bench_refresh_without_publish(c: &mut Criterion) {
    let slot = Arc::new(ChainSlot::new());
    let mut active = ActiveChain::new(RuleChain::new(), slot);

    c.bench_function("active_chain_refresh_idle", |b| {
        b.iter(|| black_box(active.refresh().is_some()))
    });
}

criterion_group!(
    benches,
    bench_conditioning,
    bench_chain_apply,
    bench_refresh_without_publish
);
criterion_main!(benches);
