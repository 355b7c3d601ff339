//! Rule benchmarks
//!
//! Per-tick cost of the adaptive rule in each mode and of a full chain.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use stickflow_pipeline::prelude::*;
use stickflow_rules::prelude::*;

const PERIOD: Duration = Duration::from_millis(5);

fn ctx(tick: u64) -> TickContext {
    TickContext::new(tick, PERIOD.saturating_mul(u32::try_from(tick).unwrap_or(u32::MAX)), 0.005)
}

fn warmed_adaptive(lock: bool) -> (AdaptiveCompensationRule, u64) {
    let mut rule = AdaptiveCompensationRule::with_shot_condition(
        Condition::button(Button::L1),
        Condition::trigger(Trigger::R2),
        AdaptiveParams::default(),
    );
    let input = InputSnapshot::default().with_button(Button::L1);
    let ticks = if lock { 300 } else { 40 };
    for t in 0..ticks {
        let mut frame = OutputFrame {
            right_y: (t % 200) as f64 * 0.005 - 0.5,
            r2: if lock && t % 4 < 2 { 255 } else { 0 },
            ..OutputFrame::default()
        };
        rule.apply(&ctx(t), &input, &mut frame);
    }
    (rule, ticks)
}

fn bench_adaptive(c: &mut Criterion) {
    let input = InputSnapshot::default().with_button(Button::L1);

    let (mut reactive, start) = warmed_adaptive(false);
    let mut t = start;
    c.bench_function("adaptive_reactive_tick", |b| {
        b.iter(|| {
            t += 1;
            let mut frame = OutputFrame::default();
            reactive.apply(&ctx(t), black_box(&input), &mut frame);
            black_box(frame)
        })
    });

    let (mut locked, start) = warmed_adaptive(true);
    let mut t = start;
    c.bench_function("adaptive_locked_tick", |b| {
        b.iter(|| {
            t += 1;
            let mut frame = OutputFrame::default();
            locked.apply(&ctx(t), black_box(&input), &mut frame);
            black_box(frame)
        })
    });
}

fn bench_full_chain(c: &mut Criterion) {
    let fire = || Condition::trigger(Trigger::R2);
    let mut chain = RuleChain::new()
        .with_rule(RapidFireRule::new(fire(), RapidFireParams::default()))
        .with_rule(AdaptiveCompensationRule::new(fire(), AdaptiveParams::default()))
        .with_rule(ProximityAssistRule::new(fire(), Condition::never(), ProximityParams::default()));
    let mut conditioner = Conditioner::new(&GameProfile::default(), 200.0);
    let input = InputSnapshot {
        right_x: 150,
        right_y: 100,
        r2: 255,
        ..InputSnapshot::default()
    };
    let mut t = 0u64;

    c.bench_function("full_chain_tick", |b| {
        b.iter(|| {
            t += 1;
            let mut frame = conditioner.condition(black_box(&input));
            let _ = black_box(chain.apply(&ctx(t), &input, &mut frame));
        })
    });
}

criterion_group!(benches, bench_adaptive, bench_full_chain);
criterion_main!(benches);
