//! The rule chain must not allocate once warmed up.

use std::time::Duration;

use stickflow_pipeline::prelude::*;
use stickflow_rules::prelude::*;
use stickflow_test_helpers::assert_no_alloc;
use stickflow_test_helpers::fixtures::{Drift, PulseTrain, ticks};
use stickflow_test_helpers::tracking::{TrackingAllocator, track};

#[global_allocator]
static ALLOC: TrackingAllocator = TrackingAllocator;

fn every_rule() -> RuleChain {
    let fire = || Condition::trigger(Trigger::R2);
    RuleChain::new()
        .with_rule(RapidFireRule::new(fire(), RapidFireParams::default()))
        .with_rule(ButtonAliasRule::new(Condition::trigger(Trigger::L2), Button::L3))
        .with_rule(PulseRule::new(Condition::button(Button::Triangle), PulseParams::default()))
        .with_rule(AdaptiveCompensationRule::with_shot_condition(
            fire(),
            Condition::button(Button::R1),
            AdaptiveParams::default(),
        ))
        .with_rule(RampCompensationRule::new(fire(), RampParams::default()))
        .with_rule(ProximityAssistRule::new(
            Condition::trigger(Trigger::L2),
            Condition::trigger(Trigger::L2),
            ProximityParams::default(),
        ))
}

#[test]
fn warmed_chain_does_not_allocate() {
    let mut chain = every_rule();
    let drift = Drift::new(-1.0, 0.004);
    let presses = PulseTrain::new(40, 10);
    let mut clock = ticks(Duration::from_millis(5));

    let tick = |chain: &mut RuleChain, ctx: &TickContext| {
        let mut input = InputSnapshot {
            l2: 255,
            r2: 255,
            ..InputSnapshot::default()
        };
        if presses.is_high(ctx.tick) {
            input = input.with_button(Button::Triangle);
        }
        let mut frame = drift.frame_with(ctx.tick, &input);
        chain.apply(ctx, &input, &mut frame)
    };

    // Long enough for the adaptive rule to lock before measuring.
    for ctx in clock.by_ref().take(600) {
        assert!(tick(&mut chain, &ctx).is_ok());
    }

    let guard = track();
    let mut faults = 0u32;
    for ctx in clock.take(200) {
        if tick(&mut chain, &ctx).is_err() {
            faults += 1;
        }
    }
    assert_no_alloc!(guard, "rule chain tick");
    assert_eq!(faults, 0);
}
