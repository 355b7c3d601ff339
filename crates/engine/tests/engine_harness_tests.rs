//! End-to-end engine behaviour on a manual clock.

use std::io::Write;
use std::time::Duration;

use stickflow_engine::harness::{ManualHarness, RecordingSink};
use stickflow_engine::{
    EngineError, InputUpdate, MacroConfig, MacroEntry, SinkError, StickflowConfig,
    build_rule_chain,
};
use stickflow_pipeline::{Button, RuleChain};
use stickflow_test_helpers::prelude::*;

fn ramp_config() -> StickflowConfig {
    StickflowConfig {
        macros: MacroConfig {
            ramp_compensation: Some(MacroEntry::enabled("R2")),
            ..MacroConfig::default()
        },
        ..StickflowConfig::default()
    }
}

#[test]
fn ramp_compensation_engages_and_releases() -> TestResult {
    let config = ramp_config();
    let mut harness = ManualHarness::new(&config, build_rule_chain(&config.macros)?);

    harness.input().apply_batch(&[InputUpdate::R2(255)]);
    harness.run(100)?;
    harness.input().apply_batch(&[InputUpdate::R2(0)]);
    harness.run(200)?;

    let ys: Vec<f64> = harness.frames().iter().map(|f| f.right_y).collect();
    assert_eq!(ys.len(), 300);

    let (engaged, released) = ys.split_at(100);
    assert_non_increasing!(engaged);
    assert_approx_eq!(*must_some(engaged.last(), "engaged frames"), -0.24, 5e-3);

    assert_all_within!(released.iter().copied(), -0.25, 0.0);
    assert_approx_eq!(*must_some(released.last(), "released frames"), 0.0, 1e-6);
    Ok(())
}

#[test]
fn ads_profile_follows_right_trigger() -> TestResult {
    let json = r#"{
        "profiles": {
            "Default": {
                "hip": { "right": { "deadzone": 0.05 } },
                "ads": { "right": { "deadzone": 0.9 } }
            }
        }
    }"#;
    let config = StickflowConfig::from_json_str(json)?;
    let mut harness = ManualHarness::new(&config, RuleChain::new());

    harness.input().apply_batch(&[InputUpdate::RightX(200)]);
    let hip = harness.step()?;
    assert!(hip.right_x > 0.4);

    harness.input().apply_batch(&[InputUpdate::R2(255)]);
    let ads = harness.step()?;
    assert_approx_eq!(ads.right_x, 0.0, 1e-12);
    assert_eq!(ads.r2, 255);
    Ok(())
}

#[test]
fn trigger_noise_is_gated_before_rules() -> TestResult {
    let config = StickflowConfig {
        macros: MacroConfig {
            button_alias: Some(MacroEntry::enabled("L2")),
            ..MacroConfig::default()
        },
        ..StickflowConfig::default()
    };
    let mut harness = ManualHarness::new(&config, build_rule_chain(&config.macros)?);

    harness.input().apply_batch(&[InputUpdate::L2(3)]);
    assert_eq!(harness.step()?.l2, 0);

    harness.input().apply_batch(&[InputUpdate::L2(200)]);
    let frame = harness.step()?;
    assert!(frame.buttons.get(Button::L3));
    Ok(())
}

#[test]
fn stall_resynchronises_and_counts_dropped_ticks() -> TestResult {
    let mut harness = ManualHarness::new(&StickflowConfig::default(), RuleChain::new());
    harness.run(10)?;

    harness.clock().advance(Duration::from_millis(100));
    harness.run(10)?;

    let counters = harness.counters();
    assert_eq!(counters.total_ticks, 20);
    assert_eq!(counters.resyncs, 1);
    assert!(counters.dropped_ticks >= 15);
    assert!(counters.late_ticks >= 1);

    let report = harness.report();
    assert_eq!(report.ticks, 20);
    assert_eq!(report.resyncs, 1);
    assert!(report.max_lateness >= Duration::from_millis(90));
    Ok(())
}

#[test]
fn drift_stays_bounded_over_many_ticks() -> TestResult {
    let mut harness = ManualHarness::new(&StickflowConfig::default(), RuleChain::new());
    harness.run(2_000)?;
    assert_eq!(harness.elapsed(), Duration::from_millis(5) * 2_000);
    assert_eq!(harness.report().late_ticks, 0);
    Ok(())
}

#[test]
fn sink_failure_stops_at_the_failing_tick() -> TestResult {
    let sink = RecordingSink::failing_at(3);
    let mut harness = ManualHarness::with_sink(&StickflowConfig::default(), RuleChain::new(), sink);

    let err = harness.run(10).err();
    assert!(matches!(
        err,
        Some(EngineError::Sink {
            tick: 3,
            source: SinkError::Rejected(_)
        })
    ));
    assert_eq!(harness.frames().len(), 3);
    assert_eq!(harness.counters().total_ticks, 3);
    Ok(())
}

#[test]
fn config_file_drives_the_chain() -> TestResult {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        r#"{{
            "tick_ms": 4,
            "macros": {{
                "rapid_fire": {{ "enabled": true, "trigger": "R2", "button": "r1", "rate_hz": 25 }},
                "pulse": {{ "enabled": true, "trigger": "L1", "button": "dpad_up", "duration_ms": 100 }}
            }}
        }}"#
    )?;

    let config = StickflowConfig::load(file.path())?;
    assert_eq!(config.tick_period(), Duration::from_millis(4));
    let chain = build_rule_chain(&config.macros)?;
    assert_eq!(chain.names().collect::<Vec<_>>(), ["rapid_fire", "pulse"]);

    let mut harness = ManualHarness::new(&config, chain);
    harness.input().apply_batch(&[InputUpdate::R2(255), InputUpdate::Button(Button::L1, true)]);
    harness.run(50)?;

    let frames = harness.frames();
    let r1: Vec<bool> = frames.iter().map(|f| f.buttons.get(Button::R1)).collect();
    assert_eq!(r1.first(), Some(&true));
    assert!(r1.windows(2).any(|w| w.first() != w.last()));

    let pulse_ticks = frames.iter().filter(|f| f.buttons.get(Button::DpadUp)).count();
    assert_eq!(pulse_ticks, 25);
    Ok(())
}

#[test]
fn missing_config_file_is_an_io_error() {
    let err = StickflowConfig::load("/definitely/not/here/stickflow.json").err();
    assert!(matches!(err, Some(stickflow_errors::ConfigError::Io { .. })));
}
