//! Adaptive recoil compensation.
//!
//! While the activation condition holds, the rule watches how the right stick
//! moves as it arrives from earlier stages and pushes against that motion.
//!
//! ```text
//!            activation rises              bullets >= lock threshold
//!   Idle ───────────────────▶ Reactive ─────────────────────────▶ PatternLocked
//!     ▲                          │                                     │
//!     └──────────────────────────┴─────────── activation falls ────────┘
//! ```
//!
//! - **Reactive**: target = `-(mean velocity + trend) * scale`, scaled by the
//!   fire-rate factor
//! - **PatternLocked**: target starts from a frozen base learned at lock time
//!   and is nudged toward recent samples by the learning rate
//!
//! The target passes through a 15 ms smoother, is multiplied by strength and
//! added to the right stick. Releasing the activation zeroes the live
//! compensation and shot count at once; a learned lock survives until
//! [`AdaptiveCompensationRule::forget_pattern`] or `reset`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use stickflow_filters::{BoundedHistory, TauSmoother, lerp};
use stickflow_pipeline::{Condition, InputSnapshot, OutputFrame, Rule, Stick, TickContext};
use tracing::debug;

use crate::calibration::CalibrationConstants;
use crate::edge::{Edge, EdgeDetector};
use crate::pattern::{FiringSummary, PatternKind};

/// Ticks shorter than this record zero velocity.
const MIN_VELOCITY_DT: f64 = 0.001;

/// One tick of measured stick motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoilSample {
    /// Tick time
    pub at: Duration,
    /// Horizontal velocity in units per second
    pub velocity_x: f64,
    /// Vertical velocity in units per second
    pub velocity_y: f64,
    /// Horizontal stick value
    pub raw_x: f64,
    /// Vertical stick value
    pub raw_y: f64,
    /// Whether the activation was held; shot pulses do not gate this
    pub firing: bool,
}

/// Tunables for [`AdaptiveCompensationRule`]. Out-of-range values are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveParams {
    /// Output multiplier, `[0.5, 1.5]`
    pub strength: f64,
    /// Blend toward the recent correction once locked, `[0.1, 0.5]`
    pub learning_rate: f64,
    /// Sample history length, `[50, 200]`
    pub capacity: usize,
    /// Samples required before any compensation, at least 5
    pub min_samples: usize,
    /// Shots in one activation before the pattern locks, at least 10
    pub lock_threshold: u32,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            strength: 1.0,
            learning_rate: 0.3,
            capacity: 100,
            min_samples: 10,
            lock_threshold: 15,
        }
    }
}

impl AdaptiveParams {
    /// Copy with every field clamped to its range. Non-finite floats take the default.
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            strength: finite_or(self.strength, d.strength).clamp(0.5, 1.5),
            learning_rate: finite_or(self.learning_rate, d.learning_rate).clamp(0.1, 0.5),
            capacity: self.capacity.clamp(50, 200),
            min_samples: self.min_samples.max(5),
            lock_threshold: self.lock_threshold.max(10),
        }
    }
}

#[inline]
fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

/// Where the rule is in its learning cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompensationMode {
    /// Activation condition not held
    #[default]
    Idle,
    /// Compensating from live measurements
    Reactive,
    /// Compensating from a learned baseline
    PatternLocked,
}

#[derive(Debug, Clone, Copy, Default)]
struct FireRate {
    first_shot: Option<Duration>,
    shots: u32,
    average_ms: f64,
}

impl FireRate {
    fn record(&mut self, now: Duration) {
        self.shots = self.shots.saturating_add(1);
        match self.first_shot {
            None => self.first_shot = Some(now),
            Some(first) if self.shots > 1 => {
                let span_ms = now.saturating_sub(first).as_secs_f64() * 1000.0;
                self.average_ms = span_ms / f64::from(self.shots - 1);
            }
            Some(_) => {}
        }
    }
}

/// Learns and counteracts stick drift while firing.
///
/// The activation condition is read from the input snapshot. Shots are
/// counted on rising edges of a separate shot condition read from the output
/// frame, so presses synthesised by an earlier rapid-fire rule count.
///
/// # RT Safety
///
/// The sample ring is allocated in `new`; `apply` does not allocate.
#[derive(Debug)]
pub struct AdaptiveCompensationRule {
    activation: Condition,
    shot: Condition,
    params: AdaptiveParams,
    cal: CalibrationConstants,

    history: BoundedHistory<RecoilSample>,
    seeded: bool,
    previous: (f64, f64),
    active_edge: EdgeDetector,
    shot_edge: EdgeDetector,
    bullets: u32,
    fire_rate: FireRate,

    smooth_x: TauSmoother,
    smooth_y: TauSmoother,
    learned_base: (f64, f64),
    locked: bool,
    pattern: PatternKind,
    mode: CompensationMode,
}

impl AdaptiveCompensationRule {
    /// Rule whose shot signal is the activation condition itself.
    pub fn new(activation: Condition, params: AdaptiveParams) -> Self {
        let shot = activation.clone();
        Self::with_shot_condition(activation, shot, params)
    }

    /// Rule with a distinct shot signal, evaluated on the output frame.
    pub fn with_shot_condition(activation: Condition, shot: Condition, params: AdaptiveParams) -> Self {
        let params = params.clamped();
        let cal = CalibrationConstants::default();
        Self {
            activation,
            shot,
            params,
            cal,
            history: BoundedHistory::new(params.capacity),
            seeded: false,
            previous: (0.0, 0.0),
            active_edge: EdgeDetector::new(),
            shot_edge: EdgeDetector::new(),
            bullets: 0,
            fire_rate: FireRate::default(),
            smooth_x: TauSmoother::new(cal.output_tau_ms),
            smooth_y: TauSmoother::new(cal.output_tau_ms),
            learned_base: (0.0, 0.0),
            locked: false,
            pattern: PatternKind::Unknown,
            mode: CompensationMode::Idle,
        }
    }

    /// Replace the calibration constants.
    #[must_use]
    pub fn with_calibration(mut self, cal: CalibrationConstants) -> Self {
        self.cal = cal;
        self.smooth_x = TauSmoother::new(cal.output_tau_ms);
        self.smooth_y = TauSmoother::new(cal.output_tau_ms);
        self
    }

    /// Parameters after clamping.
    pub fn params(&self) -> &AdaptiveParams {
        &self.params
    }

    /// Calibration in use.
    pub fn calibration(&self) -> &CalibrationConstants {
        &self.cal
    }

    /// Current learning state.
    pub fn mode(&self) -> CompensationMode {
        self.mode
    }

    /// Whether a pattern has been learned.
    pub fn is_pattern_locked(&self) -> bool {
        self.locked
    }

    /// Classification made at lock time.
    pub fn detected_pattern(&self) -> PatternKind {
        self.pattern
    }

    /// Shots counted in the current activation.
    pub fn bullet_count(&self) -> u32 {
        self.bullets
    }

    /// Frozen `(x, y)` base compensation, zero until locked.
    pub fn learned_base(&self) -> (f64, f64) {
        self.learned_base
    }

    /// Smoothed `(x, y)` compensation before the strength multiplier.
    pub fn current_compensation(&self) -> (f64, f64) {
        (self.smooth_x.value(), self.smooth_y.value())
    }

    /// Average time between shots in this activation, 0 until two shots.
    pub fn average_fire_interval_ms(&self) -> f64 {
        self.fire_rate.average_ms
    }

    /// Samples held in the history ring.
    pub fn sample_count(&self) -> usize {
        self.history.len()
    }

    /// Drop the learned pattern; the next activation starts reactive.
    pub fn forget_pattern(&mut self) {
        self.locked = false;
        self.learned_base = (0.0, 0.0);
        self.pattern = PatternKind::Unknown;
        if self.mode == CompensationMode::PatternLocked {
            self.mode = CompensationMode::Reactive;
        }
    }

    fn release(&mut self) {
        self.bullets = 0;
        self.smooth_x.reset_to(0.0);
        self.smooth_y.reset_to(0.0);
        self.mode = CompensationMode::Idle;
        debug!(locked = self.locked, "compensation released");
    }

    fn try_lock(&mut self) {
        let summary = FiringSummary::of(&self.history, self.history.capacity());
        if summary.count < self.cal.min_lock_samples {
            return;
        }
        let scale = self.cal.reactive_scale;
        self.learned_base = (-summary.mean.0 * scale, -summary.mean.1 * scale);
        self.pattern = summary.classify(&self.cal);
        self.locked = true;
        debug!(
            pattern = ?self.pattern,
            base_x = self.learned_base.0,
            base_y = self.learned_base.1,
            bullets = self.bullets,
            "recoil pattern locked"
        );
    }

    fn reactive_target(&self) -> (f64, f64) {
        let s = FiringSummary::of(&self.history, self.cal.reactive_window);
        if s.count < self.cal.min_reactive_samples {
            return (0.0, 0.0);
        }
        let (trend_x, trend_y) = if s.count >= self.cal.min_trend_samples {
            let (tx, ty) = s.trend();
            (tx * self.cal.trend_weight, ty * self.cal.trend_weight)
        } else {
            (0.0, 0.0)
        };
        let factor = self.cal.fire_rate_factor(self.fire_rate.average_ms);
        let scale = self.cal.reactive_scale;
        (
            -(s.mean.0 + trend_x) * scale * factor,
            -(s.mean.1 + trend_y) * scale * factor,
        )
    }

    fn predictive_target(&self) -> (f64, f64) {
        let (base_x, base_y) = self.learned_base;
        let window = self.cal.predictive_window;
        if self.history.len().min(window) < self.cal.min_predictive_window {
            return self.learned_base;
        }
        let s = FiringSummary::of(&self.history, window);
        if s.count < self.cal.min_predictive_samples {
            return self.learned_base;
        }
        let scale = self.cal.predictive_scale;
        let lr = self.params.learning_rate;
        (
            lerp(base_x, base_x - s.mean.0 * scale, lr),
            lerp(base_y, base_y - s.mean.1 * scale, lr),
        )
    }
}

impl Rule for AdaptiveCompensationRule {
    fn name(&self) -> &'static str {
        "adaptive_compensation"
    }

    fn apply(&mut self, ctx: &TickContext, input: &InputSnapshot, output: &mut OutputFrame) {
        let active = self.activation.evaluate(input);
        let shot = self.shot.evaluate(&*output);
        let (raw_x, raw_y) = output.stick(Stick::Right);

        if !self.seeded {
            self.seeded = true;
            self.previous = (raw_x, raw_y);
            self.active_edge.prime(active);
            self.shot_edge.prime(shot);
            if active {
                self.mode = CompensationMode::Reactive;
            }
            return;
        }

        match self.active_edge.update(active) {
            Edge::Rising => {
                self.bullets = 0;
                self.fire_rate = FireRate::default();
                self.mode = CompensationMode::Reactive;
            }
            Edge::Falling => self.release(),
            Edge::High | Edge::Low => {}
        }

        let shot_rose = self.shot_edge.update(shot) == Edge::Rising;
        if active && shot_rose {
            self.bullets = self.bullets.saturating_add(1);
            self.fire_rate.record(ctx.now);
        }

        let (velocity_x, velocity_y) = if ctx.dt >= MIN_VELOCITY_DT {
            ((raw_x - self.previous.0) / ctx.dt, (raw_y - self.previous.1) / ctx.dt)
        } else {
            (0.0, 0.0)
        };
        self.previous = (raw_x, raw_y);

        if !active {
            return;
        }

        self.history.push(RecoilSample {
            at: ctx.now,
            velocity_x,
            velocity_y,
            raw_x,
            raw_y,
            firing: active,
        });

        if self.history.len() < self.params.min_samples {
            return;
        }

        if !self.locked && self.bullets >= self.params.lock_threshold {
            self.try_lock();
        }

        let (target_x, target_y) = if self.locked {
            self.mode = CompensationMode::PatternLocked;
            self.predictive_target()
        } else {
            self.mode = CompensationMode::Reactive;
            self.reactive_target()
        };

        let comp_x = self.smooth_x.update(target_x, ctx.dt);
        let comp_y = self.smooth_y.update(target_y, ctx.dt);
        let strength = self.params.strength;
        output.offset_stick(Stick::Right, comp_x * strength, comp_y * strength);
    }

    fn reset(&mut self) {
        self.history.clear();
        self.seeded = false;
        self.previous = (0.0, 0.0);
        self.active_edge.reset();
        self.shot_edge.reset();
        self.bullets = 0;
        self.fire_rate = FireRate::default();
        self.smooth_x.reset_to(0.0);
        self.smooth_y.reset_to(0.0);
        self.forget_pattern();
        self.mode = CompensationMode::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use stickflow_pipeline::{Button, Trigger};
    use stickflow_test_helpers::fixtures::{Drift, PulseTrain, holding, ticks};

    const PERIOD: Duration = Duration::from_millis(5);

    fn held() -> Condition {
        Condition::button(Button::L1)
    }

    #[test]
    fn params_are_clamped() {
        let p = AdaptiveParams {
            strength: 9.0,
            learning_rate: 0.0,
            capacity: 10_000,
            min_samples: 1,
            lock_threshold: 2,
        }
        .clamped();
        assert_abs_diff_eq!(p.strength, 1.5);
        assert_abs_diff_eq!(p.learning_rate, 0.1);
        assert_eq!(p.capacity, 200);
        assert_eq!(p.min_samples, 5);
        assert_eq!(p.lock_threshold, 10);

        let nan = AdaptiveParams {
            strength: f64::NAN,
            ..AdaptiveParams::default()
        }
        .clamped();
        assert_abs_diff_eq!(nan.strength, 1.0);
    }

    #[test]
    fn idle_input_is_untouched() {
        let mut rule = AdaptiveCompensationRule::new(held(), AdaptiveParams::default());
        let drift = Drift::new(-1.0, 0.01);
        for ctx in ticks(PERIOD).take(50) {
            let mut frame = drift.frame(ctx.tick);
            let before = frame;
            rule.apply(&ctx, &InputSnapshot::default(), &mut frame);
            assert_eq!(frame, before);
        }
        assert_eq!(rule.mode(), CompensationMode::Idle);
        assert_eq!(rule.sample_count(), 0);
    }

    #[test]
    fn withholds_until_min_samples() {
        let mut rule = AdaptiveCompensationRule::new(held(), AdaptiveParams::default());
        let input = holding(Button::L1);
        let drift = Drift::new(-1.0, 0.01);
        for ctx in ticks(PERIOD).take(10) {
            let mut frame = drift.frame_with(ctx.tick, &input);
            rule.apply(&ctx, &input, &mut frame);
            assert_abs_diff_eq!(frame.right_y, drift.at(ctx.tick));
        }
        assert_eq!(rule.sample_count(), 9);
    }

    #[test]
    fn reactive_opposes_drift() {
        let mut rule = AdaptiveCompensationRule::new(held(), AdaptiveParams::default());
        let input = holding(Button::L1);
        let drift = Drift::new(-1.0, 0.01);
        let mut last = 0.0;
        for ctx in ticks(PERIOD).take(80) {
            let mut frame = drift.frame_with(ctx.tick, &input);
            rule.apply(&ctx, &input, &mut frame);
            last = frame.right_y - drift.at(ctx.tick);
        }
        assert_eq!(rule.mode(), CompensationMode::Reactive);
        assert!(last < -0.19, "offset {last}");
        assert!(!rule.is_pattern_locked());
    }

    #[test]
    fn bullets_count_shot_edges_only() {
        let mut rule = AdaptiveCompensationRule::with_shot_condition(
            held(),
            Condition::trigger(Trigger::R2),
            AdaptiveParams::default(),
        );
        let pulses = PulseTrain::new(6, 3);
        let input = holding(Button::L1);
        for ctx in ticks(PERIOD).take(31) {
            let mut frame = OutputFrame::default();
            if pulses.is_high(ctx.tick) {
                frame.r2 = 255;
            }
            rule.apply(&ctx, &input, &mut frame);
        }
        // Tick 0 only seeds, so its rising edge is not counted.
        assert_eq!(u64::from(rule.bullet_count()), pulses.rising_edges(31) - 1);
        assert_abs_diff_eq!(rule.average_fire_interval_ms(), 30.0, epsilon = 1e-9);
    }

    /// Shot shapes as `(period, width)` in ticks, from tap-fire to held bursts.
    const SHOT_SHAPES: [(u64, u64); 6] = [(2, 1), (4, 2), (6, 1), (10, 1), (12, 8), (20, 2)];

    fn shot_rule() -> AdaptiveCompensationRule {
        AdaptiveCompensationRule::with_shot_condition(
            held(),
            Condition::trigger(Trigger::R2),
            AdaptiveParams::default(),
        )
    }

    /// Feed `n` ticks of drift with R2 pulsing; returns the bullet count on
    /// the tick the pattern locked.
    fn fire(
        rule: &mut AdaptiveCompensationRule,
        clock: &mut impl Iterator<Item = TickContext>,
        pulses: PulseTrain,
        drift: Drift,
        n: usize,
    ) -> Option<u32> {
        let input = holding(Button::L1);
        let mut at_lock = None;
        for ctx in clock.take(n) {
            let mut frame = drift.frame(ctx.tick);
            if pulses.is_high(ctx.tick) {
                frame.r2 = 255;
            }
            let was_locked = rule.is_pattern_locked();
            rule.apply(&ctx, &input, &mut frame);
            if !was_locked && rule.is_pattern_locked() {
                at_lock = Some(rule.bullet_count());
            }
        }
        at_lock
    }

    #[test]
    fn short_shot_pulses_lock_at_threshold() {
        for (period, width) in SHOT_SHAPES {
            let mut rule = shot_rule();
            let pulses = PulseTrain::new(period, width);
            let n = usize::try_from(16 * period).unwrap_or(usize::MAX);
            let at_lock = fire(&mut rule, &mut ticks(PERIOD), pulses, Drift::new(0.0, 0.002), n);
            assert_eq!(at_lock, Some(15), "pulses {period}/{width}");
            assert_eq!(rule.mode(), CompensationMode::PatternLocked, "pulses {period}/{width}");
            // 0.4 units/s of upward drift against a 0.1 scale.
            assert_abs_diff_eq!(rule.learned_base().1, -0.04, epsilon = 1e-9);
        }
    }

    #[test]
    fn single_tick_pulses_keep_every_active_sample() {
        let mut rule = shot_rule();
        let at_lock = fire(
            &mut rule,
            &mut ticks(PERIOD),
            PulseTrain::new(10, 1),
            Drift::new(0.0, 0.002),
            60,
        );
        assert_eq!(at_lock, None);
        assert_eq!(rule.sample_count(), 59);
        assert!(rule.history.iter().all(|s| s.firing));
    }

    #[test]
    fn release_zeroes_compensation_but_keeps_lock() {
        for (period, width) in SHOT_SHAPES {
            let mut rule = shot_rule();
            let drift = Drift::new(-1.0, 0.005);
            let mut clock = ticks(PERIOD);
            let n = usize::try_from(16 * period).unwrap_or(usize::MAX);
            fire(&mut rule, &mut clock, PulseTrain::new(period, width), drift, n);
            assert!(rule.is_pattern_locked(), "pulses {period}/{width}");
            assert_eq!(rule.mode(), CompensationMode::PatternLocked);

            for ctx in clock.take(1) {
                let mut frame = drift.frame(ctx.tick);
                rule.apply(&ctx, &InputSnapshot::default(), &mut frame);
                assert_abs_diff_eq!(frame.right_y, drift.at(ctx.tick));
            }
            assert_eq!(rule.bullet_count(), 0);
            assert_eq!(rule.current_compensation(), (0.0, 0.0));
            assert_eq!(rule.mode(), CompensationMode::Idle);
            assert!(rule.is_pattern_locked());

            rule.forget_pattern();
            assert!(!rule.is_pattern_locked());
            assert_eq!(rule.detected_pattern(), PatternKind::Unknown);
        }
    }

    #[test]
    fn reset_returns_to_fresh_state() {
        let mut rule = AdaptiveCompensationRule::new(held(), AdaptiveParams::default());
        let input = holding(Button::L1);
        let drift = Drift::new(-1.0, 0.01);
        for ctx in ticks(PERIOD).take(40) {
            let mut frame = drift.frame_with(ctx.tick, &input);
            rule.apply(&ctx, &input, &mut frame);
        }
        rule.reset();
        assert_eq!(rule.sample_count(), 0);
        assert_eq!(rule.mode(), CompensationMode::Idle);
        assert_eq!(rule.current_compensation(), (0.0, 0.0));
    }

    #[test]
    fn short_ticks_record_zero_velocity() {
        let mut rule = AdaptiveCompensationRule::new(held(), AdaptiveParams::default());
        let input = holding(Button::L1);
        for i in 0..20u64 {
            let ctx = TickContext::new(i, Duration::from_micros(i * 500), 0.0005);
            let mut frame = OutputFrame {
                right_y: (i as f64 * 0.05).min(1.0),
                ..OutputFrame::default()
            };
            rule.apply(&ctx, &input, &mut frame);
            assert!(frame.is_finite());
        }
        assert!(rule.history.iter().all(|s| s.velocity_y.abs() < f64::EPSILON));
    }
}
