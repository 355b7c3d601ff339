//! Building the initial output frame from a raw snapshot.
//!
//! Per tick: gate trigger noise, pick hip or ADS response from the right
//! trigger, normalise both sticks (Y flipped so up is positive), then shape
//! each stick with that mode's processor.

use serde::{Deserialize, Serialize};
use stickflow_filters::{AxisProcessor, AxisProfile, FilterState, normalize_axis};
use tracing::debug;

use crate::frame::{InputSnapshot, OutputFrame};

/// Left and right stick response for one activation mode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseSet {
    /// Left stick
    pub left: AxisProfile,
    /// Right stick
    pub right: AxisProfile,
}

/// Thresholds deciding activation mode and trigger noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// Right trigger value above which the ADS response is used
    pub ads_when_r2_above: u8,
    /// Stick magnitude at or above which the player is considered to be aiming
    pub min_intent_magnitude: f64,
    /// Trigger values at or below this read as fully released
    pub trigger_noise_threshold: u8,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            ads_when_r2_above: 20,
            min_intent_magnitude: 0.02,
            trigger_noise_threshold: 3,
        }
    }
}

/// A complete per-game response profile.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameProfile {
    /// Response while firing from the hip
    pub hip: ResponseSet,
    /// Response while aiming down sights
    pub ads: ResponseSet,
    /// Mode and noise thresholds
    pub activation: ActivationConfig,
}

/// Which response set is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationMode {
    /// Hip-fire response
    #[default]
    Hip,
    /// Aim-down-sights response
    Ads,
}

#[derive(Debug, Clone)]
struct StickPair {
    left: AxisProcessor,
    right: AxisProcessor,
}

impl StickPair {
    fn new(set: &ResponseSet, sample_rate_hz: f64) -> Self {
        Self {
            left: AxisProcessor::new(set.left, sample_rate_hz),
            right: AxisProcessor::new(set.right, sample_rate_hz),
        }
    }
}

impl FilterState for StickPair {
    fn reset(&mut self) {
        FilterState::reset(&mut self.left);
        FilterState::reset(&mut self.right);
    }
}

/// Turns raw snapshots into conditioned frames.
///
/// Hip and ADS each own their processors. On a mode change the newly selected
/// processors are reset so their smoothing restarts from the current sample.
///
/// # RT Safety
///
/// `condition()` is allocation-free and O(1).
#[derive(Debug, Clone)]
pub struct Conditioner {
    activation: ActivationConfig,
    hip: StickPair,
    ads: StickPair,
    hip_invert: (bool, bool),
    ads_invert: (bool, bool),
    mode: ActivationMode,
}

impl Conditioner {
    /// Build a conditioner for a loop running at `sample_rate_hz`.
    pub fn new(profile: &GameProfile, sample_rate_hz: f64) -> Self {
        Self {
            activation: profile.activation,
            hip: StickPair::new(&profile.hip, sample_rate_hz),
            ads: StickPair::new(&profile.ads, sample_rate_hz),
            hip_invert: (profile.hip.left.invert_y, profile.hip.right.invert_y),
            ads_invert: (profile.ads.left.invert_y, profile.ads.right.invert_y),
            mode: ActivationMode::Hip,
        }
    }

    /// Zero out trigger readings at or below the noise threshold.
    #[inline]
    pub fn gate_trigger(&self, raw: u8) -> u8 {
        if raw <= self.activation.trigger_noise_threshold { 0 } else { raw }
    }

    /// Mode implied by a gated right-trigger value.
    #[inline]
    pub fn mode_for(&self, gated_r2: u8) -> ActivationMode {
        if gated_r2 > self.activation.ads_when_r2_above {
            ActivationMode::Ads
        } else {
            ActivationMode::Hip
        }
    }

    /// Whether a conditioned stick is deflected enough to count as intent.
    #[inline]
    pub fn has_intent(&self, x: f64, y: f64) -> bool {
        x.hypot(y) >= self.activation.min_intent_magnitude
    }

    /// Mode used for the most recent frame.
    pub fn mode(&self) -> ActivationMode {
        self.mode
    }

    /// Build the initial output frame for this tick.
    pub fn condition(&mut self, input: &InputSnapshot) -> OutputFrame {
        let l2 = self.gate_trigger(input.l2);
        let r2 = self.gate_trigger(input.r2);

        let mode = self.mode_for(r2);
        if mode != self.mode {
            debug!(from = ?self.mode, to = ?mode, "activation mode changed");
            self.mode = mode;
            match mode {
                ActivationMode::Hip => self.hip.reset(),
                ActivationMode::Ads => self.ads.reset(),
            }
        }

        let (sticks, (invert_left, invert_right)) = match mode {
            ActivationMode::Hip => (&mut self.hip, self.hip_invert),
            ActivationMode::Ads => (&mut self.ads, self.ads_invert),
        };

        let (lx, ly) = sticks.left.process(
            normalize_axis(input.left_x),
            flip_y(input.left_y, invert_left),
        );
        let (rx, ry) = sticks.right.process(
            normalize_axis(input.right_x),
            flip_y(input.right_y, invert_right),
        );

        OutputFrame {
            left_x: lx,
            left_y: ly,
            right_x: rx,
            right_y: ry,
            l2,
            r2,
            buttons: input.buttons,
        }
    }

    /// Clear all smoothing state and return to hip mode.
    pub fn reset(&mut self) {
        self.hip.reset();
        self.ads.reset();
        self.mode = ActivationMode::Hip;
    }
}

/// Raw Y grows downward; conditioned Y grows upward unless inverted.
#[inline]
fn flip_y(raw: u8, invert: bool) -> f64 {
    let y = -normalize_axis(raw);
    if invert { -y } else { y }
}
