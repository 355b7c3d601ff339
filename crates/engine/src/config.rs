//! Engine configuration document.
//!
//! One JSON file holds the tick rate, the per-game stick profiles and the
//! macro entries the rule chain is built from. Every field has a default, so
//! a partial file (or `{}`) loads. Numeric tuning values are clamped by the
//! rule they configure; only unreadable files, malformed JSON and bad
//! trigger expressions are errors.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stickflow_errors::ConfigError;
use stickflow_pipeline::{Button, GameProfile};
use stickflow_rules::{
    AdaptiveParams, CalibrationConstants, ProximityParams, PulseParams, RampParams,
    RapidFireParams,
};
use tracing::{debug, warn};

/// Default tick period in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 5;
/// Tick period bounds in milliseconds.
pub const TICK_MS_RANGE: (u64, u64) = (1, 50);
/// Profile used when nothing else is named.
pub const DEFAULT_PROFILE: &str = "Default";

/// Root configuration document.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use stickflow_engine::StickflowConfig;
///
/// let config = StickflowConfig::from_json_str(r#"{ "tick_ms": 500 }"#)?;
/// assert_eq!(config.tick_period(), Duration::from_millis(50));
/// assert_eq!(config.active_profile, "Default");
/// # Ok::<(), stickflow_errors::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickflowConfig {
    /// Tick period in milliseconds, clamped to [`TICK_MS_RANGE`]
    pub tick_ms: u64,
    /// Name of the profile in [`StickflowConfig::profiles`] to run with
    pub active_profile: String,
    /// Stick profiles by name
    pub profiles: BTreeMap<String, GameProfile>,
    /// Rule chain entries
    pub macros: MacroConfig,
}

impl Default for StickflowConfig {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(DEFAULT_PROFILE.to_string(), GameProfile::default());
        Self {
            tick_ms: DEFAULT_TICK_MS,
            active_profile: DEFAULT_PROFILE.to_string(),
            profiles,
            macros: MacroConfig::default(),
        }
    }
}

impl StickflowConfig {
    /// Default document with every macro entry present and a factory trigger,
    /// and only ramp compensation enabled. Printed by `stickflow sample-config`.
    pub fn sample() -> Self {
        Self {
            macros: MacroConfig::sample(),
            ..Self::default()
        }
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`]
    /// if it is not a valid document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        debug!(path = %path.display(), tick_ms = config.tick_ms, "loaded configuration");
        Ok(config)
    }

    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] if `json` is not a valid document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.tick_ms = config.tick_ms.clamp(TICK_MS_RANGE.0, TICK_MS_RANGE.1);
        Ok(config)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Serialize`] if serialisation fails.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Tick period, clamped.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.clamp(TICK_MS_RANGE.0, TICK_MS_RANGE.1))
    }

    /// Tick rate in Hz.
    pub fn tick_rate_hz(&self) -> f64 {
        1.0 / self.tick_period().as_secs_f64()
    }

    /// The active profile, or defaults if it is not defined.
    pub fn game_profile(&self) -> GameProfile {
        match self.profiles.get(&self.active_profile) {
            Some(profile) => *profile,
            None => {
                warn!(
                    profile = %self.active_profile,
                    "active profile not found, using defaults"
                );
                GameProfile::default()
            }
        }
    }
}

/// One macro entry: whether it runs, what activates it, and its parameters.
///
/// Parameters sit beside `enabled` and `trigger` in the JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroEntry<P> {
    /// Whether the rule is built into the chain
    #[serde(default)]
    pub enabled: bool,
    /// Trigger expression, e.g. `"L1+R1"`; empty never activates
    #[serde(default)]
    pub trigger: String,
    /// Rule parameters
    #[serde(flatten)]
    pub params: P,
}

impl<P: Default> MacroEntry<P> {
    /// Enabled entry with default parameters.
    pub fn enabled(trigger: impl Into<String>) -> Self {
        Self {
            enabled: true,
            trigger: trigger.into(),
            params: P::default(),
        }
    }

    /// Disabled entry with default parameters.
    pub fn disabled(trigger: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::enabled(trigger)
        }
    }

    /// Replace the parameters.
    pub fn with_params(mut self, params: P) -> Self {
        self.params = params;
        self
    }
}

/// Button alias parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasParams {
    /// Button held while the trigger holds
    pub button: Button,
}

impl Default for AliasParams {
    fn default() -> Self {
        Self { button: Button::L3 }
    }
}

/// Adaptive compensation parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveMacro {
    /// Rule tunables
    #[serde(flatten)]
    pub params: AdaptiveParams,
    /// Expression counted as one shot on each rising edge, evaluated on the
    /// output frame; defaults to the activation trigger
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shot_trigger: Option<String>,
    /// Algorithm constants
    pub calibration: CalibrationConstants,
}

/// Proximity assist parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityMacro {
    /// Rule tunables
    #[serde(flatten)]
    pub params: ProximityParams,
    /// Expression that selects the stronger aim-down-sights tuning
    pub ads_trigger: String,
}

impl Default for ProximityMacro {
    fn default() -> Self {
        Self {
            params: ProximityParams::default(),
            ads_trigger: "L1".to_string(),
        }
    }
}

/// Macro entries, one per rule kind. A missing entry is the same as a
/// disabled one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroConfig {
    /// Toggle a button at a fixed rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rapid_fire: Option<MacroEntry<RapidFireParams>>,
    /// Hold a button while the trigger holds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_alias: Option<MacroEntry<AliasParams>>,
    /// One timed press per activation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse: Option<MacroEntry<PulseParams>>,
    /// Learning drift compensation; wins over `ramp_compensation`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adaptive_compensation: Option<MacroEntry<AdaptiveMacro>>,
    /// Fixed-direction compensation with a ramp envelope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ramp_compensation: Option<MacroEntry<RampParams>>,
    /// Slowdown and pull near a target point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proximity_assist: Option<MacroEntry<ProximityMacro>>,
}

impl MacroConfig {
    /// Every entry present with its factory trigger; only ramp compensation
    /// is enabled.
    pub fn sample() -> Self {
        Self {
            rapid_fire: Some(MacroEntry::disabled("R1")),
            button_alias: Some(MacroEntry::disabled("L1")),
            pulse: Some(MacroEntry::disabled("L1+R1")),
            adaptive_compensation: Some(MacroEntry::disabled("R1")),
            ramp_compensation: Some(MacroEntry::enabled("R1")),
            proximity_assist: Some(MacroEntry::disabled("L1+R1")),
        }
    }

    /// Number of enabled entries.
    pub fn enabled_count(&self) -> usize {
        [
            is_enabled(&self.rapid_fire),
            is_enabled(&self.button_alias),
            is_enabled(&self.pulse),
            is_enabled(&self.adaptive_compensation),
            is_enabled(&self.ramp_compensation),
            is_enabled(&self.proximity_assist),
        ]
        .into_iter()
        .filter(|on| *on)
        .count()
    }
}

pub(crate) fn is_enabled<P>(entry: &Option<MacroEntry<P>>) -> bool {
    entry.as_ref().is_some_and(|e| e.enabled)
}
