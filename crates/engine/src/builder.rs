//! Rule chain construction from [`MacroConfig`].
//!
//! Chain order is fixed: rapid fire, button alias, pulse, compensation,
//! proximity assist. Rapid fire runs first so the compensation rule sees its
//! pulses on the output frame. Adaptive compensation replaces ramp
//! compensation when both are enabled.

use stickflow_errors::ConfigError;
use stickflow_pipeline::{Condition, RuleChain};
use stickflow_rules::{
    AdaptiveCompensationRule, AssistTarget, ButtonAliasRule, ProximityAssistRule, PulseRule,
    RampCompensationRule, RapidFireRule, SharedTarget,
};
use tracing::{debug, info};

use crate::config::{MacroConfig, MacroEntry, is_enabled};

/// Build the rule chain for `macros`, with proximity assist aiming at the
/// stick centre.
///
/// # Errors
///
/// [`ConfigError::InvalidTrigger`] if an enabled entry's trigger expression
/// does not parse. Disabled entries are not checked.
///
/// # Example
///
/// ```
/// use stickflow_engine::{MacroConfig, MacroEntry, build_rule_chain};
///
/// let macros = MacroConfig {
///     rapid_fire: Some(MacroEntry::enabled("R2")),
///     ramp_compensation: Some(MacroEntry::enabled("R2")),
///     ..MacroConfig::default()
/// };
/// let chain = build_rule_chain(&macros)?;
/// assert_eq!(chain.names().collect::<Vec<_>>(), ["rapid_fire", "ramp_compensation"]);
/// # Ok::<(), stickflow_errors::ConfigError>(())
/// ```
pub fn build_rule_chain(macros: &MacroConfig) -> Result<RuleChain, ConfigError> {
    build(macros, AssistTarget::Center)
}

/// Like [`build_rule_chain`], with proximity assist aiming at a target point
/// published by another component.
///
/// # Errors
///
/// As [`build_rule_chain`].
pub fn build_rule_chain_with_target(
    macros: &MacroConfig,
    target: SharedTarget,
) -> Result<RuleChain, ConfigError> {
    build(macros, AssistTarget::Shared(target))
}

fn build(macros: &MacroConfig, target: AssistTarget) -> Result<RuleChain, ConfigError> {
    let mut chain = RuleChain::new();

    if let Some(entry) = active(&macros.rapid_fire) {
        chain = chain.with_rule(RapidFireRule::new(condition(&entry.trigger)?, entry.params));
    }

    if let Some(entry) = active(&macros.button_alias) {
        chain = chain.with_rule(ButtonAliasRule::new(
            condition(&entry.trigger)?,
            entry.params.button,
        ));
    }

    if let Some(entry) = active(&macros.pulse) {
        chain = chain.with_rule(PulseRule::new(condition(&entry.trigger)?, entry.params));
    }

    if let Some(entry) = active(&macros.adaptive_compensation) {
        let activation = condition(&entry.trigger)?;
        let shot = match entry.params.shot_trigger.as_deref() {
            Some(expr) => condition(expr)?,
            None => activation.clone(),
        };
        let rule =
            AdaptiveCompensationRule::with_shot_condition(activation, shot, entry.params.params)
                .with_calibration(entry.params.calibration);
        chain = chain.with_rule(rule);
        if is_enabled(&macros.ramp_compensation) {
            debug!("ramp compensation skipped, adaptive compensation is enabled");
        }
    } else if let Some(entry) = active(&macros.ramp_compensation) {
        chain = chain.with_rule(RampCompensationRule::new(condition(&entry.trigger)?, entry.params));
    }

    if let Some(entry) = active(&macros.proximity_assist) {
        let rule = ProximityAssistRule::new(
            condition(&entry.trigger)?,
            condition(&entry.params.ads_trigger)?,
            entry.params.params,
        )
        .with_target(target);
        chain = chain.with_rule(rule);
    }

    info!(rules = chain.len(), "built rule chain");
    Ok(chain)
}

fn active<P>(entry: &Option<MacroEntry<P>>) -> Option<&MacroEntry<P>> {
    entry.as_ref().filter(|e| e.enabled)
}

fn condition(expression: &str) -> Result<Condition, ConfigError> {
    Condition::parse(expression)
        .map_err(|e| ConfigError::invalid_trigger(expression, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdaptiveMacro, ProximityMacro};
    use stickflow_pipeline::{Button, InputSnapshot, OutputFrame, TickContext, Trigger};
    use stickflow_rules::RapidFireParams;
    use std::time::Duration;

    fn everything() -> MacroConfig {
        MacroConfig {
            rapid_fire: Some(MacroEntry::enabled("R1")),
            button_alias: Some(MacroEntry::enabled("L1")),
            pulse: Some(MacroEntry::enabled("L1+R1")),
            adaptive_compensation: Some(MacroEntry::enabled("R2")),
            ramp_compensation: Some(MacroEntry::enabled("R1")),
            proximity_assist: Some(MacroEntry::enabled("L1+R1")),
        }
    }

    #[test]
    fn empty_config_builds_empty_chain() -> Result<(), ConfigError> {
        assert!(build_rule_chain(&MacroConfig::default())?.is_empty());
        Ok(())
    }

    #[test]
    fn chain_order_is_fixed_and_adaptive_wins() -> Result<(), ConfigError> {
        let chain = build_rule_chain(&everything())?;
        let names: Vec<_> = chain.names().collect();
        assert_eq!(
            names,
            [
                "rapid_fire",
                "button_alias",
                "pulse",
                "adaptive_compensation",
                "proximity_assist"
            ]
        );
        Ok(())
    }

    #[test]
    fn ramp_is_used_without_adaptive() -> Result<(), ConfigError> {
        let macros = MacroConfig {
            adaptive_compensation: Some(MacroEntry::disabled("R2")),
            ..everything()
        };
        let names: Vec<_> = build_rule_chain(&macros)?.names().collect();
        assert!(names.contains(&"ramp_compensation"));
        assert!(!names.contains(&"adaptive_compensation"));
        Ok(())
    }

    #[test]
    fn bad_trigger_is_rejected_only_when_enabled() {
        let mut macros = MacroConfig {
            pulse: Some(MacroEntry::disabled("L1+WHAT")),
            ..MacroConfig::default()
        };
        assert!(build_rule_chain(&macros).is_ok());

        macros.pulse = Some(MacroEntry::enabled("L1+WHAT"));
        let err = build_rule_chain(&macros).err();
        assert!(matches!(
            &err,
            Some(ConfigError::InvalidTrigger { expression, reason })
                if expression == "L1+WHAT" && reason.contains("WHAT")
        ));
    }

    #[test]
    fn bad_shot_and_ads_triggers_are_rejected() {
        let adaptive = MacroConfig {
            adaptive_compensation: Some(MacroEntry::enabled("R2").with_params(AdaptiveMacro {
                shot_trigger: Some("R1|".to_string()),
                ..AdaptiveMacro::default()
            })),
            ..MacroConfig::default()
        };
        assert!(matches!(
            build_rule_chain(&adaptive),
            Err(ConfigError::InvalidTrigger { .. })
        ));

        let proximity = MacroConfig {
            proximity_assist: Some(MacroEntry::enabled("L1").with_params(ProximityMacro {
                ads_trigger: "ZOOM".to_string(),
                ..ProximityMacro::default()
            })),
            ..MacroConfig::default()
        };
        assert!(matches!(
            build_rule_chain(&proximity),
            Err(ConfigError::InvalidTrigger { .. })
        ));
    }

    #[test]
    fn built_rules_carry_their_parameters() -> Result<(), ConfigError> {
        let macros = MacroConfig {
            rapid_fire: Some(MacroEntry::enabled("R2").with_params(RapidFireParams {
                button: Button::Cross,
                rate_hz: 10.0,
            })),
            ..MacroConfig::default()
        };
        let mut chain = build_rule_chain(&macros)?;

        let input = InputSnapshot::default().with_trigger(Trigger::R2, 255);
        let mut frame = OutputFrame {
            r2: 255,
            ..OutputFrame::default()
        };
        let ctx = TickContext::new(0, Duration::ZERO, 0.005);
        assert!(chain.apply(&ctx, &input, &mut frame).is_ok());
        assert!(frame.buttons.get(Button::Cross));
        Ok(())
    }

    #[test]
    fn shared_target_variant_builds() -> Result<(), ConfigError> {
        let target = SharedTarget::new();
        let macros = MacroConfig {
            proximity_assist: Some(MacroEntry::enabled("L2")),
            ..MacroConfig::default()
        };
        let chain = build_rule_chain_with_target(&macros, target)?;
        assert_eq!(chain.names().collect::<Vec<_>>(), ["proximity_assist"]);
        Ok(())
    }
}
