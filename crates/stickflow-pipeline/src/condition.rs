//! Trigger expressions deciding when a rule is active.
//!
//! Grammar: alternatives separated by `|`, each a `+`-joined list of inputs
//! that must all be held. `"L1+R1|R2"` is "L1 and R1 together, or R2".
//! Analog triggers (`L2`, `R2`) count as held above
//! [`ANALOG_PRESS_THRESHOLD`].

use std::fmt;
use std::str::FromStr;

use crate::frame::{Button, ButtonView, Trigger};

/// Trigger value above which an analog trigger counts as held.
pub const ANALOG_PRESS_THRESHOLD: u8 = 20;

/// Why an expression failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    /// An input name was not recognised
    #[error("unknown input '{0}'")]
    UnknownInput(String),
    /// A `+` or `|` had nothing on one side
    #[error("empty term in '{0}'")]
    EmptyTerm(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    Button(Button),
    Trigger(Trigger),
}

impl Term {
    #[inline]
    fn holds<V: ButtonView + ?Sized>(self, view: &V) -> bool {
        match self {
            Term::Button(b) => view.button(b),
            Term::Trigger(t) => view.trigger(t) > ANALOG_PRESS_THRESHOLD,
        }
    }

    fn parse(token: &str) -> Result<Self, ConditionError> {
        let upper = token.trim().to_ascii_uppercase();
        match upper.as_str() {
            "L2" => Ok(Term::Trigger(Trigger::L2)),
            "R2" => Ok(Term::Trigger(Trigger::R2)),
            other => Button::from_name(other)
                .map(Term::Button)
                .ok_or_else(|| ConditionError::UnknownInput(token.trim().to_string())),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Button(b) => f.write_str(b.name()),
            Term::Trigger(Trigger::L2) => f.write_str("L2"),
            Term::Trigger(Trigger::R2) => f.write_str("R2"),
        }
    }
}

/// Parsed trigger expression.
///
/// Evaluation walks pre-parsed terms and never allocates.
///
/// # Example
///
/// ```
/// use stickflow_pipeline::{Button, Condition, InputSnapshot, Trigger};
///
/// let cond: Condition = "L1+R1|R2".parse()?;
/// let held = InputSnapshot::default().with_button(Button::L1);
/// assert!(!cond.evaluate(&held));
/// assert!(cond.evaluate(&held.with_button(Button::R1)));
/// assert!(cond.evaluate(&InputSnapshot::default().with_trigger(Trigger::R2, 200)));
/// # Ok::<(), stickflow_pipeline::ConditionError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Condition {
    alternatives: Vec<Vec<Term>>,
}

impl Condition {
    /// A condition that never holds.
    pub fn never() -> Self {
        Self::default()
    }

    /// Held while `button` is pressed.
    pub fn button(button: Button) -> Self {
        Self {
            alternatives: vec![vec![Term::Button(button)]],
        }
    }

    /// Held while `trigger` is above [`ANALOG_PRESS_THRESHOLD`].
    pub fn trigger(trigger: Trigger) -> Self {
        Self {
            alternatives: vec![vec![Term::Trigger(trigger)]],
        }
    }

    /// Parse an expression. Empty or blank input yields [`Condition::never`].
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError`] for unknown input names or dangling
    /// operators.
    pub fn parse(expression: &str) -> Result<Self, ConditionError> {
        if expression.trim().is_empty() {
            return Ok(Self::never());
        }
        let mut alternatives = Vec::new();
        for alternative in expression.split('|') {
            let mut terms = Vec::new();
            for token in alternative.split('+') {
                if token.trim().is_empty() {
                    return Err(ConditionError::EmptyTerm(expression.to_string()));
                }
                terms.push(Term::parse(token)?);
            }
            alternatives.push(terms);
        }
        Ok(Self { alternatives })
    }

    /// Whether the condition holds for `view`.
    #[inline]
    pub fn evaluate<V: ButtonView + ?Sized>(&self, view: &V) -> bool {
        self.alternatives
            .iter()
            .any(|all| all.iter().all(|term| term.holds(view)))
    }

    /// Whether this condition can never hold.
    pub fn is_never(&self) -> bool {
        self.alternatives.is_empty()
    }
}

impl FromStr for Condition {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::parse(s)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, all) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            for (j, term) in all.iter().enumerate() {
                if j > 0 {
                    f.write_str("+")?;
                }
                write!(f, "{term}")?;
            }
        }
        Ok(())
    }
}
