//! Ordered rule execution.

use stickflow_errors::{RTError, RTResult};

use crate::frame::{InputSnapshot, OutputFrame};
use crate::rule::{Rule, TickContext};

/// An ordered list of rules applied to one frame per tick.
///
/// # RT Safety
///
/// - `apply()` performs no allocations
/// - O(n) in the number of rules
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use stickflow_pipeline::prelude::*;
///
/// #[derive(Debug)]
/// struct PushRight;
///
/// impl Rule for PushRight {
///     fn name(&self) -> &'static str { "push_right" }
///     fn apply(&mut self, _: &TickContext, _: &InputSnapshot, out: &mut OutputFrame) {
///         out.offset_stick(Stick::Right, 0.75, 0.0);
///     }
/// }
///
/// let mut chain = RuleChain::new().with_rule(PushRight).with_rule(PushRight);
/// let mut frame = OutputFrame::default();
/// let ctx = TickContext::new(0, Duration::ZERO, 0.005);
/// chain.apply(&ctx, &InputSnapshot::default(), &mut frame)?;
/// assert_eq!(frame.right_x, 1.0);
/// # Ok::<(), RTError>(())
/// ```
#[derive(Debug, Default)]
pub struct RuleChain {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleChain {
    /// An empty chain; frames pass through unchanged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule, builder style.
    #[must_use]
    pub fn with_rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Append a boxed rule.
    pub fn push(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the chain has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name())
    }

    /// Run every rule in order on `output`.
    ///
    /// After each rule the stick axes are clamped to `[-1, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`RTError::PipelineFault`] as soon as a rule leaves a
    /// non-finite stick value; later rules do not run.
    #[inline]
    pub fn apply(
        &mut self,
        ctx: &TickContext,
        input: &InputSnapshot,
        output: &mut OutputFrame,
    ) -> RTResult {
        for rule in &mut self.rules {
            rule.apply(ctx, input, output);
            if !output.is_finite() {
                return Err(RTError::PipelineFault);
            }
            output.clamp_axes();
        }
        Ok(())
    }

    /// Reset every rule.
    pub fn reset(&mut self) {
        for rule in &mut self.rules {
            rule.reset();
        }
    }

    /// Describe the chain for diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot {
            rule_count: self.rules.len(),
            rule_names: self.names().collect(),
        }
    }
}

impl FromIterator<Box<dyn Rule>> for RuleChain {
    fn from_iter<I: IntoIterator<Item = Box<dyn Rule>>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

/// Chain description for logs and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSnapshot {
    /// Number of rules
    pub rule_count: usize,
    /// Rule names in execution order
    pub rule_names: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Stick;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug)]
    struct SetRightX(f64);

    impl Rule for SetRightX {
        fn name(&self) -> &'static str {
            "set_right_x"
        }

        fn apply(&mut self, _: &TickContext, _: &InputSnapshot, out: &mut OutputFrame) {
            out.right_x = self.0;
        }
    }

    /// Records the right X each tick into a log the test keeps a handle to.
    #[derive(Debug, Default)]
    struct RecordRightX(Arc<Mutex<Vec<f64>>>);

    impl RecordRightX {
        fn log(&self) -> Arc<Mutex<Vec<f64>>> {
            Arc::clone(&self.0)
        }
    }

    impl Rule for RecordRightX {
        fn name(&self) -> &'static str {
            "record"
        }

        fn apply(&mut self, _: &TickContext, _: &InputSnapshot, out: &mut OutputFrame) {
            self.0.lock().push(out.right_x);
        }
    }

    fn ctx() -> TickContext {
        TickContext::new(0, Duration::ZERO, 0.005)
    }

    #[test]
    fn empty_chain_passes_through() {
        let mut chain = RuleChain::new();
        let mut frame = OutputFrame::default();
        frame.set_stick(Stick::Left, 0.3, -0.4);
        let before = frame;
        assert!(chain.apply(&ctx(), &InputSnapshot::default(), &mut frame).is_ok());
        assert_eq!(frame, before);
    }

    #[test]
    fn later_rules_see_clamped_earlier_output() {
        let first = RecordRightX::default();
        let second = RecordRightX::default();
        let (before, after) = (first.log(), second.log());
        let mut chain = RuleChain::new()
            .with_rule(first)
            .with_rule(SetRightX(4.0))
            .with_rule(second)
            .with_rule(SetRightX(-7.5));

        let mut frame = OutputFrame::default();
        assert!(chain.apply(&ctx(), &InputSnapshot::default(), &mut frame).is_ok());
        frame.right_x = 0.25;
        assert!(chain.apply(&ctx(), &InputSnapshot::default(), &mut frame).is_ok());

        // The first recorder sees each frame as handed in.
        assert_eq!(before.lock().as_slice(), &[0.0, 0.25]);
        // The second sees 4.0 only after clamping, on every tick.
        assert_eq!(after.lock().as_slice(), &[1.0, 1.0]);
        assert!((frame.right_x + 1.0).abs() < f64::EPSILON);
        assert_eq!(
            chain.names().collect::<Vec<_>>(),
            vec!["record", "set_right_x", "record", "set_right_x"]
        );
    }

    #[test]
    fn non_finite_output_faults() {
        let mut chain = RuleChain::new()
            .with_rule(SetRightX(f64::NAN))
            .with_rule(SetRightX(0.5));
        let mut frame = OutputFrame::default();
        assert_eq!(
            chain.apply(&ctx(), &InputSnapshot::default(), &mut frame),
            Err(RTError::PipelineFault)
        );
        assert!(frame.right_x.is_nan());
    }

    #[test]
    fn snapshot_lists_rules() {
        let chain: RuleChain = vec![
            Box::new(SetRightX(0.1)) as Box<dyn Rule>,
            Box::new(RecordRightX::default()),
        ]
        .into_iter()
        .collect();
        let snap = chain.snapshot();
        assert_eq!(snap.rule_count, 2);
        assert_eq!(snap.rule_names, vec!["set_right_x", "record"]);
    }
}
