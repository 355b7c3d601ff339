//! Commonly used pipeline types.

pub use crate::chain::{ChainSnapshot, RuleChain};
pub use crate::condition::{ANALOG_PRESS_THRESHOLD, Condition, ConditionError};
pub use crate::conditioning::{
    ActivationConfig, ActivationMode, Conditioner, GameProfile, ResponseSet,
};
pub use crate::frame::{Button, ButtonView, Buttons, InputSnapshot, OutputFrame, Stick, Trigger};
pub use crate::rule::{Rule, TickContext};
pub use crate::swap::{ActiveChain, ChainSlot};
pub use stickflow_errors::{RTError, RTResult};
