//! Commonly used engine types.

pub use crate::builder::build_rule_chain;
pub use crate::config::{MacroConfig, MacroEntry, StickflowConfig};
pub use crate::engine::Engine;
pub use crate::error::EngineError;
pub use crate::events::EngineEvent;
pub use crate::input::{InputUpdate, SharedInput};
pub use crate::ports::{NullSink, OutputSink, SinkError};
pub use crate::tick::LoopReport;
