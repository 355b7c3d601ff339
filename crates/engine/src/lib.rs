//! Stickflow engine: the fixed-tick loop and everything around it.
//!
//! # Overview
//!
//! - **Input** ([`input`]): [`SharedInput`], written in batches by the
//!   transport thread and copied once per tick
//! - **Ports** ([`ports`]): the [`OutputSink`] each finished frame goes to
//! - **Configuration** ([`config`]): the JSON document with tick rate, stick
//!   profiles and macro entries
//! - **Builder** ([`builder`]): [`build_rule_chain`] turns macro entries into
//!   a [`RuleChain`](stickflow_pipeline::RuleChain)
//! - **Tick** ([`tick`]): [`TickPipeline`], one tick end to end
//! - **Engine** ([`engine`]): the tick thread, hot swap and shutdown
//!
//! # Threads
//!
//! ```text
//! transport ──apply_batch──▶ SharedInput ◀──snapshot── stickflow-tick ──send──▶ sink
//! config/UI ──replace_chain──▶ ChainSlot ◀──refresh (tick boundary)──┘
//! ```
//!
//! The tick thread owns the rules; nothing else touches them. The only state
//! it shares is the input snapshot, the chain slot, the loop counters and the
//! event channel.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
#[cfg(any(test, feature = "harness"))]
pub mod harness;
pub mod input;
pub mod ports;
pub mod prelude;
pub mod tick;

pub use builder::{build_rule_chain, build_rule_chain_with_target};
pub use config::{
    AdaptiveMacro, AliasParams, DEFAULT_PROFILE, DEFAULT_TICK_MS, MacroConfig, MacroEntry,
    ProximityMacro, StickflowConfig, TICK_MS_RANGE,
};
pub use engine::{Engine, TICK_THREAD_NAME};
pub use error::EngineError;
pub use events::{EngineEvent, EventPublisher};
#[cfg(any(test, feature = "harness"))]
pub use harness::{ManualHarness, RecordingSink};
pub use input::{InputUpdate, SharedInput};
pub use ports::{NullSink, OutputSink, SinkError, TracingSink};
pub use tick::{LoopReport, TickPipeline};
