//! Replacing the rule chain while the loop runs.
//!
//! A configuration thread publishes a complete new [`RuleChain`] into a
//! shared [`ChainSlot`]. The tick thread owns an [`ActiveChain`] and checks
//! the slot once at the start of each tick, so a tick always runs entirely on
//! one chain and never sees a half-built one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use stickflow_errors::RTResult;

use crate::chain::RuleChain;
use crate::frame::{InputSnapshot, OutputFrame};
use crate::rule::TickContext;

/// Hand-off point for replacement chains.
///
/// Publishing twice before the tick thread looks keeps only the newest chain.
///
/// # RT Safety
///
/// The tick thread reads one atomic per tick and only takes the lock when a
/// new chain has been published. The lock is held for a pointer move.
#[derive(Debug, Default)]
pub struct ChainSlot {
    pending: Mutex<Option<RuleChain>>,
    version: AtomicU64,
}

impl ChainSlot {
    /// An empty slot at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a replacement chain and return its version.
    pub fn publish(&self, chain: RuleChain) -> u64 {
        let mut pending = self.pending.lock();
        *pending = Some(chain);
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Latest published version.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Take the pending chain if one was published after `seen`, updating
    /// `seen` to the version taken.
    #[inline]
    pub fn take_newer(&self, seen: &mut u64) -> Option<RuleChain> {
        if self.version.load(Ordering::Acquire) == *seen {
            return None;
        }
        let mut pending = self.pending.lock();
        // Read the version under the lock so it matches the chain taken.
        *seen = self.version.load(Ordering::Acquire);
        pending.take()
    }
}

/// The chain owned by the tick thread.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use stickflow_pipeline::{ActiveChain, ChainSlot, RuleChain};
///
/// let slot = Arc::new(ChainSlot::new());
/// let mut active = ActiveChain::new(RuleChain::new(), Arc::clone(&slot));
///
/// slot.publish(RuleChain::new());
/// assert!(active.refresh().is_some());
/// assert_eq!(active.version(), 1);
/// assert!(active.refresh().is_none());
/// ```
#[derive(Debug)]
pub struct ActiveChain {
    current: RuleChain,
    seen: u64,
    slot: Arc<ChainSlot>,
}

impl ActiveChain {
    /// Start on `initial`, watching `slot` for replacements.
    ///
    /// Anything already published to `slot` is treated as seen.
    pub fn new(initial: RuleChain, slot: Arc<ChainSlot>) -> Self {
        let seen = slot.version();
        Self {
            current: initial,
            seen,
            slot,
        }
    }

    /// Adopt a newly published chain, if any. Call only at a tick boundary.
    ///
    /// Returns the retired chain so the caller decides where it is dropped.
    #[inline]
    pub fn refresh(&mut self) -> Option<RuleChain> {
        let next = self.slot.take_newer(&mut self.seen)?;
        Some(std::mem::replace(&mut self.current, next))
    }

    /// Run the current chain.
    ///
    /// # Errors
    ///
    /// Propagates [`RuleChain::apply`] faults.
    #[inline]
    pub fn apply(
        &mut self,
        ctx: &TickContext,
        input: &InputSnapshot,
        output: &mut OutputFrame,
    ) -> RTResult {
        self.current.apply(ctx, input, output)
    }

    /// Version of the chain currently running (0 for the initial chain).
    pub fn version(&self) -> u64 {
        self.seen
    }

    /// The chain currently running.
    pub fn chain(&self) -> &RuleChain {
        &self.current
    }

    /// The chain currently running, mutably.
    pub fn chain_mut(&mut self) -> &mut RuleChain {
        &mut self.current
    }
}
