//! Loop events published off the tick thread.
//!
//! The tick thread never logs per-tick detail itself beyond `trace`; state
//! changes worth reporting go through a bounded channel with `try_send`, and
//! are dropped when nobody drains it.

use crossbeam::channel::{Receiver, Sender, TrySendError, bounded};

/// Default channel depth.
pub const EVENT_CAPACITY: usize = 256;

/// Something the tick loop wants observers to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// The loop started
    Started {
        /// Tick period in microseconds
        period_us: u64,
    },
    /// A newly published chain was adopted at the start of `tick`
    ChainSwapped {
        /// Tick index
        tick: u64,
        /// Version of the adopted chain
        version: u64,
    },
    /// The scheduler abandoned its backlog
    Resynced {
        /// Tick index
        tick: u64,
        /// Deadlines skipped
        dropped: u64,
    },
    /// The loop ended because of a tick fault
    Faulted {
        /// Tick index
        tick: u64,
        /// [`stickflow_errors::RTError`] code
        code: u8,
    },
    /// The loop ended
    Stopped {
        /// Ticks processed
        ticks: u64,
    },
}

/// Sending half, owned by the tick thread.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    tx: Sender<EngineEvent>,
}

impl EventPublisher {
    /// Publish without blocking. Returns `false` if the event was dropped.
    ///
    /// # RT Safety
    ///
    /// Never blocks; the channel is pre-allocated.
    #[inline]
    pub fn publish(&self, event: EngineEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => false,
        }
    }
}

/// A bounded event channel.
pub fn event_channel(capacity: usize) -> (EventPublisher, Receiver<EngineEvent>) {
    let (tx, rx) = bounded(capacity.max(1));
    (EventPublisher { tx }, rx)
}
