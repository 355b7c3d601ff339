//! Output sink port.
//!
//! The engine hands each finished frame to an [`OutputSink`] once per tick.
//! Mapping normalised values onto a device's numeric ranges is the sink's
//! job; [`stickflow_filters::to_xinput_axis`] and
//! [`stickflow_filters::to_trigger_byte`] cover the common targets.

use stickflow_errors::RTError;
use stickflow_filters::to_xinput_axis;
use stickflow_pipeline::OutputFrame;
use tracing::{debug, trace};

/// Why a sink refused a frame.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The device or consumer behind the sink is gone
    #[error("output sink disconnected")]
    Disconnected,

    /// The sink rejected this frame
    #[error("output sink rejected frame: {0}")]
    Rejected(String),

    /// Writing to the device failed
    #[error("output sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    /// Tick-path error code for this failure.
    pub fn rt_error(&self) -> RTError {
        match self {
            SinkError::Disconnected => RTError::SinkDisconnected,
            SinkError::Rejected(_) | SinkError::Io(_) => RTError::SinkRejected,
        }
    }
}

/// Receives one finished frame per tick.
///
/// # RT Safety
///
/// `send` runs on the tick thread. Implementations should hand the frame
/// off (copy into a buffer, write a report) without blocking for longer than
/// a fraction of the tick period. Any error ends the loop.
pub trait OutputSink: Send {
    /// Deliver one frame.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the frame cannot be delivered.
    fn send(&mut self, frame: &OutputFrame) -> Result<(), SinkError>;
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn send(&mut self, frame: &OutputFrame) -> Result<(), SinkError> {
        (**self).send(frame)
    }
}

/// Discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    #[inline]
    fn send(&mut self, _frame: &OutputFrame) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Logs frames at `trace` level, plus every `every`-th frame at `debug`.
///
/// Used by the CLI when no device is attached.
#[derive(Debug, Clone)]
pub struct TracingSink {
    every: u64,
    sent: u64,
}

impl TracingSink {
    /// Log a summary line every `every` frames (at least 1).
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            sent: 0,
        }
    }

    /// Frames received so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(200)
    }
}

impl OutputSink for TracingSink {
    fn send(&mut self, frame: &OutputFrame) -> Result<(), SinkError> {
        trace!(
            rx = frame.right_x,
            ry = frame.right_y,
            buttons = ?frame.buttons,
            "frame"
        );
        self.sent = self.sent.saturating_add(1);
        if self.sent.is_multiple_of(self.every) {
            debug!(
                frame = self.sent,
                lx = to_xinput_axis(frame.left_x),
                ly = to_xinput_axis(frame.left_y),
                rx = to_xinput_axis(frame.right_x),
                ry = to_xinput_axis(frame.right_y),
                l2 = frame.l2,
                r2 = frame.r2,
                "output frame"
            );
        }
        Ok(())
    }
}
