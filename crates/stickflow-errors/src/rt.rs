//! Tick-path error codes.
//!
//! These error types are designed for use on the tick thread:
//! - Copy semantics (no heap allocations)
//! - Fixed numeric codes for cheap reporting

use core::fmt;

use crate::common::ErrorSeverity;

/// Error codes produced inside a tick.
///
/// Any of these returned from a tick ends the loop; the supervisor decides
/// whether to restart it.
///
/// # Examples
///
/// ```
/// use stickflow_errors::{ErrorSeverity, RTError};
///
/// let err = RTError::PipelineFault;
/// assert_eq!(err.code(), 2);
/// assert_eq!(err.severity(), ErrorSeverity::Error);
/// assert_eq!(RTError::from_code(err.code()), Some(err));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RTError {
    /// The output sink went away
    SinkDisconnected = 1,
    /// A rule left a non-finite value in the output frame
    PipelineFault = 2,
    /// The output sink refused a frame
    SinkRejected = 3,
    /// Shared input state could not be read
    InputUnavailable = 4,
    /// The scheduler fell far enough behind to resynchronise
    TimingViolation = 5,
}

impl RTError {
    /// Get the numeric error code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Get the error severity.
    pub fn severity(self) -> ErrorSeverity {
        match self {
            RTError::SinkDisconnected => ErrorSeverity::Critical,
            RTError::PipelineFault => ErrorSeverity::Error,
            RTError::SinkRejected => ErrorSeverity::Error,
            RTError::InputUnavailable => ErrorSeverity::Critical,
            RTError::TimingViolation => ErrorSeverity::Warning,
        }
    }

    /// Create an error from a code.
    ///
    /// Returns `None` if the code does not correspond to a known error.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(RTError::SinkDisconnected),
            2 => Some(RTError::PipelineFault),
            3 => Some(RTError::SinkRejected),
            4 => Some(RTError::InputUnavailable),
            5 => Some(RTError::TimingViolation),
            _ => None,
        }
    }
}

impl fmt::Display for RTError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RTError::SinkDisconnected => write!(f, "Output sink disconnected"),
            RTError::PipelineFault => write!(f, "Rule chain produced a non-finite value"),
            RTError::SinkRejected => write!(f, "Output sink rejected the frame"),
            RTError::InputUnavailable => write!(f, "Shared input state unavailable"),
            RTError::TimingViolation => write!(f, "Tick loop fell behind schedule"),
        }
    }
}

impl std::error::Error for RTError {}
