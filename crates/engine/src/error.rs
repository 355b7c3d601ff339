//! Engine lifecycle errors.

use stickflow_errors::{ConfigError, ErrorSeverity, RTError};

use crate::ports::SinkError;

/// Why the engine could not start, or why its loop ended.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// `start` was called while the loop was running
    #[error("engine is already running")]
    AlreadyRunning,

    /// The tick thread could not be spawned
    #[error("failed to spawn tick thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The rule chain faulted on a tick
    #[error("tick {tick} faulted: {error}")]
    Tick {
        /// Tick index
        tick: u64,
        /// Fault code
        error: RTError,
    },

    /// The output sink failed on a tick
    #[error("output sink failed on tick {tick}: {source}")]
    Sink {
        /// Tick index
        tick: u64,
        /// Sink failure
        #[source]
        source: SinkError,
    },

    /// The tick thread panicked
    #[error("tick thread panicked")]
    TickThreadPanicked,

    /// Configuration could not be turned into a running engine
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Tick-path code, for errors raised inside a tick.
    pub fn rt_error(&self) -> Option<RTError> {
        match self {
            EngineError::Tick { error, .. } => Some(*error),
            EngineError::Sink { source, .. } => Some(source.rt_error()),
            _ => None,
        }
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::AlreadyRunning => ErrorSeverity::Warning,
            EngineError::Spawn(_) | EngineError::TickThreadPanicked => ErrorSeverity::Critical,
            EngineError::Tick { error, .. } => error.severity(),
            EngineError::Sink { source, .. } => source.rt_error().severity(),
            EngineError::Config(e) => e.severity(),
        }
    }
}
