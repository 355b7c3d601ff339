//! Severity classification shared by every error family.

use core::fmt;

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the tick loop cannot continue
    Critical = 3,
}

impl ErrorSeverity {
    /// Whether an error of this severity ends the tick loop.
    pub fn is_fatal(self) -> bool {
        self >= ErrorSeverity::Error
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    #[test]
    fn only_error_and_above_are_fatal() {
        assert!(!ErrorSeverity::Info.is_fatal());
        assert!(!ErrorSeverity::Warning.is_fatal());
        assert!(ErrorSeverity::Error.is_fatal());
        assert!(ErrorSeverity::Critical.is_fatal());
    }

    #[test]
    fn severity_display() {
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
        assert_eq!(ErrorSeverity::Critical.to_string(), "CRITICAL");
    }
}
