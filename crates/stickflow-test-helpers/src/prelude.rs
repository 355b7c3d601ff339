//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use stickflow_test_helpers::prelude::*;
//! ```

pub use crate::must::{must, must_parse, must_some, must_with};

#[cfg(feature = "tracking")]
pub use crate::tracking::{AllocationGuard, TrackingAllocator, track};

#[cfg(feature = "fixtures")]
pub use crate::fixtures::{Drift, PulseTrain, holding, pulling, ticks};

pub use crate::{assert_all_within, assert_approx_eq, assert_no_alloc, assert_non_increasing};

/// Result type for tests that use `?`.
pub type TestResult = Result<(), Box<dyn std::error::Error>>;
