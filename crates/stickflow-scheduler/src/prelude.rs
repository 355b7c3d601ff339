//! Commonly used scheduler types.

pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::lateness::LatenessMetrics;
pub use crate::scheduler::{Tick, TickScheduler};
pub use crate::wait::{HybridWait, SimulatedWait, WaitStrategy};
pub use crate::{DEFAULT_MAX_LAG_PERIODS, DEFAULT_PERIOD};
