//! Allocation tracking for tick-path tests.
//!
//! Install [`TrackingAllocator`] as the global allocator of a test binary,
//! warm the code under test up, then wrap the measured region in [`track`].
//! Counting is per thread so parallel tests do not see each other.
//!
//! ```rust,ignore
//! #[global_allocator]
//! static ALLOC: TrackingAllocator = TrackingAllocator;
//!
//! let guard = track();
//! chain.apply(&ctx, &input, &mut frame)?;
//! assert_no_alloc!(guard, "chain apply");
//! ```

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

thread_local! {
    static COUNT: Cell<usize> = const { Cell::new(0) };
    static BYTES: Cell<usize> = const { Cell::new(0) };
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

fn record(bytes: usize) {
    // try_with: the allocator can run while thread locals are torn down.
    let active = DEPTH.try_with(|d| d.get() > 0).unwrap_or(false);
    if !active {
        return;
    }
    let _ = COUNT.try_with(|c| c.set(c.get().saturating_add(1)));
    let _ = BYTES.try_with(|b| b.set(b.get().saturating_add(bytes)));
}

/// System allocator wrapper that counts allocations inside a [`track`] scope.
#[derive(Debug)]
pub struct TrackingAllocator;

// SAFETY: every call forwards to `System` with the caller's arguments.
unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: same contract as `GlobalAlloc::alloc`.
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            record(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: `ptr` came from `alloc`/`realloc` above with this layout.
        unsafe { System.dealloc(ptr, layout) };
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: same contract as `GlobalAlloc::realloc`.
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() && new_size > layout.size() {
            record(new_size - layout.size());
        }
        new_ptr
    }
}

/// Counts allocations on the current thread while alive.
///
/// Guards nest; counting stops when the last one drops.
#[derive(Debug)]
pub struct AllocationGuard {
    start_count: usize,
    start_bytes: usize,
}

impl AllocationGuard {
    /// Start counting.
    pub fn new() -> Self {
        DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        Self {
            start_count: COUNT.with(Cell::get),
            start_bytes: BYTES.with(Cell::get),
        }
    }

    /// Allocations since this guard was created.
    pub fn allocations(&self) -> usize {
        COUNT.with(Cell::get).saturating_sub(self.start_count)
    }

    /// Bytes requested since this guard was created.
    pub fn bytes(&self) -> usize {
        BYTES.with(Cell::get).saturating_sub(self.start_bytes)
    }

    /// Whether anything was allocated.
    pub fn has_allocations(&self) -> bool {
        self.allocations() > 0
    }
}

impl Default for AllocationGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AllocationGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Start an allocation-counting scope.
pub fn track() -> AllocationGuard {
    AllocationGuard::new()
}

/// Panic if `guard` saw any allocation.
#[macro_export]
macro_rules! assert_no_alloc {
    ($guard:expr) => {
        $crate::assert_no_alloc!($guard, "tick path")
    };
    ($guard:expr, $context:expr) => {
        let guard = &$guard;
        let allocs = guard.allocations();
        if allocs > 0 {
            panic!(
                "allocation on tick path in '{}': {} allocations ({} bytes) at {}:{}",
                $context,
                allocs,
                guard.bytes(),
                file!(),
                line!()
            );
        }
    };
}
