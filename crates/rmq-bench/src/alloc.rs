//! Allocation tracking for build memory samples.
//!
//! [`TrackingAllocator`] forwards to the system allocator and keeps a running total of live
//! bytes. On top of that, [`measure_peak`] follows the high-water mark of a single closure on the
//! calling thread only, so allocations of other threads (such as a detached worker that missed its
//! deadline) are never charged to it. Nothing is measured until the allocator is installed with
//! `#[global_allocator]`, which is left to the binary.

use std::{
    alloc::{GlobalAlloc, Layout, System},
    cell::Cell,
    sync::atomic::{AtomicUsize, Ordering},
};

static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
static ALLOCATION_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Per-thread measurement state, only updated while `active`.
struct Scope {
    active: Cell<bool>,
    current: Cell<isize>,
    peak: Cell<isize>,
}

thread_local! {
    // Const initialized and without destructor, so the allocator can touch it at any time
    static SCOPE: Scope = const {
        Scope {
            active: Cell::new(false),
            current: Cell::new(0),
            peak: Cell::new(0),
        }
    };
}

#[derive(Debug, Default)]
pub struct TrackingAllocator;

impl TrackingAllocator {
    pub const fn new() -> Self {
        Self
    }
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: We're delegating to the system allocator with the same layout
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: We're delegating to the system allocator with the same layout
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        ALLOCATED.fetch_sub(layout.size(), Ordering::SeqCst);
        let _ = SCOPE.try_with(|scope| {
            if scope.active.get() {
                scope.current.set(scope.current.get() - layout.size() as isize);
            }
        });
        // SAFETY: We're delegating to the system allocator with the same ptr and layout
        unsafe { System.dealloc(ptr, layout) }
    }
}

fn record_alloc(size: usize) {
    ALLOCATION_COUNT.fetch_add(1, Ordering::Relaxed);
    ALLOCATED.fetch_add(size, Ordering::SeqCst);
    let _ = SCOPE.try_with(|scope| {
        if scope.active.get() {
            let current = scope.current.get() + size as isize;
            scope.current.set(current);
            scope.peak.set(scope.peak.get().max(current));
        }
    });
}

/// Whether the tracker is installed as global allocator.
pub fn is_active() -> bool {
    ALLOCATION_COUNT.load(Ordering::Relaxed) > 0
}

/// Bytes currently allocated by all threads.
pub fn current() -> usize {
    ALLOCATED.load(Ordering::SeqCst)
}

/// Run `f` and return its output together with the peak number of bytes it held allocated at
/// once, counting only allocations made on the calling thread while `f` runs.
///
/// Returns `0` bytes if the tracker is not installed. Calls do not nest.
pub fn measure_peak<T>(f: impl FnOnce() -> T) -> (T, usize) {
    struct Guard;

    impl Drop for Guard {
        fn drop(&mut self) {
            SCOPE.with(|scope| scope.active.set(false));
        }
    }

    SCOPE.with(|scope| {
        debug_assert!(!scope.active.get(), "Nested allocation measurement");
        scope.current.set(0);
        scope.peak.set(0);
        scope.active.set(true);
    });
    let guard = Guard;
    let output = f();
    drop(guard);

    let peak = SCOPE.with(|scope| scope.peak.get());
    (output, peak.max(0) as usize)
}
