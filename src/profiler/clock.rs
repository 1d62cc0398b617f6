//! Cycle counters used to timestamp call and return events.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of monotonically non-decreasing cycle timestamps
pub trait CycleClock {
    fn now(&self) -> u64;
}

/// CPU time-stamp counter
///
/// Falls back to [`MonotonicClock`] nanoseconds on targets without `rdtsc`.
#[derive(Debug, Clone)]
pub struct TscClock {
    #[cfg(not(target_arch = "x86_64"))]
    fallback: MonotonicClock,
}

impl TscClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_arch = "x86_64"))]
            fallback: MonotonicClock::new(),
        }
    }
}

impl Default for TscClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleClock for TscClock {
    #[cfg(target_arch = "x86_64")]
    #[inline]
    #[allow(unused_unsafe)]
    fn now(&self) -> u64 {
        // SAFETY: rdtsc has no preconditions and is available on every x86_64 CPU.
        unsafe {
            core::arch::x86_64::_rdtsc()
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    #[inline]
    fn now(&self) -> u64 {
        self.fallback.now()
    }
}

/// Nanoseconds elapsed since the clock was created
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleClock for MonotonicClock {
    #[inline]
    fn now(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Externally driven clock
///
/// Clones share the same counter, so a trace replayer can hold one handle
/// and set the time while the profiler reads it through another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    cycles: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, cycles: u64) {
        self.cycles.set(cycles);
    }

    pub fn advance(&self, delta: u64) {
        self.cycles.set(self.cycles.get() + delta);
    }
}

impl CycleClock for ManualClock {
    #[inline]
    fn now(&self) -> u64 {
        self.cycles.get()
    }
}
