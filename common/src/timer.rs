//! Cycle timer capability and wrap-safe elapsed arithmetic.
//!
//! # Overflow Handling
//!
//! The hardware counter is a free-running 32-bit value that wraps with no
//! signal. At 150 MHz it wraps every ~28.6 seconds, at 48 MHz every ~89
//! seconds. [`elapsed`] uses `wrapping_sub`, which recovers the true forward
//! distance as long as the measured operation takes less than one full wrap
//! period. Callers must keep individual measurements well under that.

/// Monotonic, wrapping 32-bit tick source.
pub trait CycleTimer {
    /// Read the current tick count.
    fn now(&mut self) -> u32;
}

impl<T: CycleTimer + ?Sized> CycleTimer for &mut T {
    #[inline]
    fn now(&mut self) -> u32 { (**self).now() }
}

/// Ticks between two readings, correct across one counter wrap.
#[inline]
pub const fn elapsed(
    begin: u32,
    end: u32,
) -> u32 {
    end.wrapping_sub(begin)
}

/// Time one call of `f`, returning its result and the elapsed ticks.
#[inline]
pub fn measure<T: CycleTimer + ?Sized, R>(
    timer: &mut T,
    f: impl FnOnce() -> R,
) -> (R, u32) {
    let begin = timer.now();
    let result = f();
    let end = timer.now();
    (result, elapsed(begin, end))
}

/// Measure the fixed cost of two back-to-back timer reads.
///
/// Returns the smallest delta seen over `rounds` attempts (at least one),
/// which is the overhead a measurement of an empty operation would report.
pub fn calibrate<T: CycleTimer + ?Sized>(
    timer: &mut T,
    rounds: u32,
) -> u32 {
    let mut best = u32::MAX;
    for _ in 0..rounds.max(1) {
        let ((), ticks) = measure(timer, || ());
        best = best.min(ticks);
    }
    best
}
