//! CPU cycle counter using the Cortex-M33 DWT.
//!
//! The benchmark timer reads the Data Watchpoint and Trace cycle counter
//! (CYCCNT) directly, so every figure in a report is in core clock cycles.
//!
//! # Overflow Handling
//!
//! CYCCNT is a 32-bit counter that wraps at different intervals:
//! - 48 MHz: wraps every ~89.5 seconds (2^32 / 48M)
//! - 150 MHz: wraps every ~28.6 seconds (stock clock)
//! - 250 MHz: wraps every ~17.2 seconds (`cpu250` profile)
//!
//! Deltas use `wrapping_sub` (see [`bench_common::elapsed`]), so a single
//! wrap inside a measured operation is harmless. An operation longer than
//! a full wrap period is reported modulo 2^32.

use core::sync::atomic::{AtomicU32, Ordering};

use bench_common::CycleTimer;

/// CPU frequency in Hz (set at init based on feature flags).
/// Default to 150 MHz (stock RP2350).
static CPU_FREQ_HZ: AtomicU32 = AtomicU32::new(150_000_000);

/// Accepted core clock range for [`init`].
const MIN_FREQ_HZ: u32 = 1_000_000;
const MAX_FREQ_HZ: u32 = 500_000_000;

/// Enable and reset the DWT cycle counter.
///
/// Must be called after `embassy_rp::init()`. Calling it again restarts
/// the count from zero.
///
/// # Arguments
/// * `freq_hz` - Core clock in Hz (e.g. 48_000_000, 150_000_000, 250_000_000)
pub fn init(freq_hz: u32) {
    CPU_FREQ_HZ.store(clamp_freq(freq_hz), Ordering::Relaxed);

    #[cfg(target_arch = "arm")]
    {
        use cortex_m::peripheral::{DWT, Peripherals};

        // SAFETY: only DCB.DEMCR and the DWT cycle counter registers are
        // touched, nothing else in the firmware owns them
        let mut cp = unsafe { Peripherals::steal() };
        cp.DCB.enable_trace();
        DWT::unlock();
        cp.DWT.set_cycle_count(0);
        cp.DWT.enable_cycle_counter();
    }
}

/// Limit a requested core clock to the accepted range.
#[inline]
const fn clamp_freq(freq_hz: u32) -> u32 {
    if freq_hz < MIN_FREQ_HZ {
        MIN_FREQ_HZ
    } else if freq_hz > MAX_FREQ_HZ {
        MAX_FREQ_HZ
    } else {
        freq_hz
    }
}

/// Read current cycle count (32-bit, wraps).
#[inline]
pub fn read() -> u32 {
    #[cfg(target_arch = "arm")]
    {
        cortex_m::peripheral::DWT::cycle_count()
    }
    #[cfg(not(target_arch = "arm"))]
    {
        0 // No counter on the host
    }
}

/// Get configured CPU frequency in Hz.
#[inline]
pub fn freq_hz() -> u32 { CPU_FREQ_HZ.load(Ordering::Relaxed) }

/// Convert a cycle count to whole microseconds at the configured clock.
///
/// Uses 64-bit arithmetic internally to avoid overflow.
pub fn cycles_to_us(cycles: u64) -> u64 { cycles_to_us_at(cycles, freq_hz()) }

fn cycles_to_us_at(
    cycles: u64,
    freq_hz: u32,
) -> u64 {
    if freq_hz == 0 {
        return 0;
    }
    cycles.saturating_mul(1_000_000) / u64::from(freq_hz)
}

/// [`CycleTimer`] backed by the DWT cycle counter.
pub struct DwtTimer {
    _private: (),
}

impl DwtTimer {
    /// Start the cycle counter at `freq_hz` and return a timer reading it.
    pub fn new(freq_hz: u32) -> Self {
        init(freq_hz);
        Self { _private: () }
    }
}

impl CycleTimer for DwtTimer {
    #[inline]
    fn now(&mut self) -> u32 { read() }
}

// =============================================================================
// Unit Tests (run on host with: cargo test --lib --target <host-triple>)
// =============================================================================
