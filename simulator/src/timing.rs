//! Wall-clock tick source for the simulator.
//!
//! There is no cycle counter on the desktop, so ticks are nanoseconds since
//! the timer was created, truncated to 32 bits. That wraps every ~4.3
//! seconds, far longer than any single Ed25519 operation.

use std::time::Instant;

use bench_common::CycleTimer;

/// Iterations run when no count is given on the command line.
pub const DEFAULT_ITERATIONS: u32 = 300;

/// [`CycleTimer`] counting nanoseconds since creation.
pub struct HostTimer {
    start: Instant,
}

impl HostTimer {
    pub fn new() -> Self { Self { start: Instant::now() } }
}

impl CycleTimer for HostTimer {
    fn now(&mut self) -> u32 { self.start.elapsed().as_nanos() as u32 }
}
