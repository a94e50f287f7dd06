//! Core of the bare-metal benchmark harness.
//!
//! This crate contains everything that does not touch hardware, shared
//! between the RP2350 firmware and the desktop simulator:
//!
//! - [`channel`]: blocking one-byte output transport
//! - [`format`]: allocation-free `printf` lookalike over a channel
//! - [`timer`]: cycle timer capability, wrap-safe elapsed, calibration
//! - [`stats`]: per-category running sums and restart detection
//! - [`workload`]: the seam to the operation under test
//! - [`report`]: report snapshots and their rendering
//! - [`driver`]: the long-run benchmark loop as a step function
//! - [`config`]: reporting cadence and driver knobs
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p bench-common
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), while the firmware builds
//! the crate as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod channel;
pub mod config;
pub mod driver;
pub mod format;
pub mod report;
pub mod stats;
pub mod timer;
pub mod workload;

// Re-export commonly used items
pub use channel::{BufferChannel, OutputChannel, SendFn};
pub use config::DriverConfig;
pub use driver::{Driver, Halt, HaltReason, Iteration};
pub use format::Arg;
pub use report::Report;
pub use stats::{CategoryStat, SampleClass, Statistics, Summary};
pub use timer::{CycleTimer, calibrate, elapsed, measure};
pub use workload::{Fault, Phase, Workload};
