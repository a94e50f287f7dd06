//! Ed25519 benchmark firmware library - host-testable modules.
//!
//! The binary (`main.rs`) wires these to the RP2350 peripherals: the DWT
//! cycle counter as the benchmark timer and UART0 as the output channel.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p bench-pico2 --lib --target x86_64-unknown-linux-gnu  # Linux/macOS
//! cargo test -p bench-pico2 --lib --target x86_64-pc-windows-msvc    # Windows
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod config;
pub mod workload;

mod profiling {
    pub mod cpu_cycles;
}

pub use profiling::cpu_cycles;
pub use workload::Ed25519Workload;
