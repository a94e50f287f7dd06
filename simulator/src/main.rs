//! Desktop runner for the Ed25519 benchmark.
//!
//! Runs the same driver and workload as the firmware, with nanosecond
//! wall-clock ticks instead of CPU cycles and stdout instead of UART.
//! The run stops early if stdout goes away (e.g. piped into `head`).
//!
//! ```bash
//! cargo run -p bench-simulator --release -- 500   # 500 rounds (default 300)
//! ```

#![allow(clippy::cast_possible_truncation)]

mod channel;
mod timing;

use std::io::{self, Write};
use std::process::ExitCode;

use bench_common::config::CALIBRATION_ROUNDS;
use bench_common::{CycleTimer, Driver, DriverConfig, Halt, calibrate};
use bench_pico2::Ed25519Workload;
use bench_pico2::workload::{CATEGORY_COUNT, PHASE_COUNT};
use channel::WriteChannel;
use timing::{DEFAULT_ITERATIONS, HostTimer};

/// Why a run ended before its last round.
#[derive(Debug)]
enum Stop {
    /// The workload failed; the driver already printed `ERR ...`.
    Halt(Halt),
    /// Writing the report failed.
    Output(io::Error),
}

type Bench<W, T> = Driver<WriteChannel<W>, T, Ed25519Workload, CATEGORY_COUNT, PHASE_COUNT>;

fn parse_iterations() -> Result<u32, String> {
    match std::env::args().nth(1) {
        None => Ok(DEFAULT_ITERATIONS),
        Some(arg) => arg.parse().map_err(|e| format!("invalid iteration count {:?}: {}", arg, e)),
    }
}

fn check_output<W: Write, T>(driver: &mut Bench<W, T>) -> Result<(), Stop> {
    match driver.output_mut().take_error() {
        Some(e) => Err(Stop::Output(e)),
        None => Ok(()),
    }
}

/// Banner, startup pass, then `iterations` rounds.
fn run<W: Write, T: CycleTimer>(
    driver: &mut Bench<W, T>,
    iterations: u32,
) -> Result<(), Stop> {
    driver.banner();
    check_output(driver)?;
    driver.prime().map_err(Stop::Halt)?;
    check_output(driver)?;
    for _ in 0..iterations {
        driver.run_one_iteration().map_err(Stop::Halt)?;
        check_output(driver)?;
    }
    driver.output_mut().flush().map_err(Stop::Output)
}

fn main() -> ExitCode {
    let iterations = match parse_iterations() {
        Ok(n) => n,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("usage: simulator [ITERATIONS]");
            return ExitCode::from(2);
        }
    };

    let mut timer = HostTimer::new();
    let overhead = calibrate(&mut timer, CALIBRATION_ROUNDS);
    eprintln!("host timer: {} ns read overhead, {} rounds", overhead, iterations);

    let out = WriteChannel::new(io::stdout().lock());
    let config = DriverConfig::new().with_overhead(overhead);
    let mut driver = Driver::new(out, timer, Ed25519Workload::new(), config);

    match run(&mut driver, iterations) {
        Ok(()) => {
            eprintln!("done after {} rounds", iterations);
            ExitCode::SUCCESS
        }
        Err(Stop::Halt(halt)) => {
            eprintln!("benchmark halted: {}", halt);
            ExitCode::FAILURE
        }
        Err(Stop::Output(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
            eprintln!("stdout closed after {} rounds", driver.iteration());
            ExitCode::SUCCESS
        }
        Err(Stop::Output(e)) => {
            eprintln!("writing report failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
