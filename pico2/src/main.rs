//! Ed25519 Benchmark Firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Times keygen, sign and verify with the DWT cycle counter and streams
//! reports over UART0 (GPIO 0, 115200 8N1).
//!
//! # Output
//!
//! - A banner with the measured timer overhead
//! - One line of single-shot figures per message length (startup pass)
//! - A full report after each of the first 10 rounds and every 100th round,
//!   a `.` after every other round
//!
//! # Halt
//!
//! Any failing operation prints `ERR <phase>` and stops the run. The status
//! LED (GPIO 25) then blinks until reset.

#![no_std]
#![no_main]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]

use bench_common::config::CALIBRATION_ROUNDS;
use bench_common::{CycleTimer, Driver, DriverConfig, Halt, Iteration, OutputChannel, Report, SendFn, calibrate};
use bench_pico2::config::{CPU_FREQ_HZ, HALT_BLINK_MS, UART_BAUD};
use bench_pico2::cpu_cycles::{self, DwtTimer};
use bench_pico2::workload::{CATEGORY_COUNT, MESSAGE_LENS, PHASE_COUNT};
use bench_pico2::Ed25519Workload;
use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::uart::{self, UartTx};
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

/// Index of the sign phase in [`Ed25519Workload`].
const SIGN_PHASE: usize = 1;

// Program metadata for `picotool info`
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"pico2-ed25519-bench"),
    embassy_rp::binary_info::rp_program_description!(c"Cycle-accurate Ed25519 keygen/sign/verify benchmark"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

#[cfg(all(feature = "cpu48", feature = "cpu250"))]
compile_error!("Only one clock feature can be enabled at a time. Choose one of: cpu48, cpu250");

type Bench<O, T> = Driver<O, T, Ed25519Workload, CATEGORY_COUNT, PHASE_COUNT>;

/// Startup pass, then rounds until the first failure.
fn run<O: OutputChannel, T: CycleTimer>(driver: &mut Bench<O, T>) -> Halt {
    match driver.prime() {
        Ok(_) => info!("Startup pass complete"),
        Err(halt) => return halt,
    }

    loop {
        match driver.run_one_iteration() {
            Ok(Iteration::Report(report)) => log_report(&report),
            Ok(Iteration::Progress(_)) => {}
            Err(halt) => return halt,
        }
    }
}

/// Mirror the sign averages to the debug probe in microseconds.
fn log_report(report: &Report<CATEGORY_COUNT, PHASE_COUNT>) {
    for (c, len) in MESSAGE_LENS.iter().enumerate() {
        if let Some(sign) = report.summary(c, SIGN_PHASE) {
            info!(
                "num = {}, len {}: sign {} us (restarts: {})",
                report.iteration,
                len,
                cpu_cycles::cycles_to_us(sign.clean_average),
                sign.restarts
            );
        }
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Ed25519 benchmark starting...");

    // cpu48 / cpu250: non-stock core clock, 1.10V is enough for both
    #[cfg(any(feature = "cpu48", feature = "cpu250"))]
    let p = {
        use embassy_rp::clocks::{ClockConfig, CoreVoltage};
        use embassy_rp::config::Config;

        let mut config = Config::default();
        config.clocks = ClockConfig::system_freq(CPU_FREQ_HZ).expect("Invalid core clock frequency");
        config.clocks.core_voltage = CoreVoltage::V1_10;
        embassy_rp::init(config)
    };

    #[cfg(not(any(feature = "cpu48", feature = "cpu250")))]
    let p = embassy_rp::init(Default::default());

    info!("Core clock: {} MHz", CPU_FREQ_HZ / 1_000_000);

    let mut timer = DwtTimer::new(CPU_FREQ_HZ);
    let overhead = calibrate(&mut timer, CALIBRATION_ROUNDS);
    info!("DWT cycle counter initialized, read overhead {} cycles", overhead);

    let mut uart_config = uart::Config::default();
    uart_config.baudrate = UART_BAUD;
    let mut tx = UartTx::new_blocking(p.UART0, p.PIN_0, uart_config);
    let out = SendFn(move |byte| {
        // No other sink to report a UART error to
        let _ = tx.blocking_write(&[byte]);
    });

    let mut led = Output::new(p.PIN_25, Level::Low);

    let config = DriverConfig::new().with_overhead(overhead);
    let mut driver = Driver::new(out, timer, Ed25519Workload::new(), config);
    driver.banner();

    let halt = run(&mut driver);
    error!("Benchmark halted after {} rounds: {}", driver.iteration(), halt);

    loop {
        led.toggle();
        Timer::after_millis(HALT_BLINK_MS).await;
    }
}
