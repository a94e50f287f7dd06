//! Board configuration for the benchmark firmware.
//!
//! # Pins (Raspberry Pi Pico 2)
//!
//! | Function   | GPIO | Notes                        |
//! |------------|------|------------------------------|
//! | UART0 TX   | 0    | Report output, 8N1           |
//! | Status LED | 25   | Blinks once the run halts    |

/// UART baud rate for report output.
pub const UART_BAUD: u32 = 115_200;

/// Core clock selected by the `cpu*` feature flags.
pub const CPU_FREQ_HZ: u32 = if cfg!(feature = "cpu250") {
    250_000_000
} else if cfg!(feature = "cpu48") {
    48_000_000
} else {
    150_000_000
};

/// LED blink half-period after a halt.
pub const HALT_BLINK_MS: u64 = 500;
