//! Thermostat display panel.
//!
//! A 16x2 character LCD with a five-button analog keypad, talking to a
//! thermostat controller over a serial line. Everything except
//! [`hardware`] is hardware-independent and runs on the host under test.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod display;
pub mod error;
pub mod keypad;
pub mod lcd;
pub mod link;
pub mod logic;
pub mod model;
pub mod protocol;
pub mod traits;

#[cfg(feature = "hardware")]
pub mod hardware;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::Error;
pub use keypad::{Button, Keypad, Thresholds};
pub use link::Link;
pub use logic::{App, MenuItem, Outcome, Screen};
pub use model::ControllerState;
pub use protocol::{Request, Response};

// --- I/O parameters
pub const TIMEOUT_MS: u32 = 1_000; // Deadline for one complete response line
pub const NUM_CHARS: usize = 8; // Receive buffer size, terminator included
pub const BAUD_RATE: u32 = 9_600;
pub const REQUEST_ATTEMPTS: u8 = 2;

// --- Setpoints (whole degrees Celsius)
pub const MIN_SETPOINT: i16 = 10;
pub const MAX_SETPOINT: i16 = 30;
pub const DEFAULT_DESIRED: i16 = 20;

// --- Panel
pub const LCD_COLUMNS: usize = 16;
pub const LCD_ROWS: usize = 2;
pub const DEBOUNCE_MS: u32 = 50;
pub const POLL_INTERVAL_MS: u64 = 2_000; // Status screen refresh period, one reading per step
