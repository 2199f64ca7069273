//! Runtime configuration, defaulting to the crate constants.

use crate::keypad::Thresholds;
use crate::{
    BAUD_RATE, DEBOUNCE_MS, DEFAULT_DESIRED, MAX_SETPOINT, MIN_SETPOINT, POLL_INTERVAL_MS,
    REQUEST_ATTEMPTS, TIMEOUT_MS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Deadline for one response line
    pub timeout_ms: u32,
    /// Tries per request, first one included
    pub request_attempts: u8,
    pub baud_rate: u32,
    pub debounce_ms: u32,
    /// Status screen refresh period
    pub poll_interval_ms: u64,
    pub min_setpoint: i16,
    pub max_setpoint: i16,
    /// Desired temperature when the controller setpoint is unknown
    pub default_desired: i16,
    pub thresholds: Thresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ms: TIMEOUT_MS,
            request_attempts: REQUEST_ATTEMPTS,
            baud_rate: BAUD_RATE,
            debounce_ms: DEBOUNCE_MS,
            poll_interval_ms: POLL_INTERVAL_MS,
            min_setpoint: MIN_SETPOINT,
            max_setpoint: MAX_SETPOINT,
            default_desired: DEFAULT_DESIRED,
            thresholds: Thresholds::default(),
        }
    }
}

impl Config {
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_request_attempts(mut self, attempts: u8) -> Self {
        self.request_attempts = attempts.max(1);
        self
    }

    /// Clamp a temperature into the supported setpoint range.
    pub fn clamp_setpoint(&self, value: i16) -> i16 {
        value.clamp(self.min_setpoint, self.max_setpoint)
    }

    pub fn setpoint_in_range(&self, value: i16) -> bool {
        (self.min_setpoint..=self.max_setpoint).contains(&value)
    }
}
