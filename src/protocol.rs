//! Line protocol between the panel and the thermostat controller.
//!
//! Each message is one ASCII line ended by `\n`:
//!
//! | request | line    | reply                        |
//! |---------|---------|------------------------------|
//! | current temperature | `T?` | `22`                |
//! | thermostat setpoint | `S?` | `19`                |
//! | set setpoint        | `S=21` | `21` (echo)       |
//!
//! A controller that cannot serve a request replies `ERR`. Lines, terminator
//! included, fit in [`NUM_CHARS`] bytes.

use core::fmt::Write;

use crate::NUM_CHARS;
use crate::error::Error;

/// One protocol line without its terminator.
pub type Line = heapless::String<NUM_CHARS>;

const ERROR_REPLY: &str = "ERR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    CurrentTemperature,
    ThermostatTemperature,
    SetThermostat(i16),
}

impl Request {
    pub fn encode(&self) -> Result<Line, Error> {
        let mut line = Line::new();
        let written = match self {
            Request::CurrentTemperature => line.write_str("T?"),
            Request::ThermostatTemperature => line.write_str("S?"),
            Request::SetThermostat(value) => write!(line, "S={}", value),
        };
        // leave room for the terminator
        if written.is_err() || line.len() >= NUM_CHARS {
            return Err(match self {
                Request::SetThermostat(value) => Error::OutOfRange(*value),
                _ => Error::Malformed,
            });
        }
        Ok(line)
    }

    /// Controller side decoding.
    pub fn parse(line: &str) -> Result<Self, Error> {
        match trim_line(line) {
            "T?" => Ok(Request::CurrentTemperature),
            "S?" => Ok(Request::ThermostatTemperature),
            other => other
                .strip_prefix("S=")
                .ok_or(Error::Malformed)
                .and_then(parse_value)
                .map(Request::SetThermostat),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Value(i16),
    Error,
}

impl Response {
    /// Controller side encoding.
    pub fn encode(&self) -> Line {
        let mut line = Line::new();
        // both shapes fit: at most six characters for an i16
        let _ = match self {
            Response::Value(value) => write!(line, "{}", value),
            Response::Error => line.write_str(ERROR_REPLY),
        };
        line
    }

    pub fn parse(line: &str) -> Result<Self, Error> {
        match trim_line(line) {
            ERROR_REPLY => Ok(Response::Error),
            other => parse_value(other).map(Response::Value),
        }
    }

    /// The carried value, with `ERR` mapped to [`Error::Rejected`].
    pub fn value(self) -> Result<i16, Error> {
        match self {
            Response::Value(value) => Ok(value),
            Response::Error => Err(Error::Rejected),
        }
    }
}

fn trim_line(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n']).trim()
}

fn parse_value(text: &str) -> Result<i16, Error> {
    if text.is_empty() {
        return Err(Error::Malformed);
    }
    text.parse::<i16>().map_err(|_| Error::Malformed)
}
