//! Request/response session with the thermostat controller.

use log::{debug, warn};

use crate::NUM_CHARS;
use crate::config::Config;
use crate::error::Error;
use crate::protocol::{Line, Request, Response};
use crate::traits::{Clock, SerialLink};

/// Stale bytes dropped before a request at most, so a chattering line
/// cannot stall the panel.
const DISCARD_LIMIT: usize = 64;

pub struct Link<S> {
    serial: S,
    config: Config,
    /// Last request line sent
    query: Line,
    /// Bytes of the response being received
    rx: [u8; NUM_CHARS],
}

impl<S: SerialLink> Link<S> {
    pub fn new(serial: S, config: &Config) -> Self {
        Self {
            serial,
            config: *config,
            query: Line::new(),
            rx: [0; NUM_CHARS],
        }
    }

    pub fn query(&self) -> &str {
        self.query.as_str()
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    pub fn send_request(&mut self, request: &Request) -> Result<(), Error> {
        if let Request::SetThermostat(value) = request {
            if !self.config.setpoint_in_range(*value) {
                return Err(Error::OutOfRange(*value));
            }
        }
        let line = request.encode()?;

        let stale = self.discard_input()?;
        if stale > 0 {
            debug!("[LINK] dropped {} stale bytes", stale);
        }

        self.serial.write(line.as_bytes())?;
        self.serial.write(b"\n")?;
        debug!("[LINK] -> {}", line);
        self.query = line;
        Ok(())
    }

    /// Collect one response line, waiting at most `timeout_ms`.
    ///
    /// A `\r` is accepted only right before the terminator. A line that
    /// overflows or carries a bad byte is still read up to its `\n`, so the
    /// rest of it cannot be taken for the next reply.
    pub fn get_response<C: Clock>(&mut self, clock: &mut C) -> Result<Line, Error> {
        let deadline = clock.now_ms() + u64::from(self.config.timeout_ms);
        let mut len = 0;
        let mut carriage_return = false;
        let mut failure = None;

        loop {
            if clock.now_ms() >= deadline {
                return Err(failure.unwrap_or(Error::Timeout));
            }
            let byte = match self.serial.read_byte()? {
                Some(byte) => byte,
                None => {
                    clock.delay_ms(1);
                    continue;
                }
            };
            if byte == b'\n' {
                break;
            }
            if failure.is_some() {
                continue;
            }
            if carriage_return || !byte.is_ascii() {
                failure = Some(Error::Malformed);
            } else if byte == b'\r' {
                carriage_return = true;
            } else if len == NUM_CHARS - 1 {
                failure = Some(Error::Overflow);
            } else {
                self.rx[len] = byte;
                len += 1;
            }
        }

        if let Some(e) = failure {
            debug!("[LINK] dropped bad line: {}", e);
            return Err(e);
        }

        let text = core::str::from_utf8(&self.rx[..len]).map_err(|_| Error::Malformed)?;
        let mut line = Line::new();
        line.push_str(text).map_err(|_| Error::Overflow)?;
        debug!("[LINK] <- {}", line);
        Ok(line)
    }

    /// Send a request and return the value the controller answers with,
    /// retrying garbled or missing replies.
    pub fn transact<C: Clock>(&mut self, request: Request, clock: &mut C) -> Result<i16, Error> {
        let mut attempt = 1;
        loop {
            match self.exchange(&request, clock) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.config.request_attempts => {
                    warn!("[LINK] {:?} attempt {} failed: {}", request, attempt, e);
                    attempt += 1;
                }
                Err(e) => {
                    warn!("[LINK] {:?} failed: {}", request, e);
                    return Err(e);
                }
            }
        }
    }

    fn exchange<C: Clock>(&mut self, request: &Request, clock: &mut C) -> Result<i16, Error> {
        self.send_request(request)?;
        let line = self.get_response(clock)?;
        let value = Response::parse(&line)?.value()?;

        if let Request::SetThermostat(wanted) = request {
            if value != *wanted {
                return Err(Error::Malformed);
            }
        }
        Ok(value)
    }

    fn discard_input(&mut self) -> Result<usize, Error> {
        let mut dropped = 0;
        while dropped < DISCARD_LIMIT && self.serial.read_byte()?.is_some() {
            dropped += 1;
        }
        Ok(dropped)
    }
}
