//! Host-side fakes shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::error::Error;
use crate::protocol::{Request, Response};
use crate::traits::{Clock, KeypadInput, SerialLink, TextDisplay};
use crate::{LCD_COLUMNS, LCD_ROWS};

/// Clock that only moves when something sleeps on it.
#[derive(Debug, Default)]
pub struct FakeClock {
    now_ns: u64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.now_ns += ms * 1_000_000;
    }
}

impl DelayNs for FakeClock {
    fn delay_ns(&mut self, ns: u32) {
        self.now_ns += u64::from(ns);
    }
}

impl Clock for FakeClock {
    fn now_ms(&mut self) -> u64 {
        self.now_ns / 1_000_000
    }
}

pub const IDLE_LEVEL: u16 = 1023;

/// Keypad replaying scripted ladder levels, idle once they run out.
#[derive(Debug, Default)]
pub struct FakeKeypad {
    levels: VecDeque<u16>,
    failing: bool,
}

impl FakeKeypad {
    pub fn new(levels: &[u16]) -> Self {
        Self {
            levels: levels.iter().copied().collect(),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            levels: VecDeque::new(),
            failing: true,
        }
    }

    pub fn push(&mut self, levels: &[u16]) {
        self.levels.extend(levels.iter().copied());
    }
}

impl KeypadInput for FakeKeypad {
    fn read_level(&mut self) -> Result<u16, Error> {
        if self.failing {
            return Err(Error::Keypad);
        }
        Ok(self.levels.pop_front().unwrap_or(IDLE_LEVEL))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Serve the request
    Normal,
    /// Never answer
    Silent,
    /// Answer `ERR`
    Error,
    /// Answer these bytes verbatim
    Raw(&'static [u8]),
}

/// Controller on the other end of the serial line.
#[derive(Debug)]
pub struct FakeController {
    current: i16,
    setpoint: i16,
    reply: Reply,
    /// One-shot replies served before `reply`
    queued: VecDeque<Reply>,
    drop_next: usize,
    line: Vec<u8>,
    received: Vec<String>,
    tx: VecDeque<u8>,
}

impl FakeController {
    pub fn new(current: i16, setpoint: i16) -> Self {
        Self {
            current,
            setpoint,
            reply: Reply::Normal,
            queued: VecDeque::new(),
            drop_next: 0,
            line: Vec::new(),
            received: Vec::new(),
            tx: VecDeque::new(),
        }
    }

    pub fn set_reply(&mut self, reply: Reply) {
        self.reply = reply;
    }

    /// Answer the next request with `reply`, then go back to the default.
    pub fn queue_reply(&mut self, reply: Reply) {
        self.queued.push_back(reply);
    }

    pub fn set_current(&mut self, current: i16) {
        self.current = current;
    }

    /// Swallow the next `count` requests.
    pub fn drop_next(&mut self, count: usize) {
        self.drop_next = count;
    }

    /// Queue unsolicited bytes.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.tx.extend(bytes.iter().copied());
    }

    pub fn setpoint(&self) -> i16 {
        self.setpoint
    }

    /// Request lines seen so far, without terminators.
    pub fn received(&self) -> &[String] {
        &self.received
    }

    fn handle_line(&mut self) {
        let line = String::from_utf8_lossy(&self.line).into_owned();
        self.line.clear();
        self.received.push(line.clone());

        if self.drop_next > 0 {
            self.drop_next -= 1;
            return;
        }

        let reply = self.queued.pop_front().unwrap_or(self.reply);
        let response = match reply {
            Reply::Silent => return,
            Reply::Raw(bytes) => {
                self.tx.extend(bytes.iter().copied());
                return;
            }
            Reply::Error => Response::Error,
            Reply::Normal => match Request::parse(&line) {
                Ok(Request::CurrentTemperature) => Response::Value(self.current),
                Ok(Request::ThermostatTemperature) => Response::Value(self.setpoint),
                Ok(Request::SetThermostat(value)) => {
                    self.setpoint = value;
                    Response::Value(value)
                }
                Err(_) => Response::Error,
            },
        };
        self.tx.extend(response.encode().as_bytes().iter().copied());
        self.tx.extend(b"\r\n".iter().copied());
    }
}

impl SerialLink for FakeController {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        for &byte in bytes {
            if byte == b'\n' {
                self.handle_line();
            } else {
                self.line.push(byte);
            }
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Error> {
        Ok(self.tx.pop_front())
    }
}

/// Serial line that hands over at most one byte every other poll, like a
/// UART still receiving at 9600 baud.
#[derive(Debug)]
pub struct SlowWire<S> {
    inner: S,
    ready: bool,
}

impl<S> SlowWire<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            ready: false,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: SerialLink> SerialLink for SlowWire<S> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.inner.write(bytes)
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Error> {
        if !self.ready {
            self.ready = true;
            return Ok(None);
        }
        self.ready = false;
        self.inner.read_byte()
    }
}

/// Display that keeps its pending frame and the frame last shown.
#[derive(Debug)]
pub struct FakeDisplay {
    pending: [[u8; LCD_COLUMNS]; LCD_ROWS],
    shown: [[u8; LCD_COLUMNS]; LCD_ROWS],
    pub initialized: bool,
}

impl FakeDisplay {
    pub fn new() -> Self {
        Self {
            pending: [[b' '; LCD_COLUMNS]; LCD_ROWS],
            shown: [[b' '; LCD_COLUMNS]; LCD_ROWS],
            initialized: false,
        }
    }

    /// Shown rows with trailing blanks trimmed.
    pub fn lines(&self) -> [String; LCD_ROWS] {
        self.shown
            .map(|row| String::from_utf8_lossy(&row).trim_end().to_string())
    }
}

impl TextDisplay for FakeDisplay {
    fn init(&mut self) -> Result<(), Error> {
        self.initialized = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.pending = [[b' '; LCD_COLUMNS]; LCD_ROWS];
        Ok(())
    }

    fn draw_text(&mut self, text: &str, col: u8, row: u8) -> Result<(), Error> {
        if let Some(line) = self.pending.get_mut(row as usize) {
            for (cell, byte) in line.iter_mut().skip(col as usize).zip(text.bytes()) {
                *cell = byte;
            }
        }
        Ok(())
    }

    fn update(&mut self) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::Display);
        }
        self.shown = self.pending;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct BusState {
    levels: [bool; 6],
    strobes: Vec<(bool, u8)>,
}

/// Six GPIO lines of an HD44780 (RS, EN, D4..D7) that record every
/// nibble latched on the falling edge of EN.
#[derive(Debug, Clone, Default)]
pub struct PinBus {
    state: Rc<RefCell<BusState>>,
}

impl PinBus {
    pub const RS: usize = 0;
    pub const EN: usize = 1;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin(&self, id: usize) -> BusPin {
        BusPin {
            id,
            state: Rc::clone(&self.state),
        }
    }

    pub fn reset(&self) {
        self.state.borrow_mut().strobes.clear();
    }

    /// Latched (rs, nibble) pairs.
    pub fn strobes(&self) -> Vec<(bool, u8)> {
        self.state.borrow().strobes.clone()
    }

    /// Full bytes rebuilt from nibble pairs, after skipping `skip` nibbles.
    pub fn bytes_after(&self, skip: usize) -> Vec<(bool, u8)> {
        self.strobes()[skip..]
            .chunks(2)
            .map(|pair| (pair[0].0, (pair[0].1 << 4) | pair[1].1))
            .collect()
    }
}

#[derive(Debug)]
pub struct BusPin {
    id: usize,
    state: Rc<RefCell<BusState>>,
}

impl BusPin {
    fn set(&mut self, high: bool) {
        let mut state = self.state.borrow_mut();
        let falling = self.id == PinBus::EN && state.levels[PinBus::EN] && !high;
        state.levels[self.id] = high;
        if falling {
            let nibble = (0..4).fold(0u8, |acc, bit| acc | (u8::from(state.levels[2 + bit]) << bit));
            let rs = state.levels[PinBus::RS];
            state.strobes.push((rs, nibble));
        }
    }
}

impl ErrorType for BusPin {
    type Error = Infallible;
}

impl OutputPin for BusPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}
