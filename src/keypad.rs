//! Five-button resistor-ladder keypad on one analog input.

use log::debug;

use crate::error::Error;
use crate::traits::{Clock, KeypadInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Right,
    Up,
    Down,
    Left,
    Select,
}

impl Button {
    pub fn name(&self) -> &'static str {
        match self {
            Button::Right => "RIGHT",
            Button::Up => "UP",
            Button::Down => "DOWN",
            Button::Left => "LEFT",
            Button::Select => "SELECT",
        }
    }
}

/// Upper bounds (exclusive) of each button band on a 10-bit level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub right: u16,
    pub up: u16,
    pub down: u16,
    pub left: u16,
    pub select: u16,
}

impl Thresholds {
    /// LCD keypad shield V1.1
    pub const V1_1: Thresholds = Thresholds {
        right: 50,
        up: 250,
        down: 450,
        left: 650,
        select: 850,
    };

    /// LCD keypad shield V1.0
    pub const V1_0: Thresholds = Thresholds {
        right: 50,
        up: 195,
        down: 380,
        left: 555,
        select: 790,
    };

    pub fn decode(&self, level: u16) -> Option<Button> {
        if level < self.right {
            Some(Button::Right)
        } else if level < self.up {
            Some(Button::Up)
        } else if level < self.down {
            Some(Button::Down)
        } else if level < self.left {
            Some(Button::Left)
        } else if level < self.select {
            Some(Button::Select)
        } else {
            None
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::V1_1
    }
}

pub struct Keypad<K> {
    input: K,
    thresholds: Thresholds,
    debounce_ms: u32,
    /// Button already reported and not yet released
    held: Option<Button>,
}

impl<K: KeypadInput> Keypad<K> {
    pub fn new(input: K, thresholds: Thresholds, debounce_ms: u32) -> Self {
        Self {
            input,
            thresholds,
            debounce_ms,
            held: None,
        }
    }

    /// Decode a single sample, no debouncing.
    pub fn read_buttons(&mut self) -> Result<Option<Button>, Error> {
        let level = self.input.read_level()?;
        Ok(self.thresholds.decode(level))
    }

    /// Report each physical press once.
    ///
    /// Never waits longer than one debounce period. A held button is
    /// reported again only after a release that lasts the debounce period,
    /// or a change to another button.
    pub fn get_button_press<C: Clock>(&mut self, clock: &mut C) -> Result<Option<Button>, Error> {
        let Some(first) = self.read_buttons()? else {
            if let Some(held) = self.held {
                // Debounce the release
                clock.delay_ms(self.debounce_ms);
                if self.read_buttons()?.is_none() {
                    debug!("[KEYPAD] {} released", held.name());
                    self.held = None;
                }
            }
            return Ok(None);
        };
        if self.held == Some(first) {
            return Ok(None);
        }

        clock.delay_ms(self.debounce_ms);

        let second = self.read_buttons()?;
        if second != Some(first) {
            debug!("[KEYPAD] bounce on {}", first.name());
            return Ok(None);
        }

        self.held = Some(first);
        debug!("[KEYPAD] {} pressed", first.name());
        Ok(Some(first))
    }

    #[cfg(test)]
    pub(crate) fn input_mut(&mut self) -> &mut K {
        &mut self.input
    }
}
