//! HD44780 character LCD in 4-bit mode.
//!
//! Text goes into a pending frame; `update` compares it with what is on the
//! glass and only rewrites the cells that changed.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::debug;

use crate::error::Error;
use crate::traits::TextDisplay;
use crate::{LCD_COLUMNS, LCD_ROWS};

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x06; // increment, no shift
const CMD_DISPLAY_ON: u8 = 0x0C; // cursor and blink off
const CMD_FUNCTION_SET: u8 = 0x28; // 4-bit, 2 lines, 5x8 font
const CMD_SET_DDRAM: u8 = 0x80;

const ROW_OFFSETS: [u8; LCD_ROWS] = [0x00, 0x40];

type Frame = [[u8; LCD_COLUMNS]; LCD_ROWS];

const BLANK: Frame = [[b' '; LCD_COLUMNS]; LCD_ROWS];

pub struct Hd44780<P, D> {
    rs: P,
    en: P,
    /// D4..D7
    data: [P; 4],
    delay: D,
    pending: Frame,
    glass: Frame,
}

impl<P, D> Hd44780<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(rs: P, en: P, data: [P; 4], delay: D) -> Self {
        Self {
            rs,
            en,
            data,
            delay,
            pending: BLANK,
            glass: BLANK,
        }
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<(), Error> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            if nibble & (1 << bit) != 0 {
                pin.set_high().map_err(|_| Error::Display)?;
            } else {
                pin.set_low().map_err(|_| Error::Display)?;
            }
        }

        self.en.set_high().map_err(|_| Error::Display)?;
        self.delay.delay_us(1);
        self.en.set_low().map_err(|_| Error::Display)?;
        // commands need > 37us to settle
        self.delay.delay_us(50);
        Ok(())
    }

    fn send(&mut self, byte: u8, data: bool) -> Result<(), Error> {
        if data {
            self.rs.set_high().map_err(|_| Error::Display)?;
        } else {
            self.rs.set_low().map_err(|_| Error::Display)?;
        }
        self.write_nibble(byte >> 4)?;
        self.write_nibble(byte & 0x0F)
    }

    fn command(&mut self, command: u8) -> Result<(), Error> {
        self.send(command, false)
    }

    fn set_cursor(&mut self, col: usize, row: usize) -> Result<(), Error> {
        self.command(CMD_SET_DDRAM | (ROW_OFFSETS[row] + col as u8))
    }
}

impl<P, D> TextDisplay for Hd44780<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn init(&mut self) -> Result<(), Error> {
        debug!("[LCD] Initializing HD44780");

        self.rs.set_low().map_err(|_| Error::Display)?;
        self.en.set_low().map_err(|_| Error::Display)?;
        // power-on wait
        self.delay.delay_ms(50);

        // Reset into 8-bit mode three times, then switch to 4-bit
        self.write_nibble(0x03)?;
        self.delay.delay_ms(5);
        self.write_nibble(0x03)?;
        self.delay.delay_us(150);
        self.write_nibble(0x03)?;
        self.write_nibble(0x02)?;

        self.command(CMD_FUNCTION_SET)?;
        self.command(CMD_DISPLAY_ON)?;
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        self.command(CMD_ENTRY_MODE)?;

        self.pending = BLANK;
        self.glass = BLANK;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.pending = BLANK;
        Ok(())
    }

    fn draw_text(&mut self, text: &str, col: u8, row: u8) -> Result<(), Error> {
        let Some(line) = self.pending.get_mut(row as usize) else {
            return Ok(());
        };
        let cells = line.iter_mut().skip(col as usize);
        for (cell, ch) in cells.zip(text.chars()) {
            *cell = if ch.is_ascii() && !ch.is_ascii_control() {
                ch as u8
            } else {
                b'?'
            };
        }
        Ok(())
    }

    fn update(&mut self) -> Result<(), Error> {
        for row in 0..LCD_ROWS {
            let mut col = 0;
            while col < LCD_COLUMNS {
                if self.pending[row][col] == self.glass[row][col] {
                    col += 1;
                    continue;
                }
                // rewrite the changed run, the address counter auto-increments
                self.set_cursor(col, row)?;
                while col < LCD_COLUMNS && self.pending[row][col] != self.glass[row][col] {
                    let byte = self.pending[row][col];
                    self.send(byte, true)?;
                    self.glass[row][col] = byte;
                    col += 1;
                }
            }
        }
        Ok(())
    }
}
