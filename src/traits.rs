//! Hardware abstraction traits

use embedded_hal::delay::DelayNs;

use crate::error::Error;

/// Trait for the analog keypad ladder
pub trait KeypadInput {
    /// Read the ladder level scaled to 10 bits (0..=1023)
    fn read_level(&mut self) -> Result<u16, Error>;
}

/// Trait for character displays
pub trait TextDisplay {
    /// Initialize the display
    fn init(&mut self) -> Result<(), Error>;

    /// Blank the pending frame
    fn clear(&mut self) -> Result<(), Error>;

    /// Draw text starting at a column and row, clipped to the panel
    fn draw_text(&mut self, text: &str, col: u8, row: u8) -> Result<(), Error>;

    /// Show the pending frame
    fn update(&mut self) -> Result<(), Error>;
}

/// Trait for the serial line to the controller
pub trait SerialLink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Next received byte, if one is waiting. Never blocks.
    fn read_byte(&mut self) -> Result<Option<u8>, Error>;
}

/// Monotonic millisecond clock that can also sleep
pub trait Clock: DelayNs {
    fn now_ms(&mut self) -> u64;
}
