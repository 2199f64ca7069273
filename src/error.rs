use core::fmt;

/// Everything that can go wrong between the keypad, the LCD and the
/// controller link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No complete response line before the deadline
    Timeout,
    /// Response longer than the receive buffer
    Overflow,
    /// Response or request that does not follow the wire format
    Malformed,
    /// Controller answered `ERR`
    Rejected,
    /// Setpoint outside the supported range
    OutOfRange(i16),
    /// Serial transport failure
    Link,
    /// Keypad ADC read failure
    Keypad,
    /// LCD write failure
    Display,
}

impl Error {
    /// Short message that fits one LCD row.
    pub fn label(&self) -> &'static str {
        match self {
            Error::Timeout => "No response",
            Error::Overflow => "Reply too long",
            Error::Malformed => "Bad reply",
            Error::Rejected => "Rejected",
            Error::OutOfRange(_) => "Out of range",
            Error::Link => "Link error",
            Error::Keypad => "Keypad error",
            Error::Display => "Display error",
        }
    }

    /// Whether repeating the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Timeout | Error::Overflow | Error::Malformed)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Timeout => write!(f, "timed out waiting for the controller"),
            Error::Overflow => write!(f, "response exceeded the receive buffer"),
            Error::Malformed => write!(f, "malformed message"),
            Error::Rejected => write!(f, "controller rejected the request"),
            Error::OutOfRange(value) => write!(f, "setpoint {} is out of range", value),
            Error::Link => write!(f, "serial link failure"),
            Error::Keypad => write!(f, "keypad read failure"),
            Error::Display => write!(f, "display write failure"),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LCD_COLUMNS;

    #[test]
    fn labels_fit_one_lcd_row() {
        let all = [
            Error::Timeout,
            Error::Overflow,
            Error::Malformed,
            Error::Rejected,
            Error::OutOfRange(99),
            Error::Link,
            Error::Keypad,
            Error::Display,
        ];
        for error in all {
            assert!(error.label().len() <= LCD_COLUMNS, "{:?}", error);
        }
    }

    #[test]
    fn only_garbled_or_missing_replies_are_transient() {
        assert!(Error::Timeout.is_transient());
        assert!(Error::Malformed.is_transient());
        assert!(!Error::Rejected.is_transient());
        assert!(!Error::OutOfRange(40).is_transient());
    }
}
