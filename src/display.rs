use core::fmt::{self, Write};

use log::info;

use crate::LCD_COLUMNS;
use crate::error::Error;
use crate::logic::{Outcome, Screen};
use crate::model::ControllerState;
use crate::traits::TextDisplay;

/// One LCD row of text.
pub type Row = heapless::String<LCD_COLUMNS>;

const SPLASH_TITLE: &str = "Thermostat";
const SPLASH_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

/// Temperature for display, `--` while unknown
struct Temp(Option<i16>);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{}", value),
            None => f.write_str("--"),
        }
    }
}

fn row(args: fmt::Arguments<'_>) -> Row {
    let mut row = Row::new();
    // anything past the last column is dropped
    let _ = row.write_fmt(args);
    row
}

/// Initialize the LCD and put up the splash screen
pub fn setup_display<D: TextDisplay>(display: &mut D) -> Result<(), Error> {
    info!("[LCD] Setting up display");

    display.init()?;
    display.clear()?;
    display.draw_text(SPLASH_TITLE, 3, 0)?;
    display.draw_text(SPLASH_VERSION, 5, 1)?;
    display.update()
}

/// Text of both rows for a screen.
pub fn screen_lines(screen: &Screen, state: &ControllerState) -> [Row; 2] {
    let desired = state.desired_temperature();
    match screen {
        Screen::MainMenu { cursor } => [
            row(format_args!(">{}", cursor.label())),
            row(format_args!(" {}", cursor.next().label())),
        ],
        Screen::Status => [
            row(format_args!("Temp: {}C", Temp(state.current_temperature))),
            row(format_args!(
                "Set:{} Want:{}",
                Temp(state.thermostat_temperature),
                desired
            )),
        ],
        Screen::SetDesired { .. } => [
            row(format_args!("Desired temp")),
            row(format_args!("< {}C >", desired)),
        ],
        Screen::SetThermostat { outcome: None } => [
            row(format_args!("Send {}C?", desired)),
            row(format_args!("Now: {}C", Temp(state.thermostat_temperature))),
        ],
        Screen::SetThermostat {
            outcome: Some(Outcome::Saved(value)),
        } => [
            row(format_args!("Thermostat set")),
            row(format_args!("Setpoint: {}C", value)),
        ],
        Screen::SetThermostat {
            outcome: Some(Outcome::Failed(error)),
        } => [row(format_args!("Send failed")), row(format_args!("{}", error.label()))],
    }
}

/// Redraw the whole panel for a screen.
pub fn draw_screen<D: TextDisplay>(
    display: &mut D,
    screen: &Screen,
    state: &ControllerState,
) -> Result<(), Error> {
    let [top, bottom] = screen_lines(screen, state);
    display.clear()?;
    display.draw_text(&top, 0, 0)?;
    display.draw_text(&bottom, 0, 1)?;
    display.update()
}
