//! Menu logic layer (hardware-independent)

use log::{info, warn};

use crate::config::Config;
use crate::display::{draw_screen, setup_display};
use crate::error::Error;
use crate::keypad::{Button, Keypad};
use crate::link::Link;
use crate::model::ControllerState;
use crate::protocol::Request;
use crate::traits::{Clock, KeypadInput, SerialLink, TextDisplay};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Status,
    SetDesired,
    SetThermostat,
}

impl MenuItem {
    pub const ALL: [MenuItem; 3] = [MenuItem::Status, MenuItem::SetDesired, MenuItem::SetThermostat];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Status => "Status",
            MenuItem::SetDesired => "Set desired",
            MenuItem::SetThermostat => "Set thermostat",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> MenuItem {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> MenuItem {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Result of pushing a setpoint to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Saved(i16),
    Failed(Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu { cursor: MenuItem },
    Status,
    /// Desired temperature when the screen was opened
    SetDesired { previous: i16 },
    SetThermostat { outcome: Option<Outcome> },
}

impl Screen {
    /// Menu entry that leads to this screen
    fn item(&self) -> MenuItem {
        match self {
            Screen::MainMenu { cursor } => *cursor,
            Screen::Status => MenuItem::Status,
            Screen::SetDesired { .. } => MenuItem::SetDesired,
            Screen::SetThermostat { .. } => MenuItem::SetThermostat,
        }
    }
}

/// The panel application: owns the peripherals and the controller state
pub struct App<K, S, D, C> {
    keypad: Keypad<K>,
    link: Link<S>,
    display: D,
    clock: C,
    config: Config,
    state: ControllerState,
    screen: Screen,
    last_poll_ms: Option<u64>,
    /// Next reading the status poll asks for
    next_poll: Request,
    dirty: bool,
}

impl<K, S, D, C> App<K, S, D, C>
where
    K: KeypadInput,
    S: SerialLink,
    D: TextDisplay,
    C: Clock,
{
    pub fn new(keypad: K, serial: S, display: D, clock: C, config: Config) -> Self {
        Self {
            keypad: Keypad::new(keypad, config.thresholds, config.debounce_ms),
            link: Link::new(serial, &config),
            display,
            clock,
            config,
            state: ControllerState::new(&config),
            screen: Screen::MainMenu {
                cursor: MenuItem::Status,
            },
            last_poll_ms: None,
            next_poll: Request::CurrentTemperature,
            dirty: true,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Splash, first contact with the controller, main menu.
    pub fn setup(&mut self) -> Result<(), Error> {
        setup_display(&mut self.display)?;

        self.refresh();
        match self.state.thermostat_temperature {
            Some(setpoint) => self.state.set_desired(setpoint, &self.config),
            None => warn!("[MENU] Controller setpoint unknown, using default"),
        }
        info!(
            "[MENU] Desired temperature {}",
            self.state.desired_temperature()
        );

        self.show(Screen::MainMenu {
            cursor: MenuItem::Status,
        });
        self.redraw()
    }

    /// One pass of the main loop.
    pub fn step(&mut self) -> Result<(), Error> {
        let press = self.keypad.get_button_press(&mut self.clock)?;

        match (self.screen, press) {
            (Screen::Status, press) => self.handle_display(press),
            (_, None) => {}
            (Screen::MainMenu { .. }, Some(button)) => self.handle_main_menu(button),
            (Screen::SetDesired { .. }, Some(button)) => {
                self.handle_set_desired_temperature(button)
            }
            (Screen::SetThermostat { .. }, Some(button)) => self.handle_set_thermostat(button),
        }

        self.redraw()
    }

    pub fn handle_main_menu(&mut self, button: Button) {
        let Screen::MainMenu { cursor } = self.screen else {
            return;
        };
        match button {
            Button::Up => self.show(Screen::MainMenu {
                cursor: cursor.previous(),
            }),
            Button::Down => self.show(Screen::MainMenu {
                cursor: cursor.next(),
            }),
            Button::Select | Button::Right => self.open(cursor),
            Button::Left => {}
        }
    }

    pub fn handle_set_desired_temperature(&mut self, button: Button) {
        let Screen::SetDesired { previous } = self.screen else {
            return;
        };
        match button {
            Button::Up => {
                self.state.adjust_desired(1, &self.config);
                self.dirty = true;
            }
            Button::Down => {
                self.state.adjust_desired(-1, &self.config);
                self.dirty = true;
            }
            Button::Select => {
                info!(
                    "[MENU] Desired temperature {}",
                    self.state.desired_temperature()
                );
                self.back_to_menu();
            }
            Button::Left => {
                self.state.set_desired(previous, &self.config);
                self.back_to_menu();
            }
            Button::Right => {}
        }
    }

    pub fn handle_set_thermostat(&mut self, button: Button) {
        let Screen::SetThermostat { outcome } = self.screen else {
            return;
        };
        match (outcome, button) {
            (None, Button::Select) => {
                let desired = self.state.desired_temperature();
                let outcome = match self
                    .link
                    .transact(Request::SetThermostat(desired), &mut self.clock)
                {
                    Ok(setpoint) => {
                        info!("[MENU] Thermostat set to {}", setpoint);
                        self.state.thermostat_temperature = Some(setpoint);
                        Outcome::Saved(setpoint)
                    }
                    Err(e) => {
                        warn!("[MENU] Failed to set thermostat: {}", e);
                        Outcome::Failed(e)
                    }
                };
                self.show(Screen::SetThermostat {
                    outcome: Some(outcome),
                });
            }
            (None, Button::Left) => self.back_to_menu(),
            (None, _) => {}
            (Some(_), _) => self.back_to_menu(),
        }
    }

    /// Status screen: refresh on a timer, LEFT or SELECT leaves.
    pub fn handle_display(&mut self, button: Option<Button>) {
        if self.screen != Screen::Status {
            return;
        }
        match button {
            Some(Button::Left | Button::Select) => self.back_to_menu(),
            _ => {
                if self.poll_due() {
                    self.poll();
                }
            }
        }
    }

    fn open(&mut self, item: MenuItem) {
        match item {
            MenuItem::Status => {
                self.show(Screen::Status);
                self.refresh();
            }
            MenuItem::SetDesired => self.show(Screen::SetDesired {
                previous: self.state.desired_temperature(),
            }),
            MenuItem::SetThermostat => self.show(Screen::SetThermostat { outcome: None }),
        }
    }

    fn back_to_menu(&mut self) {
        let cursor = self.screen.item();
        self.show(Screen::MainMenu { cursor });
    }

    fn show(&mut self, screen: Screen) {
        self.screen = screen;
        self.dirty = true;
    }

    fn poll_due(&mut self) -> bool {
        if self.next_poll != Request::CurrentTemperature {
            return true;
        }
        let now = self.clock.now_ms();
        self.last_poll_ms
            .is_none_or(|last| now.saturating_sub(last) >= self.config.poll_interval_ms)
    }

    /// Ask the controller for temperature and setpoint. Failures keep the
    /// previous values.
    fn refresh(&mut self) {
        self.next_poll = Request::CurrentTemperature;
        self.poll();
        self.poll();
    }

    /// One reading per call, so a silent controller holds the keypad for at
    /// most `request_attempts * timeout_ms` per step.
    fn poll(&mut self) {
        let request = self.next_poll;
        let result = self.link.transact(request, &mut self.clock);
        match (request, result) {
            (Request::CurrentTemperature, Ok(value)) => {
                self.state.current_temperature = Some(value)
            }
            (_, Ok(value)) => self.state.thermostat_temperature = Some(value),
            (Request::CurrentTemperature, Err(e)) => {
                warn!("[MENU] Temperature refresh failed: {}", e)
            }
            (_, Err(e)) => warn!("[MENU] Setpoint refresh failed: {}", e),
        }

        self.next_poll = match request {
            Request::CurrentTemperature => Request::ThermostatTemperature,
            _ => {
                self.last_poll_ms = Some(self.clock.now_ms());
                Request::CurrentTemperature
            }
        };
        self.dirty = true;
    }

    fn redraw(&mut self) -> Result<(), Error> {
        if self.dirty {
            draw_screen(&mut self.display, &self.screen, &self.state)?;
            self.dirty = false;
        }
        Ok(())
    }

    #[cfg(test)]
    fn keypad_input(&mut self) -> &mut K {
        self.keypad.input_mut()
    }

    #[cfg(test)]
    fn serial(&mut self) -> &mut S {
        self.link.serial_mut()
    }

    #[cfg(test)]
    fn clock(&mut self) -> &mut C {
        &mut self.clock
    }
}
