// Model of the data shared between the menu and the controller link

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    /// Controller setpoint as last reported
    pub thermostat_temperature: Option<i16>,
    /// Measured temperature as last reported
    pub current_temperature: Option<i16>,
    /// Target chosen on the panel, always inside the setpoint range
    desired_temperature: i16,
}

impl ControllerState {
    pub fn new(config: &Config) -> Self {
        Self {
            thermostat_temperature: None,
            current_temperature: None,
            desired_temperature: config.clamp_setpoint(config.default_desired),
        }
    }

    pub fn desired_temperature(&self) -> i16 {
        self.desired_temperature
    }

    pub fn set_desired(&mut self, value: i16, config: &Config) {
        self.desired_temperature = config.clamp_setpoint(value);
    }

    /// Move the desired temperature by `delta`, saturating at the range ends.
    pub fn adjust_desired(&mut self, delta: i16, config: &Config) {
        let value = self.desired_temperature.saturating_add(delta);
        self.set_desired(value, config);
    }

    /// True when the controller is known to run at the desired temperature.
    pub fn in_sync(&self) -> bool {
        self.thermostat_temperature == Some(self.desired_temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unknown_with_default_desired() {
        let state = ControllerState::new(&Config::default());
        assert_eq!(state.current_temperature, None);
        assert_eq!(state.thermostat_temperature, None);
        assert_eq!(state.desired_temperature(), crate::DEFAULT_DESIRED);
        assert!(!state.in_sync());
    }

    #[test]
    fn adjust_desired_stays_in_range() {
        let config = Config::default();
        let mut state = ControllerState::new(&config);
        state.set_desired(config.max_setpoint, &config);
        state.adjust_desired(1, &config);
        assert_eq!(state.desired_temperature(), config.max_setpoint);

        state.adjust_desired(i16::MIN, &config);
        assert_eq!(state.desired_temperature(), config.min_setpoint);
    }

    #[test]
    fn in_sync_when_setpoint_matches() {
        let config = Config::default();
        let mut state = ControllerState::new(&config);
        state.thermostat_temperature = Some(22);
        state.set_desired(22, &config);
        assert!(state.in_sync());
    }
}
