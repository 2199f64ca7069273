use embedded_hal::delay::DelayNs;
use esp_hal::gpio::AnyPin;
use esp_hal::{
    Blocking,
    analog::adc::{Adc, AdcConfig, AdcPin, Attenuation},
    delay::Delay,
    gpio::{Level, Output, OutputConfig},
    peripherals::{ADC1, GPIO1, UART1},
    time::Instant,
    uart::{Config as UartConfig, Uart},
};

use crate::error::Error;
use crate::lcd::Hd44780;
use crate::traits::{Clock, KeypadInput, SerialLink};

// A conversion finishes within a few microseconds
const ADC_READ_ATTEMPTS: u32 = 10_000;
const ADC_MAX: u16 = 4095;

/// Keypad ladder on GPIO1 (ADC1 channel 0)
pub struct KeypadHardware<'a> {
    adc: Adc<'a, ADC1<'a>, Blocking>,
    pin: AdcPin<GPIO1<'a>, ADC1<'a>>,
}

impl<'a> KeypadHardware<'a> {
    pub fn new(adc_periph: ADC1<'a>, gpio: GPIO1<'a>) -> Self {
        let mut config = AdcConfig::new();
        // full 0..3.3V swing of the ladder
        let pin = config.enable_pin(gpio, Attenuation::_11dB);
        let adc = Adc::new(adc_periph, config);

        Self { adc, pin }
    }
}

impl KeypadInput for KeypadHardware<'_> {
    fn read_level(&mut self) -> Result<u16, Error> {
        for _ in 0..ADC_READ_ATTEMPTS {
            if let Ok(raw) = self.adc.read_oneshot(&mut self.pin) {
                // 12-bit sample onto the 10-bit ladder scale
                return Ok(raw.min(ADC_MAX) >> 2);
            }
        }
        Err(Error::Keypad)
    }
}

/// Serial line to the controller on UART1
pub struct UartLink<'a> {
    uart: Uart<'a, Blocking>,
}

impl<'a> UartLink<'a> {
    pub fn new<TX, RX>(uart_periph: UART1<'a>, tx: TX, rx: RX, baud_rate: u32) -> Result<Self, Error>
    where
        TX: Into<AnyPin<'a>>,
        RX: Into<AnyPin<'a>>,
    {
        let uart = Uart::new(uart_periph, UartConfig::default().with_baudrate(baud_rate))
            .map_err(|_| Error::Link)?
            .with_tx(tx.into())
            .with_rx(rx.into());

        Ok(Self { uart })
    }
}

impl SerialLink for UartLink<'_> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let mut rest = bytes;
        while !rest.is_empty() {
            let written = self.uart.write(rest).map_err(|_| Error::Link)?;
            rest = &rest[written..];
        }
        self.uart.flush().map_err(|_| Error::Link)
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Error> {
        if !self.uart.read_ready() {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        let read = self.uart.read(&mut byte).map_err(|_| Error::Link)?;
        Ok((read == 1).then_some(byte[0]))
    }
}

pub type LcdHardware<'a> = Hd44780<Output<'a>, Delay>;

/// HD44780 wired in 4-bit mode: RS, EN, then D4..D7
pub fn new_lcd<'a, RS, EN, D4, D5, D6, D7>(
    rs: RS,
    en: EN,
    d4: D4,
    d5: D5,
    d6: D6,
    d7: D7,
) -> LcdHardware<'a>
where
    RS: Into<AnyPin<'a>>,
    EN: Into<AnyPin<'a>>,
    D4: Into<AnyPin<'a>>,
    D5: Into<AnyPin<'a>>,
    D6: Into<AnyPin<'a>>,
    D7: Into<AnyPin<'a>>,
{
    let output = |pin: AnyPin<'a>| Output::new(pin, Level::Low, OutputConfig::default());

    Hd44780::new(
        output(rs.into()),
        output(en.into()),
        [
            output(d4.into()),
            output(d5.into()),
            output(d6.into()),
            output(d7.into()),
        ],
        Delay::new(),
    )
}

/// Milliseconds since boot plus a busy-wait delay
pub struct SystemClock {
    delay: Delay,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            delay: Delay::new(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayNs for SystemClock {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }
}

impl Clock for SystemClock {
    fn now_ms(&mut self) -> u64 {
        Instant::now().duration_since_epoch().as_millis()
    }
}
