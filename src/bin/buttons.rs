//! Keypad calibration: prints the ladder level whenever the decoded
//! button changes, to check or tune the thresholds.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;

use thermostat_display::{Thresholds, hardware::KeypadHardware, traits::KeypadInput};

const SAMPLE_INTERVAL_MS: u64 = 20;

esp_bootloader_esp_idf::esp_app_desc!();

#[embassy_executor::task]
async fn keypad_watcher(mut keypad: KeypadHardware<'static>, thresholds: Thresholds) {
    esp_println::println!("Watching the keypad ladder...");

    let mut last = None;
    loop {
        match keypad.read_level() {
            Ok(level) => {
                let button = thresholds.decode(level);
                if button != last {
                    let name = button.map_or("none", |b| b.name());
                    esp_println::println!("Level {:4} -> {}", level, name);
                    last = button;
                }
            }
            Err(e) => esp_println::println!("[ERROR] {}", e),
        }

        Timer::after(Duration::from_millis(SAMPLE_INTERVAL_MS)).await;
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let keypad = KeypadHardware::new(peripherals.ADC1, peripherals.GPIO1);

    if let Err(e) = spawner.spawn(keypad_watcher(keypad, Thresholds::default())) {
        esp_println::println!("[ERROR] Failed to spawn task: {:?}", e);
    }

    loop {
        Timer::after(Duration::from_millis(1000)).await;
    }
}
