#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;

use thermostat_display::{
    App, Config,
    hardware::{self, KeypadHardware, SystemClock, UartLink},
};

const HEART_BEAT_INTERVAL_MS: u64 = 5_000;
const LOOP_INTERVAL_MS: u64 = 10;

// Wiring (LCD keypad shield on an ESP32-S3)
// Keypad ladder  - GPIO1 (ADC1)
// LCD RS, EN     - GPIO4, GPIO5
// LCD D4..D7     - GPIO6, GPIO7, GPIO15, GPIO16
// Controller     - UART1 TX GPIO17, RX GPIO18

esp_bootloader_esp_idf::esp_app_desc!();

#[embassy_executor::task]
async fn run_heartbeat() {
    loop {
        log::debug!("[HEARTBEAT] System is alive");
        Timer::after(Duration::from_millis(HEART_BEAT_INTERVAL_MS)).await;
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_println::println!("=== Thermostat display ===");

    // Initialize RTOS timer for embassy
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Spawn the background heartbeat task
    if let Err(e) = spawner.spawn(run_heartbeat()) {
        esp_println::println!("[ERROR] Failed to spawn task: {:?}", e);
    }

    let config = Config::default();

    let keypad = KeypadHardware::new(peripherals.ADC1, peripherals.GPIO1);
    let serial = match UartLink::new(
        peripherals.UART1,
        peripherals.GPIO17,
        peripherals.GPIO18,
        config.baud_rate,
    ) {
        Ok(serial) => serial,
        Err(e) => {
            esp_println::println!("[ERROR] UART init failed: {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };
    let lcd = hardware::new_lcd(
        peripherals.GPIO4,
        peripherals.GPIO5,
        peripherals.GPIO6,
        peripherals.GPIO7,
        peripherals.GPIO15,
        peripherals.GPIO16,
    );

    let mut app = App::new(keypad, serial, lcd, SystemClock::new(), config);
    if let Err(e) = app.setup() {
        esp_println::println!("[ERROR] Setup failed: {}", e);
    }

    loop {
        if let Err(e) = app.step() {
            esp_println::println!("[ERROR] {}", e);
        }

        Timer::after(Duration::from_millis(LOOP_INTERVAL_MS)).await;
    }
}
