//! tivapin demo firmware
//!
//! Blinks the board LED by toggling it every half period and counts button
//! presses delivered through the GPIO interrupt dispatch. Pins and timing
//! come from board.toml.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use portable_atomic::{AtomicU32, Ordering};
use tivapin_core::{install, PinConfig, PinController};
use tivapin_hal_tm4c123::{sysctl, Tm4c123Gpio};
use {defmt_rtt as _, panic_probe as _};

mod board {
    use tivapin_core::{DriveStrength, InterruptCondition, PinId, PinMode};

    include!(concat!(env!("OUT_DIR"), "/board_config.rs"));
}

/// Button presses seen by the interrupt callback (not debounced)
static PRESSES: AtomicU32 = AtomicU32::new(0);

fn on_press() {
    PRESSES.fetch_add(1, Ordering::Relaxed);
}

#[entry]
fn main() -> ! {
    info!("tivapin firmware starting...");

    sysctl::clock_init();

    let gpio = Tm4c123Gpio::new();
    install(&gpio);

    let mut led = PinController::with_config(gpio, board::LED, PinConfig::output(board::LED_DRIVE));
    // Off
    led.write(u8::from(board::LED_ACTIVE_LOW));

    let mut button =
        PinController::with_config(gpio, board::BUTTON, PinConfig::input(board::BUTTON_MODE));
    button.attach_callback(board::BUTTON_PRESS, on_press);

    info!(
        "LED on {}, button on {}, blinking every {=u32} ms",
        Display2Format(&board::LED),
        Display2Format(&board::BUTTON),
        board::BLINK_PERIOD_MS
    );

    let mut reported = 0;
    loop {
        sysctl::delay_ms(board::BLINK_PERIOD_MS / 2);
        led.toggle();

        let presses = PRESSES.load(Ordering::Relaxed);
        if presses != reported {
            info!("button pressed {=u32} times", presses);
            reported = presses;
        }
    }
}
