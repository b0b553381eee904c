//! Front-panel button task
//!
//! Polls an active-low push button and forwards debounced presses to the
//! player task.

use defmt::*;
use embassy_time::{Duration, Ticker};
use smartvoice_hal::InputPin;

use crate::board::GpioInput;
use crate::channels::{PlayerCommand, PLAYER_CMD};

/// Sample period
const TICK_MS: u64 = 10;

/// Consecutive low samples that count as a press
const DEBOUNCE_TICKS: u8 = 3;

/// Button task
///
/// One instance per button; `command` is what a press means.
#[embassy_executor::task(pool_size = 2)]
pub async fn button_task(button: GpioInput, command: PlayerCommand) {
    info!("Button task started for {:?}", command);

    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    let mut low_ticks: u8 = 0;
    let mut pressed = false;

    loop {
        if button.is_low() {
            low_ticks = low_ticks.saturating_add(1);
            if low_ticks >= DEBOUNCE_TICKS && !pressed {
                pressed = true;
                debug!("Button press: {:?}", command);
                if PLAYER_CMD.try_send(command).is_err() {
                    warn!("Player command queue full, dropping {:?}", command);
                }
            }
        } else {
            low_ticks = 0;
            pressed = false;
        }

        ticker.next().await;
    }
}
