//! SmartVoice - playlist firmware for a DFPlayer module
//!
//! RP2040 firmware that drives a DFPlayer Mini over UART1, walks a
//! playlist from `player.toml`, and takes pause/next commands from two
//! front-panel buttons.
//!
//! Board wiring:
//! - GPIO4 (UART1 TX) → module RX through 1k
//! - GPIO5 (UART1 RX) ← module TX
//! - GPIO6 ← module BUSY (active low)
//! - GPIO15 pause button, GPIO14 next button (to ground)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use smartvoice_core::config::{parse_config, SmartVoiceConfig};
use smartvoice_drivers::player::DfPlayer;

use crate::board::{GpioInput, ModuleUart};
use crate::channels::PlayerCommand;

/// Embedded configuration (compiled into firmware)
/// Edit player.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../player.toml");

mod board;
mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 128]> = StaticCell::new();

// Playlist is borrowed by the player task for the program lifetime
static CONFIG: StaticCell<SmartVoiceConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("SmartVoice firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // build.rs has already validated the file; this only fails if the
    // validator and the parser disagree
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            warn!("player.toml rejected ({:?}), using defaults", e);
            SmartVoiceConfig::default()
        }
    };
    let config: &'static SmartVoiceConfig = CONFIG.init(config);
    info!(
        "Config: volume={}, {} tracks, announce every {}",
        config.player.volume,
        config.playlist.tracks.len(),
        config.playlist.announce_every
    );

    // Module UART (9600 8N1)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.player.baudrate;

    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 128]);

    let uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);

    info!("UART initialized for DFPlayer");

    let busy = GpioInput::new(Input::new(p.PIN_6, Pull::Up));
    let pause_button = GpioInput::new(Input::new(p.PIN_15, Pull::Up));
    let next_button = GpioInput::new(Input::new(p.PIN_14, Pull::Up));

    let player = DfPlayer::new(ModuleUart::new(uart), Delay, config.player);

    // Spawn tasks
    spawner
        .spawn(tasks::player_task(player, busy, &config.playlist))
        .unwrap();
    spawner
        .spawn(tasks::button_task(pause_button, PlayerCommand::TogglePause))
        .unwrap();
    spawner
        .spawn(tasks::button_task(next_button, PlayerCommand::Next))
        .unwrap();

    info!("All tasks spawned, firmware running");
}
