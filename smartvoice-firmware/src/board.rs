//! Board adapters
//!
//! Wraps embassy-rp peripherals in the smartvoice-hal traits so the
//! driver stays chip-agnostic.

use embassy_rp::gpio::Input;
use embassy_rp::uart::{BufferedUart, Error as UartError};
use embassy_time::Delay;
use embedded_io::{Read, ReadReady, Write};

use smartvoice_drivers::player::{DfPlayer, PlayerError};
use smartvoice_hal::{InputPin, UartRx, UartTx};

/// Controller type used by this firmware
pub type Player = DfPlayer<ModuleUart, Delay>;

/// Controller error on this board
pub type PlayerFault = PlayerError<UartError>;

/// Buffered UART connected to the module
pub struct ModuleUart {
    uart: BufferedUart,
}

impl ModuleUart {
    pub fn new(uart: BufferedUart) -> Self {
        Self { uart }
    }
}

impl UartTx for ModuleUart {
    type Error = UartError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), UartError> {
        Write::write_all(&mut self.uart, data)
    }

    fn flush(&mut self) -> Result<(), UartError> {
        Write::flush(&mut self.uart)
    }
}

impl UartRx for ModuleUart {
    type Error = UartError;

    fn read_ready(&mut self) -> Result<bool, UartError> {
        ReadReady::read_ready(&mut self.uart)
    }

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, UartError> {
        Read::read(&mut self.uart, buf)
    }
}

/// Module BUSY line (or a button), read through the HAL trait
pub struct GpioInput {
    pin: Input<'static>,
}

impl GpioInput {
    pub fn new(pin: Input<'static>) -> Self {
        Self { pin }
    }
}

impl InputPin for GpioInput {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
