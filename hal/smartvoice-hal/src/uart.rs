//! UART serial communication abstractions
//!
//! The audio module is a write-mostly peer: commands go out as whole frames
//! and the only thing most callers ask of the receive side is whether the
//! module has said anything at all.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Check whether at least one byte can be read without blocking
    fn read_ready(&mut self) -> Result<bool, Self::Error>;

    /// Read data from the UART
    ///
    /// Blocks until at least one byte is available, then returns how many
    /// bytes were copied into `buf`.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Read a single byte from the UART
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_blocking(&mut buf)?;
        Ok(buf[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Loopback {
        pending: Option<u8>,
    }

    impl UartTx for Loopback {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            self.pending = data.last().copied();
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    impl UartRx for Loopback {
        type Error = ();

        fn read_ready(&mut self) -> Result<bool, ()> {
            Ok(self.pending.is_some())
        }

        fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            match self.pending.take() {
                Some(byte) => {
                    buf[0] = byte;
                    Ok(1)
                }
                None => Err(()),
            }
        }
    }

    #[test]
    fn test_read_byte_default() {
        let mut uart = Loopback { pending: None };

        assert_eq!(uart.read_ready(), Ok(false));
        uart.write_blocking(&[0x7E, 0xEF]).unwrap();
        assert_eq!(uart.read_ready(), Ok(true));
        assert_eq!(uart.read_byte(), Ok(0xEF));
        assert_eq!(uart.read_ready(), Ok(false));
    }
}
