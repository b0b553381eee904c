//! GPIO pin abstractions

/// Digital input pin
///
/// Implementations should handle the actual hardware register reading
/// for the specific chip.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

impl<T: InputPin + ?Sized> InputPin for &T {
    fn is_high(&self) -> bool {
        (**self).is_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPin(bool);

    impl InputPin for FixedPin {
        fn is_high(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_is_low_default() {
        assert!(FixedPin(false).is_low());
        assert!(!FixedPin(true).is_low());
    }

    #[test]
    fn test_reference_forwarding() {
        let pin = FixedPin(true);
        let by_ref = &pin;
        assert!(by_ref.is_high());
        assert!(!InputPin::is_low(&by_ref));
    }
}
