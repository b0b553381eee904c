//! SmartVoice Hardware Abstraction Layer
//!
//! The audio module driver never touches a peripheral directly. It consumes
//! the capabilities defined here, and board crates (or test mocks) provide
//! them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  smartvoice-drivers (DfPlayer)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  smartvoice-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ firmware      │       │ host mocks    │
//! │ board adapters│       │ (unit tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial byte stream to the module
//! - [`gpio::InputPin`] - Digital input (the module's BUSY line)
//!
//! Blocking delays use `embedded_hal::delay::DelayNs` directly.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::InputPin;
pub use uart::{UartRx, UartTx};
