//! DFPlayer serial command protocol
//!
//! This crate defines the wire format spoken by DFPlayer-class MP3 modules
//! over a 9600 baud UART. Every message in either direction is one fixed
//! frame:
//!
//! ```text
//! ┌───────┬─────────┬────────┬─────────┬──────────┬─────────────┬─────────────┬──────┐
//! │ START │ VERSION │ LENGTH │ COMMAND │ FEEDBACK │ PARAM (BE)  │ CHECKSUM(BE)│ END  │
//! │ 0x7E  │ 0xFF    │ 0x06   │ 1B      │ 1B       │ 2B          │ 2B          │ 0xEF │
//! └───────┴─────────┴────────┴─────────┴──────────┴─────────────┴─────────────┴──────┘
//! ```
//!
//! The checksum is the 16-bit two's-complement negation of the sum of
//! VERSION through PARAM. A single wrong byte makes the module drop the
//! frame, so the encoder has no configurable parts.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod frame;
pub mod reply;

pub use command::{Command, DEFAULT_VOLUME, MAX_VOLUME};
pub use frame::{
    build_frame, build_frame_u16, checksum, Frame, FrameError, FrameParser, END_BYTE, FRAME_LEN,
    LENGTH, START_BYTE, VERSION,
};
pub use reply::{ModuleError, Reply, Storage, StorageMask};
