//! Board-agnostic core for the SmartVoice driver
//!
//! Holds everything that describes *how* the module should be driven
//! without touching hardware:
//!
//! - Player timing and volume configuration
//! - Playlist configuration for the firmware
//! - The playlist playback state machine
//! - A minimal TOML-subset parser for `player.toml`

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod playback;
