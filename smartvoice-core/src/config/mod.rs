//! Configuration types
//!
//! Parsed from the `player.toml` embedded in the firmware.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ConfigError};
pub use types::*;
