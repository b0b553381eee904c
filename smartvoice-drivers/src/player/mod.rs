//! Audio module controllers

pub mod dfplayer;

pub use dfplayer::{DfPlayer, PlayerError};
