//! Configuration type definitions

use heapless::Vec;
use smartvoice_protocol::{DEFAULT_VOLUME, MAX_VOLUME};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum tracks in a playlist
pub const MAX_PLAYLIST: usize = 16;

/// Module timing and startup settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlayerConfig {
    /// UART baud rate (the module only supports 9600)
    pub baudrate: u32,
    /// Volume applied after initialization (0-30)
    pub volume: u8,
    /// Wait after the reset command while the module mounts its storage
    pub boot_settle_ms: u32,
    /// Wait between the online query and checking for a response
    pub query_wait_ms: u32,
    /// Upper bound when waiting for a parsed reply
    pub reply_timeout_ms: u32,
    /// Check for an SD card during startup
    pub check_card: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            baudrate: 9600,
            volume: DEFAULT_VOLUME,
            boot_settle_ms: 500,
            query_wait_ms: 50,
            reply_timeout_ms: 200,
            check_card: true,
        }
    }
}

impl PlayerConfig {
    /// Configured volume limited to what the module accepts
    pub fn clamped_volume(&self) -> u8 {
        self.volume.min(MAX_VOLUME)
    }
}

/// Playlist walked by the firmware
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlaylistConfig {
    /// Global track numbers, played in order and repeated
    pub tracks: Vec<u16, MAX_PLAYLIST>,
    /// Advert clip played over the music
    pub announce_track: Option<u16>,
    /// Announce after every N finished tracks (0 = never)
    pub announce_every: u8,
    /// How often the busy line is sampled
    pub poll_interval_ms: u32,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            announce_track: None,
            announce_every: 0,
            poll_interval_ms: 1000,
        }
    }
}

impl PlaylistConfig {
    /// Track following `index`, wrapping at the end of the list
    pub fn next_index(&self, index: usize) -> Option<usize> {
        if self.tracks.is_empty() {
            None
        } else {
            Some((index + 1) % self.tracks.len())
        }
    }

    /// Whether an announcement is due after `finished` completed tracks
    pub fn announce_due(&self, finished: u32) -> Option<u16> {
        let every = self.announce_every as u32;
        if every == 0 || finished == 0 || finished % every != 0 {
            return None;
        }
        self.announce_track
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmartVoiceConfig {
    pub player: PlayerConfig,
    pub playlist: PlaylistConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.volume, 20);
        assert_eq!(config.boot_settle_ms, 500);
        assert_eq!(config.query_wait_ms, 50);
        assert_eq!(config.baudrate, 9600);
    }

    #[test]
    fn test_clamped_volume() {
        let mut config = PlayerConfig::default();
        config.volume = 45;
        assert_eq!(config.clamped_volume(), 30);
        config.volume = 7;
        assert_eq!(config.clamped_volume(), 7);
    }

    #[test]
    fn test_next_index_wraps() {
        let mut playlist = PlaylistConfig::default();
        assert_eq!(playlist.next_index(0), None);

        playlist.tracks.extend_from_slice(&[4, 8, 15]).unwrap();
        assert_eq!(playlist.next_index(0), Some(1));
        assert_eq!(playlist.next_index(2), Some(0));
    }

    #[test]
    fn test_announce_due() {
        let mut playlist = PlaylistConfig::default();
        playlist.announce_track = Some(99);
        assert_eq!(playlist.announce_due(3), None); // announce_every = 0

        playlist.announce_every = 3;
        assert_eq!(playlist.announce_due(0), None);
        assert_eq!(playlist.announce_due(2), None);
        assert_eq!(playlist.announce_due(3), Some(99));
        assert_eq!(playlist.announce_due(6), Some(99));

        playlist.announce_track = None;
        assert_eq!(playlist.announce_due(3), None);
    }
}
