//! Playlist playback state machine
//!
//! Pure logic behind the firmware player task. Each BUSY-line sample or
//! user request is turned into an [`Action`] for the module controller, so
//! the transitions can be tested without hardware.

use crate::config::PlaylistConfig;

/// Samples without the BUSY line going low before a track is skipped
pub const MAX_IDLE_POLLS: u8 = 6;

/// What the controller should send next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Nothing to send
    None,
    /// Start a playlist track
    Play(u16),
    /// Insert an advert clip over the running track
    Announce(u16),
    Pause,
    Resume,
}

/// Progress through the playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Playback {
    index: usize,
    finished: u32,
    started: bool,
    idle_polls: u8,
    paused: bool,
    announce_pending: bool,
}

impl Playback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position in the playlist
    pub fn index(&self) -> usize {
        self.index
    }

    /// Tracks that played to the end
    pub fn finished(&self) -> u32 {
        self.finished
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Begin the current entry; `None` for an empty playlist
    pub fn start(&mut self, playlist: &PlaylistConfig) -> Option<u16> {
        let track = playlist.tracks.get(self.index).copied()?;
        self.started = false;
        self.idle_polls = 0;
        Some(track)
    }

    fn advance(&mut self, playlist: &PlaylistConfig) -> Action {
        if let Some(next) = playlist.next_index(self.index) {
            self.index = next;
        }
        match self.start(playlist) {
            Some(track) => Action::Play(track),
            None => Action::None,
        }
    }

    /// One sample of the BUSY line
    pub fn poll(&mut self, playlist: &PlaylistConfig, playing: bool) -> Action {
        if self.paused || playlist.tracks.is_empty() {
            return Action::None;
        }

        if playing {
            self.started = true;
            self.idle_polls = 0;

            // Advert clips only play over running music
            if self.announce_pending {
                self.announce_pending = false;
                if let Some(track) = playlist.announce_track {
                    return Action::Announce(track);
                }
            }
            return Action::None;
        }

        if self.started {
            self.finished += 1;
            self.announce_pending = playlist.announce_due(self.finished).is_some();
            return self.advance(playlist);
        }

        self.idle_polls += 1;
        if self.idle_polls >= MAX_IDLE_POLLS {
            return self.advance(playlist);
        }

        Action::None
    }

    /// Pause when playing, resume when paused
    pub fn toggle_pause(&mut self) -> Action {
        if self.paused {
            self.paused = false;
            // BUSY lags the resume command; the track has not ended
            self.started = false;
            self.idle_polls = 0;
            Action::Resume
        } else {
            self.paused = true;
            Action::Pause
        }
    }

    /// Skip to the next playlist entry
    pub fn skip(&mut self, playlist: &PlaylistConfig) -> Action {
        self.paused = false;
        self.advance(playlist)
    }
}
