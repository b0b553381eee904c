//! Host to module commands
//!
//! The byte values are fixed by the module firmware; changing any of them
//! breaks interoperability with real hardware.

use crate::frame::{build_frame_u16, FRAME_LEN};

// Command bytes: host → module
pub const CMD_PLAY_TRACK: u8 = 0x03;
pub const CMD_SET_VOLUME: u8 = 0x06;
pub const CMD_RESET: u8 = 0x0C;
pub const CMD_RESUME: u8 = 0x0D;
pub const CMD_PAUSE: u8 = 0x0E;
pub const CMD_PLAY_FOLDER: u8 = 0x0F;
pub const CMD_ANNOUNCE: u8 = 0x13;
pub const CMD_STOP: u8 = 0x16;
pub const CMD_QUERY_ONLINE: u8 = 0x3F;

/// Highest volume level the module accepts
pub const MAX_VOLUME: u8 = 30;

/// Volume the module powers up with
pub const DEFAULT_VOLUME: u8 = 20;

/// Commands understood by the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Play a track by its global index on the medium
    PlayTrack = CMD_PLAY_TRACK,
    /// Set output volume (0-30, low parameter byte)
    SetVolume = CMD_SET_VOLUME,
    /// Reset the module
    Reset = CMD_RESET,
    /// Resume after pause
    Resume = CMD_RESUME,
    /// Pause playback
    Pause = CMD_PAUSE,
    /// Play file from folder (folder high byte, file low byte)
    PlayFolder = CMD_PLAY_FOLDER,
    /// Interrupt playback with an advert clip, then resume
    Announce = CMD_ANNOUNCE,
    /// Stop playback
    Stop = CMD_STOP,
    /// Ask which storage devices are online
    QueryOnline = CMD_QUERY_ONLINE,
}

impl Command {
    /// Raw command byte
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up a command by its raw byte
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            CMD_PLAY_TRACK => Some(Self::PlayTrack),
            CMD_SET_VOLUME => Some(Self::SetVolume),
            CMD_RESET => Some(Self::Reset),
            CMD_RESUME => Some(Self::Resume),
            CMD_PAUSE => Some(Self::Pause),
            CMD_PLAY_FOLDER => Some(Self::PlayFolder),
            CMD_ANNOUNCE => Some(Self::Announce),
            CMD_STOP => Some(Self::Stop),
            CMD_QUERY_ONLINE => Some(Self::QueryOnline),
            _ => None,
        }
    }

    /// Encode this command with a parameter into wire bytes
    pub fn to_frame(self, param: u16) -> [u8; FRAME_LEN] {
        build_frame_u16(self.code(), param)
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_codes() {
        assert_eq!(u8::from(Command::Reset), 0x0C);
        assert_eq!(u8::from(Command::SetVolume), 0x06);
        assert_eq!(u8::from(Command::PlayTrack), 0x03);
        assert_eq!(u8::from(Command::PlayFolder), 0x0F);
        assert_eq!(u8::from(Command::Announce), 0x13);
        assert_eq!(u8::from(Command::Pause), 0x0E);
        assert_eq!(u8::from(Command::Resume), 0x0D);
        assert_eq!(u8::from(Command::Stop), 0x16);
        assert_eq!(u8::from(Command::QueryOnline), 0x3F);
    }

    #[test]
    fn test_from_code() {
        for cmd in [
            Command::PlayTrack,
            Command::SetVolume,
            Command::Reset,
            Command::Resume,
            Command::Pause,
            Command::PlayFolder,
            Command::Announce,
            Command::Stop,
            Command::QueryOnline,
        ] {
            assert_eq!(Command::from_code(cmd.code()), Some(cmd));
        }
        assert_eq!(Command::from_code(0x3D), None);
    }

    #[test]
    fn test_to_frame() {
        let frame = Command::Stop.to_frame(0);
        assert_eq!(frame[3], CMD_STOP);
        assert_eq!(&frame[5..7], &[0, 0]);
    }
}
