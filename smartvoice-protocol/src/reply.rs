//! Module to host replies
//!
//! The module answers queries and reports asynchronous events (track
//! finished, card swapped) with frames in the same layout as commands.

use crate::frame::Frame;

// Reply codes: module → host
pub const RPL_CARD_INSERTED: u8 = 0x3A;
pub const RPL_CARD_REMOVED: u8 = 0x3B;
pub const RPL_USB_FINISHED: u8 = 0x3C;
pub const RPL_SD_FINISHED: u8 = 0x3D;
pub const RPL_FLASH_FINISHED: u8 = 0x3E;
pub const RPL_ONLINE: u8 = 0x3F;
pub const RPL_ERROR: u8 = 0x40;
pub const RPL_ACK: u8 = 0x41;

/// Storage device a track finished on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Storage {
    Usb,
    Sd,
    Flash,
}

/// Bitmask of online storage devices, as reported to a `0x3F` query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StorageMask(pub u8);

impl StorageMask {
    pub const USB: u8 = 0x01;
    pub const SD: u8 = 0x02;
    pub const PC: u8 = 0x04;
    pub const FLASH: u8 = 0x10;

    pub fn has_usb(self) -> bool {
        self.0 & Self::USB != 0
    }

    pub fn has_sd_card(self) -> bool {
        self.0 & Self::SD != 0
    }

    pub fn has_pc(self) -> bool {
        self.0 & Self::PC != 0
    }

    pub fn has_flash(self) -> bool {
        self.0 & Self::FLASH != 0
    }

    /// No storage device online
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Error codes carried by a `0x40` reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModuleError {
    /// Module still initializing its storage
    Busy,
    /// Module is in sleep mode
    Sleeping,
    /// Serial frame was not received completely
    SerialReceive,
    /// Checksum of the last command was wrong
    Checksum,
    /// Track number outside the available range
    TrackOutOfScope,
    /// Track not found
    TrackNotFound,
    /// Advert clip requested while nothing is playing
    InsertionError,
    /// SD card read failure
    SdCard,
    /// Module entered sleep
    EnteredSleep,
    /// Code not documented by the module vendor
    Unknown(u16),
}

impl ModuleError {
    pub fn from_code(code: u16) -> Self {
        match code {
            0x01 => Self::Busy,
            0x02 => Self::Sleeping,
            0x03 => Self::SerialReceive,
            0x04 => Self::Checksum,
            0x05 => Self::TrackOutOfScope,
            0x06 => Self::TrackNotFound,
            0x07 => Self::InsertionError,
            0x08 => Self::SdCard,
            0x0A => Self::EnteredSleep,
            other => Self::Unknown(other),
        }
    }
}

/// A decoded reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Storage inserted (parameter identifies the device)
    CardInserted(u16),
    /// Storage removed
    CardRemoved(u16),
    /// A track finished playing
    TrackFinished { storage: Storage, track: u16 },
    /// Answer to the online-status query
    Online(StorageMask),
    /// Module rejected the last command
    Error(ModuleError),
    /// Command acknowledged
    Ack,
    /// Anything else (query answers this crate does not model)
    Other { command: u8, param: u16 },
}

impl Reply {
    /// Interpret a validated frame
    pub fn from_frame(frame: &Frame) -> Self {
        match frame.command {
            RPL_CARD_INSERTED => Reply::CardInserted(frame.param),
            RPL_CARD_REMOVED => Reply::CardRemoved(frame.param),
            RPL_USB_FINISHED => Reply::TrackFinished {
                storage: Storage::Usb,
                track: frame.param,
            },
            RPL_SD_FINISHED => Reply::TrackFinished {
                storage: Storage::Sd,
                track: frame.param,
            },
            RPL_FLASH_FINISHED => Reply::TrackFinished {
                storage: Storage::Flash,
                track: frame.param,
            },
            RPL_ONLINE => Reply::Online(StorageMask(frame.param_low())),
            RPL_ERROR => Reply::Error(ModuleError::from_code(frame.param)),
            RPL_ACK => Reply::Ack,
            command => Reply::Other {
                command,
                param: frame.param,
            },
        }
    }
}

impl From<Frame> for Reply {
    fn from(frame: Frame) -> Self {
        Reply::from_frame(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_reply() {
        let reply = Reply::from_frame(&Frame::new(RPL_ONLINE, 0x0002));
        assert_eq!(reply, Reply::Online(StorageMask(StorageMask::SD)));

        if let Reply::Online(mask) = reply {
            assert!(mask.has_sd_card());
            assert!(!mask.has_usb());
            assert!(!mask.is_empty());
        }
    }

    #[test]
    fn test_track_finished() {
        let reply = Reply::from(Frame::new(RPL_SD_FINISHED, 12));
        assert_eq!(
            reply,
            Reply::TrackFinished {
                storage: Storage::Sd,
                track: 12
            }
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Reply::from_frame(&Frame::new(RPL_ERROR, 0x0006)),
            Reply::Error(ModuleError::TrackNotFound)
        );
        assert_eq!(ModuleError::from_code(0x0A), ModuleError::EnteredSleep);
        assert_eq!(ModuleError::from_code(0x09), ModuleError::Unknown(0x09));
    }

    #[test]
    fn test_unmodelled_reply() {
        assert_eq!(
            Reply::from_frame(&Frame::new(0x43, 25)),
            Reply::Other {
                command: 0x43,
                param: 25
            }
        );
        assert_eq!(Reply::from_frame(&Frame::new(RPL_ACK, 0)), Reply::Ack);
    }

    #[test]
    fn test_storage_mask_bits() {
        let mask = StorageMask(StorageMask::USB | StorageMask::FLASH);
        assert!(mask.has_usb());
        assert!(mask.has_flash());
        assert!(!mask.has_pc());
        assert!(StorageMask::default().is_empty());
    }
}
