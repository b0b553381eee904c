//! Frame encoding and decoding.
//!
//! Frame format (always 10 bytes):
//! - START (1 byte): 0x7E
//! - VERSION (1 byte): 0xFF
//! - LENGTH (1 byte): 0x06, count of VERSION..PARAM
//! - COMMAND (1 byte)
//! - FEEDBACK (1 byte): 0x00, acknowledgements are never requested
//! - PARAM (2 bytes): big-endian
//! - CHECKSUM (2 bytes): big-endian, `-(VERSION + LENGTH + COMMAND + FEEDBACK + PARAM_H + PARAM_L)`
//! - END (1 byte): 0xEF

/// Frame start marker
pub const START_BYTE: u8 = 0x7E;

/// Protocol version byte
pub const VERSION: u8 = 0xFF;

/// Payload length byte (VERSION through PARAM_L)
pub const LENGTH: u8 = 0x06;

/// Feedback byte for outgoing frames
pub const NO_FEEDBACK: u8 = 0x00;

/// Frame end marker
pub const END_BYTE: u8 = 0xEF;

/// Size of every frame on the wire
pub const FRAME_LEN: usize = 10;

/// Errors that can occur while decoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// First byte is not 0x7E
    InvalidStart,
    /// Version byte is not 0xFF
    InvalidVersion,
    /// Length byte is not 0x06
    InvalidLength,
    /// Last byte is not 0xEF
    InvalidEnd,
    /// Checksum does not cancel the payload sum
    ChecksumMismatch,
}

/// Compute the frame checksum over the payload bytes (VERSION..PARAM_L)
///
/// The sum wraps at 16 bits and is negated, so adding the checksum back to
/// the payload sum yields zero mod 65536.
pub fn checksum(payload: &[u8]) -> u16 {
    let sum = payload
        .iter()
        .fold(0u16, |acc, &byte| acc.wrapping_add(byte as u16));
    0u16.wrapping_sub(sum)
}

/// Build a command frame from a command byte and an explicit parameter pair
///
/// The command byte is not validated; whatever is passed goes on the wire.
pub fn build_frame(command: u8, high: u8, low: u8) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = START_BYTE;
    frame[1] = VERSION;
    frame[2] = LENGTH;
    frame[3] = command;
    frame[4] = NO_FEEDBACK;
    frame[5] = high;
    frame[6] = low;

    let [ck_high, ck_low] = checksum(&frame[1..7]).to_be_bytes();
    frame[7] = ck_high;
    frame[8] = ck_low;
    frame[9] = END_BYTE;
    frame
}

/// Build a command frame from a command byte and a 16-bit parameter
pub fn build_frame_u16(command: u8, param: u16) -> [u8; FRAME_LEN] {
    let [high, low] = param.to_be_bytes();
    build_frame(command, high, low)
}

/// A decoded frame
///
/// Used for replies coming back from the module, which share the command
/// frame layout but may carry a non-zero feedback byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Command or event code
    pub command: u8,
    /// Feedback byte
    pub feedback: u8,
    /// 16-bit parameter
    pub param: u16,
}

impl Frame {
    /// Create an outgoing frame (feedback disabled)
    pub fn new(command: u8, param: u16) -> Self {
        Self {
            command,
            feedback: NO_FEEDBACK,
            param,
        }
    }

    /// Create an outgoing frame from two independent parameter bytes
    pub fn with_bytes(command: u8, high: u8, low: u8) -> Self {
        Self::new(command, u16::from_be_bytes([high, low]))
    }

    /// Parameter high byte
    pub fn param_high(&self) -> u8 {
        (self.param >> 8) as u8
    }

    /// Parameter low byte
    pub fn param_low(&self) -> u8 {
        (self.param & 0xFF) as u8
    }

    /// Encode this frame into its 10 wire bytes
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut bytes = build_frame(self.command, self.param_high(), self.param_low());
        if self.feedback != NO_FEEDBACK {
            bytes[4] = self.feedback;
            let [ck_high, ck_low] = checksum(&bytes[1..7]).to_be_bytes();
            bytes[7] = ck_high;
            bytes[8] = ck_low;
        }
        bytes
    }

    /// Decode and validate 10 wire bytes
    pub fn decode(bytes: &[u8; FRAME_LEN]) -> Result<Self, FrameError> {
        if bytes[0] != START_BYTE {
            return Err(FrameError::InvalidStart);
        }
        if bytes[1] != VERSION {
            return Err(FrameError::InvalidVersion);
        }
        if bytes[2] != LENGTH {
            return Err(FrameError::InvalidLength);
        }
        if bytes[9] != END_BYTE {
            return Err(FrameError::InvalidEnd);
        }

        let received = u16::from_be_bytes([bytes[7], bytes[8]]);
        if received != checksum(&bytes[1..7]) {
            return Err(FrameError::ChecksumMismatch);
        }

        Ok(Self {
            command: bytes[3],
            feedback: bytes[4],
            param: u16::from_be_bytes([bytes[5], bytes[6]]),
        })
    }
}

/// State machine for parsing incoming frames
///
/// The module may emit noise at power-up, so bytes before a START marker are
/// dropped and a bad VERSION or LENGTH restarts the search.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    buffer: [u8; FRAME_LEN],
    len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for START byte
    WaitingForStart,
    /// Got START, waiting for VERSION
    WaitingForVersion,
    /// Got VERSION, waiting for LENGTH
    WaitingForLength,
    /// Reading COMMAND through END
    ReadingBody,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForStart,
            buffer: [0u8; FRAME_LEN],
            len: 0,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForStart;
        self.len = 0;
    }

    fn push(&mut self, byte: u8) {
        self.buffer[self.len] = byte;
        self.len += 1;
    }

    /// Restart the search, treating `byte` as a possible new START
    fn resync(&mut self, byte: u8) {
        self.reset();
        if byte == START_BYTE {
            self.push(byte);
            self.state = ParseState::WaitingForVersion;
        }
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` when a complete frame
    /// failed validation.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ParseState::WaitingForStart => {
                // Silently ignore non-START bytes while waiting
                self.resync(byte);
                Ok(None)
            }
            ParseState::WaitingForVersion => {
                if byte == VERSION {
                    self.push(byte);
                    self.state = ParseState::WaitingForLength;
                } else {
                    self.resync(byte);
                }
                Ok(None)
            }
            ParseState::WaitingForLength => {
                if byte == LENGTH {
                    self.push(byte);
                    self.state = ParseState::ReadingBody;
                } else {
                    self.resync(byte);
                }
                Ok(None)
            }
            ParseState::ReadingBody => {
                self.push(byte);
                if self.len < FRAME_LEN {
                    return Ok(None);
                }

                let bytes = self.buffer;
                self.reset();
                Frame::decode(&bytes).map(Some)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
