//! DFPlayer Mini controller (UART mode)
//!
//! The DFPlayer and its clones are MP3 decoders with a microSD slot that
//! take fixed 10-byte command frames at 9600 baud (8N1).
//!
//! # Wiring
//!
//! - Module RX ← MCU TX (through a 1k resistor to suppress audible noise)
//! - Module TX → MCU RX
//! - BUSY → any input, low while audio is playing
//!
//! # Behaviour
//!
//! Commands are fire-and-forget: the feedback bit is never set, so the
//! module does not acknowledge them. Two things need the receive side:
//!
//! - [`DfPlayer::is_sd_card_ready`] only checks that *something* arrived
//!   after an online query. Line noise reads as "ready", and a slow module
//!   reads as "not ready".
//! - [`DfPlayer::query_storage`] parses the reply and reports the actual
//!   storage bitmask. Prefer it when the distinction matters.

use embedded_hal::delay::DelayNs;
use smartvoice_core::config::PlayerConfig;
use smartvoice_hal::gpio::InputPin;
use smartvoice_hal::uart::{UartRx, UartTx};
use smartvoice_protocol::command::Command;
use smartvoice_protocol::frame::{build_frame, FrameError, FrameParser, FRAME_LEN};
use smartvoice_protocol::reply::{ModuleError, Reply, StorageMask};
use smartvoice_protocol::{DEFAULT_VOLUME, MAX_VOLUME};

/// DFPlayer communication errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerError<E> {
    /// The transport failed to write, flush or report readiness
    Transport(E),
    /// A reply frame failed validation
    Frame(FrameError),
    /// The module answered with an error code
    Module(ModuleError),
}

impl<E> From<FrameError> for PlayerError<E> {
    fn from(e: FrameError) -> Self {
        PlayerError::Frame(e)
    }
}

/// DFPlayer controller
///
/// Owns the UART and the delay provider for its whole lifetime. Not meant
/// to be shared between tasks without a mutex around it.
pub struct DfPlayer<U, D> {
    uart: U,
    delay: D,
    config: PlayerConfig,
    volume: u8,
    parser: FrameParser,
}

impl<U, D, E> DfPlayer<U, D>
where
    U: UartTx<Error = E> + UartRx<Error = E>,
    D: DelayNs,
{
    /// Bind a transport and delay provider
    ///
    /// Nothing is sent until [`begin`](Self::begin).
    pub fn new(uart: U, delay: D, config: PlayerConfig) -> Self {
        Self {
            uart,
            delay,
            config,
            volume: DEFAULT_VOLUME,
            parser: FrameParser::new(),
        }
    }

    /// Reset the module and wait for it to mount its storage
    ///
    /// Blocks for `boot_settle_ms`. Commands sent before the wait is over
    /// are likely to be dropped by the module.
    pub fn begin(&mut self) -> Result<(), PlayerError<E>> {
        self.reset()?;
        #[cfg(feature = "defmt")]
        defmt::debug!("DFPlayer reset, settling {}ms", self.config.boot_settle_ms);
        self.delay.delay_ms(self.config.boot_settle_ms);
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Last commanded volume (never read back from the module)
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Send a raw command with an explicit parameter pair
    pub fn send_raw(&mut self, command: u8, high: u8, low: u8) -> Result<(), PlayerError<E>> {
        let frame = build_frame(command, high, low);
        #[cfg(feature = "defmt")]
        defmt::trace!("DFPlayer tx {=[u8]:x}", &frame[..]);
        self.write_frame(&frame)
    }

    /// Send a command with a 16-bit parameter
    pub fn send(&mut self, command: Command, param: u16) -> Result<(), PlayerError<E>> {
        let [high, low] = param.to_be_bytes();
        self.send_raw(command.code(), high, low)
    }

    fn write_frame(&mut self, frame: &[u8; FRAME_LEN]) -> Result<(), PlayerError<E>> {
        self.uart
            .write_blocking(frame)
            .map_err(PlayerError::Transport)
    }

    /// Send the reset command without waiting
    pub fn reset(&mut self) -> Result<(), PlayerError<E>> {
        self.send(Command::Reset, 0)
    }

    /// Set the output volume
    ///
    /// Values above 30 are clamped to 30.
    pub fn set_volume(&mut self, volume: u8) -> Result<(), PlayerError<E>> {
        self.volume = volume.min(MAX_VOLUME);
        self.send_raw(Command::SetVolume.code(), 0, self.volume)
    }

    /// Play a track by its global index (file order on the card)
    pub fn play_track(&mut self, track: u16) -> Result<(), PlayerError<E>> {
        self.send(Command::PlayTrack, track)
    }

    /// Play `file` from numbered `folder` (e.g. `/01/005.mp3`)
    pub fn play_from_folder(&mut self, folder: u8, file: u8) -> Result<(), PlayerError<E>> {
        self.send_raw(Command::PlayFolder.code(), folder, file)
    }

    /// Interrupt playback with a clip; the module resumes afterwards
    ///
    /// The module saves and restores the playback position itself. There is
    /// no way to observe whether it actually resumed.
    pub fn announce(&mut self, track: u16) -> Result<(), PlayerError<E>> {
        self.send(Command::Announce, track)
    }

    /// Pause the current track
    pub fn pause(&mut self) -> Result<(), PlayerError<E>> {
        self.send(Command::Pause, 0)
    }

    /// Continue a paused track
    pub fn resume(&mut self) -> Result<(), PlayerError<E>> {
        self.send(Command::Resume, 0)
    }

    /// Stop playback
    pub fn stop(&mut self) -> Result<(), PlayerError<E>> {
        self.send(Command::Stop, 0)
    }

    /// Send the online-status query without waiting for the answer
    pub fn query_status(&mut self) -> Result<(), PlayerError<E>> {
        self.send(Command::QueryOnline, 0)
    }

    /// Heuristic SD card check
    ///
    /// Sends the online query, blocks for `query_wait_ms`, then reports
    /// whether any byte is waiting on the receive side. The reply is left
    /// unread and is not validated.
    pub fn is_sd_card_ready(&mut self) -> Result<bool, PlayerError<E>> {
        self.query_status()?;
        self.delay.delay_ms(self.config.query_wait_ms);
        self.uart.read_ready().map_err(PlayerError::Transport)
    }

    /// Whether the module is playing, from its active-low BUSY line
    pub fn is_playing<P: InputPin>(&self, busy: &P) -> bool {
        busy.is_low()
    }

    /// Drain readable bytes until a complete reply is decoded
    ///
    /// Never blocks on an empty line. Partial frames stay buffered for the
    /// next call.
    pub fn poll_reply(&mut self) -> Result<Option<Reply>, PlayerError<E>> {
        while self.uart.read_ready().map_err(PlayerError::Transport)? {
            let byte = self.uart.read_byte().map_err(PlayerError::Transport)?;
            if let Some(frame) = self.parser.feed(byte)? {
                let reply = Reply::from_frame(&frame);
                #[cfg(feature = "defmt")]
                defmt::trace!("DFPlayer rx {}", reply);
                return Ok(Some(reply));
            }
        }
        Ok(None)
    }

    /// Wait up to `timeout_ms` for the next reply
    pub fn wait_reply(&mut self, timeout_ms: u32) -> Result<Option<Reply>, PlayerError<E>> {
        let mut waited = 0;
        loop {
            if let Some(reply) = self.poll_reply()? {
                return Ok(Some(reply));
            }
            if waited >= timeout_ms {
                return Ok(None);
            }
            self.delay.delay_ms(1);
            waited += 1;
        }
    }

    /// Ask the module which storage devices are online
    ///
    /// Unrelated replies (track-finished events and the like) that arrive
    /// first are skipped, as are frames that fail validation. Returns
    /// `None` when no answer arrives within
    /// `reply_timeout_ms`.
    pub fn query_storage(&mut self) -> Result<Option<StorageMask>, PlayerError<E>> {
        self.query_status()?;
        self.uart.flush().map_err(PlayerError::Transport)?;

        let timeout_ms = self.config.reply_timeout_ms;
        let mut waited = 0;
        loop {
            match self.poll_reply() {
                Ok(Some(Reply::Online(mask))) => return Ok(Some(mask)),
                Ok(Some(Reply::Error(code))) => return Err(PlayerError::Module(code)),
                Ok(Some(_other)) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("DFPlayer skipping reply {} while querying", _other);
                    continue;
                }
                // A corrupted stale frame does not end the query
                Err(PlayerError::Frame(_e)) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("DFPlayer discarding bad frame while querying: {}", _e);
                    continue;
                }
                Err(e) => return Err(e),
                Ok(None) => {}
            }
            if waited >= timeout_ms {
                return Ok(None);
            }
            self.delay.delay_ms(1);
            waited += 1;
        }
    }

    /// Give back the transport and delay provider
    pub fn release(self) -> (U, D) {
        (self.uart, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::{Deque, Vec};
    use smartvoice_protocol::frame::build_frame_u16;

    /// Mock UART recording writes and serving queued receive bytes
    #[derive(Default)]
    struct MockUart {
        sent: Vec<u8, 1024>,
        rx: Deque<u8, 64>,
        /// Queued into `rx` whenever an online query is written
        online_reply: Option<[u8; FRAME_LEN]>,
        fail_writes: bool,
        flushes: u32,
    }

    impl MockUart {
        fn frames(&self) -> impl Iterator<Item = &[u8]> {
            self.sent.chunks(FRAME_LEN)
        }

        fn last_frame(&self) -> &[u8] {
            self.frames().last().unwrap()
        }

        fn queue_rx(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.rx.push_back(b).unwrap();
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct MockError;

    impl UartTx for MockUart {
        type Error = MockError;

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), MockError> {
            if self.fail_writes {
                return Err(MockError);
            }
            self.sent.extend_from_slice(data).map_err(|_| MockError)?;
            if data.len() == FRAME_LEN && data[3] == Command::QueryOnline.code() {
                if let Some(reply) = self.online_reply {
                    self.queue_rx(&reply);
                }
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<(), MockError> {
            self.flushes += 1;
            Ok(())
        }
    }

    impl UartRx for MockUart {
        type Error = MockError;

        fn read_ready(&mut self) -> Result<bool, MockError> {
            Ok(!self.rx.is_empty())
        }

        fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, MockError> {
            let mut n = 0;
            while n < buf.len() {
                match self.rx.pop_front() {
                    Some(b) => {
                        buf[n] = b;
                        n += 1;
                    }
                    None => break,
                }
            }
            if n == 0 {
                Err(MockError)
            } else {
                Ok(n)
            }
        }
    }

    /// Mock delay accumulating requested time
    #[derive(Default)]
    struct MockDelay {
        total_ns: u64,
        calls: u32,
    }

    impl MockDelay {
        fn total_ms(&self) -> u64 {
            self.total_ns / 1_000_000
        }
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
            self.calls += 1;
        }

        fn delay_us(&mut self, us: u32) {
            self.total_ns += us as u64 * 1_000;
            self.calls += 1;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.total_ns += ms as u64 * 1_000_000;
            self.calls += 1;
        }
    }

    struct MockPin {
        high: bool,
    }

    impl InputPin for MockPin {
        fn is_high(&self) -> bool {
            self.high
        }
    }

    fn player() -> DfPlayer<MockUart, MockDelay> {
        DfPlayer::new(
            MockUart::default(),
            MockDelay::default(),
            PlayerConfig::default(),
        )
    }

    fn assert_frame(frame: &[u8], command: u8, high: u8, low: u8) {
        assert_eq!(frame, &build_frame(command, high, low)[..]);
    }

    #[test]
    fn test_new_sends_nothing() {
        let p = player();
        assert!(p.uart.sent.is_empty());
        assert_eq!(p.volume(), 20);
    }

    #[test]
    fn test_begin_resets_and_settles() {
        let mut p = player();
        p.begin().unwrap();

        assert_eq!(p.uart.sent.len(), FRAME_LEN);
        assert_frame(p.uart.last_frame(), 0x0C, 0, 0);
        assert_eq!(p.delay.total_ms(), 500);
        assert_eq!(p.delay.calls, 1);
    }

    #[test]
    fn test_reset_does_not_wait() {
        let mut p = player();
        p.reset().unwrap();
        assert_frame(p.uart.last_frame(), 0x0C, 0, 0);
        assert_eq!(p.delay.calls, 0);
    }

    #[test]
    fn test_set_volume_30_exact_bytes() {
        let mut p = player();
        p.set_volume(30).unwrap();
        assert_eq!(
            p.uart.sent.as_slice(),
            &[0x7E, 0xFF, 0x06, 0x06, 0x00, 0x00, 0x1E, 0xFE, 0xD7, 0xEF]
        );
        assert_eq!(p.volume(), 30);
    }

    #[test]
    fn test_set_volume_clamps() {
        let mut p = player();
        for input in [31u8, 45, 200, 255] {
            p.set_volume(input).unwrap();
            assert_frame(p.uart.last_frame(), 0x06, 0, 30);
            assert_eq!(p.volume(), 30);
        }
        for input in 0u8..=30 {
            p.set_volume(input).unwrap();
            assert_frame(p.uart.last_frame(), 0x06, 0, input);
            assert_eq!(p.volume(), input);
        }
    }

    #[test]
    fn test_command_surface() {
        let mut p = player();
        p.play_track(0x0102).unwrap();
        p.play_from_folder(1, 5).unwrap();
        p.announce(7).unwrap();
        p.pause().unwrap();
        p.resume().unwrap();
        p.stop().unwrap();
        p.query_status().unwrap();

        let mut frames = p.uart.frames();
        assert_frame(frames.next().unwrap(), 0x03, 0x01, 0x02);
        assert_frame(frames.next().unwrap(), 0x0F, 0x01, 0x05);
        assert_frame(frames.next().unwrap(), 0x13, 0x00, 0x07);
        assert_frame(frames.next().unwrap(), 0x0E, 0, 0);
        assert_frame(frames.next().unwrap(), 0x0D, 0, 0);
        assert_frame(frames.next().unwrap(), 0x16, 0, 0);
        assert_frame(frames.next().unwrap(), 0x3F, 0, 0);
        assert!(frames.next().is_none());

        // No command waits
        assert_eq!(p.delay.calls, 0);
    }

    #[test]
    fn test_send_raw_accepts_any_command() {
        let mut p = player();
        p.send_raw(0xAB, 0xCD, 0xEF).unwrap();
        assert_frame(p.uart.last_frame(), 0xAB, 0xCD, 0xEF);
    }

    #[test]
    fn test_transport_error_surfaces() {
        let mut p = player();
        p.uart.fail_writes = true;

        assert_eq!(p.play_track(1), Err(PlayerError::Transport(MockError)));
        assert_eq!(p.begin(), Err(PlayerError::Transport(MockError)));
        // Failed reset skips the settle delay
        assert_eq!(p.delay.calls, 0);
    }

    #[test]
    fn test_volume_cached_even_when_write_fails() {
        let mut p = player();
        p.uart.fail_writes = true;
        assert!(p.set_volume(12).is_err());
        assert_eq!(p.volume(), 12);
    }

    #[test]
    fn test_sd_card_ready_no_bytes() {
        let mut p = player();
        assert_eq!(p.is_sd_card_ready(), Ok(false));
        assert_frame(p.uart.last_frame(), 0x3F, 0, 0);
        assert_eq!(p.delay.total_ms(), 50);
    }

    #[test]
    fn test_sd_card_ready_any_byte() {
        let mut p = player();
        p.uart.queue_rx(&[0x00]);
        assert_eq!(p.is_sd_card_ready(), Ok(true));
        // Reply left unread
        assert_eq!(p.uart.rx.len(), 1);
    }

    #[test]
    fn test_is_playing_active_low() {
        let p = player();
        assert!(p.is_playing(&MockPin { high: false }));
        assert!(!p.is_playing(&MockPin { high: true }));
    }

    #[test]
    fn test_poll_reply() {
        let mut p = player();
        assert_eq!(p.poll_reply(), Ok(None));

        let reply = build_frame_u16(0x3D, 4);
        p.uart.queue_rx(&reply[..6]);
        assert_eq!(p.poll_reply(), Ok(None));
        p.uart.queue_rx(&reply[6..]);
        assert_eq!(
            p.poll_reply(),
            Ok(Some(Reply::TrackFinished {
                storage: smartvoice_protocol::Storage::Sd,
                track: 4
            }))
        );
    }

    #[test]
    fn test_poll_reply_bad_checksum() {
        let mut p = player();
        let mut reply = build_frame_u16(0x41, 0);
        reply[8] ^= 0x55;
        p.uart.queue_rx(&reply);
        assert_eq!(
            p.poll_reply(),
            Err(PlayerError::Frame(FrameError::ChecksumMismatch))
        );
    }

    #[test]
    fn test_wait_reply_times_out() {
        let mut p = player();
        assert_eq!(p.wait_reply(25), Ok(None));
        assert_eq!(p.delay.total_ms(), 25);
    }

    #[test]
    fn test_query_storage_online() {
        let mut p = player();
        p.uart.online_reply = Some(build_frame_u16(0x3F, 0x0002));
        // A stale event sits in front of the answer
        p.uart.queue_rx(&build_frame_u16(0x3D, 9));

        let mask = p.query_storage().unwrap().unwrap();
        assert!(mask.has_sd_card());
        assert_eq!(p.uart.flushes, 1);
        assert_eq!(p.delay.calls, 0);
    }

    #[test]
    fn test_query_storage_skips_corrupted_frame() {
        let mut p = player();
        p.uart.online_reply = Some(build_frame_u16(0x3F, 0x0002));
        let mut stale = build_frame_u16(0x3D, 9);
        stale[8] ^= 0x01;
        p.uart.queue_rx(&stale);

        assert_eq!(p.query_storage(), Ok(Some(StorageMask(0x02))));
    }

    #[test]
    fn test_query_storage_timeout() {
        let mut p = player();
        assert_eq!(p.query_storage(), Ok(None));
        assert_eq!(p.delay.total_ms(), 200);
    }

    #[test]
    fn test_query_storage_module_error() {
        let mut p = player();
        p.uart.online_reply = Some(build_frame_u16(0x40, 0x0001));
        assert_eq!(
            p.query_storage(),
            Err(PlayerError::Module(ModuleError::Busy))
        );
    }

    #[test]
    fn test_release_returns_transport() {
        let mut p = player();
        p.stop().unwrap();
        let (uart, delay) = p.release();
        assert_eq!(uart.sent.len(), FRAME_LEN);
        assert_eq!(delay.calls, 0);
    }
}
