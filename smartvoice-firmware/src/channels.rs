//! Inter-task communication channels

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Channel capacity for user commands
const COMMAND_CHANNEL_SIZE: usize = 4;

/// User requests from the front-panel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum PlayerCommand {
    /// Pause when playing, resume when paused
    TogglePause,
    /// Skip to the next playlist entry
    Next,
}

/// Button presses for the player task
pub static PLAYER_CMD: Channel<CriticalSectionRawMutex, PlayerCommand, COMMAND_CHANNEL_SIZE> =
    Channel::new();
