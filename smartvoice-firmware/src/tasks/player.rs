//! Player task
//!
//! Owns the DFPlayer controller. Initializes the module, checks for a
//! card, then feeds BUSY samples and button presses to the playback state
//! machine and sends the resulting commands.
//!
//! The controller blocks the executor during its fixed delays (500ms at
//! reset, 50ms for the card heuristic). Nothing else on this board is
//! latency sensitive, so that is tolerated.

use defmt::*;
use embassy_time::{Duration, Ticker};

use smartvoice_core::config::PlaylistConfig;
use smartvoice_core::playback::{Action, Playback};
use smartvoice_drivers::player::PlayerError;

use crate::board::{GpioInput, Player, PlayerFault};
use crate::channels::{PlayerCommand, PLAYER_CMD};

/// Player task
#[embassy_executor::task]
pub async fn player_task(mut player: Player, busy: GpioInput, playlist: &'static PlaylistConfig) {
    info!("Player task starting...");

    if let Err(e) = start_module(&mut player) {
        error!("DFPlayer startup failed: {:?}", e);
        return;
    }

    let mut state = Playback::new();
    match state.start(playlist) {
        Some(track) => {
            if let Err(e) = perform(&mut player, playlist, &state, Action::Play(track)) {
                error!("Failed to start playback: {:?}", e);
            }
        }
        None => {
            warn!("Playlist is empty, nothing to play");
            return;
        }
    }

    let mut ticker = Ticker::every(Duration::from_millis(playlist.poll_interval_ms as u64));

    loop {
        ticker.next().await;

        if let Ok(command) = PLAYER_CMD.try_receive() {
            let action = match command {
                PlayerCommand::TogglePause => state.toggle_pause(),
                PlayerCommand::Next => state.skip(playlist),
            };
            if let Err(e) = perform(&mut player, playlist, &state, action) {
                warn!("Command {:?} failed: {:?}", command, e);
            }
            // BUSY needs a poll interval to follow the command
            drain_replies(&mut player);
            continue;
        }

        drain_replies(&mut player);

        let action = state.poll(playlist, player.is_playing(&busy));
        if let Err(e) = perform(&mut player, playlist, &state, action) {
            warn!("Playback step failed: {:?}", e);
        }
    }
}

/// Reset, set the volume and check the card
fn start_module(player: &mut Player) -> Result<(), PlayerFault> {
    player.begin()?;
    info!("DFPlayer reset complete");

    let volume = player.config().clamped_volume();
    player.set_volume(volume)?;
    info!("Volume set to {}", player.volume());

    if !player.config().check_card {
        return Ok(());
    }

    match player.query_storage() {
        Ok(Some(mask)) if mask.has_sd_card() => info!("SD card online"),
        Ok(Some(mask)) => warn!("No SD card online (storage mask {=u8:#x})", mask.0),
        Ok(None) => {
            // Some clones never answer the query properly; fall back to
            // "did it say anything at all"
            if player.is_sd_card_ready()? {
                info!("Module responded to card query");
            } else {
                warn!("No response to card query, is the SD card inserted?");
            }
        }
        Err(PlayerError::Module(code)) => warn!("Module reported {:?} during card query", code),
        Err(e) => return Err(e),
    }

    Ok(())
}

/// Send whatever the state machine asked for
fn perform(
    player: &mut Player,
    playlist: &PlaylistConfig,
    state: &Playback,
    action: Action,
) -> Result<(), PlayerFault> {
    match action {
        Action::None => Ok(()),
        Action::Play(track) => {
            info!(
                "Playing track {} ({}/{}), {} finished",
                track,
                state.index() + 1,
                playlist.tracks.len(),
                state.finished()
            );
            player.play_track(track)
        }
        Action::Announce(track) => {
            info!("Announcing clip {}", track);
            player.announce(track)
        }
        Action::Pause => {
            info!("Pause");
            player.pause()
        }
        Action::Resume => {
            info!("Resume");
            player.resume()
        }
    }
}

/// Consume whatever the module sent so the RX buffer never fills
fn drain_replies(player: &mut Player) {
    loop {
        match player.poll_reply() {
            Ok(Some(reply)) => trace!("Module reply: {:?}", reply),
            Ok(None) => break,
            Err(PlayerError::Frame(e)) => debug!("Discarding malformed reply: {:?}", e),
            Err(e) => {
                warn!("Reply polling failed: {:?}", e);
                break;
            }
        }
    }
}
