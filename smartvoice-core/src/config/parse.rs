//! Simple TOML parser for player configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `player.toml`. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - Single-line integer arrays: tracks = [1, 2, 3]
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings or arrays
//! - Inline tables
//! - Dotted keys

use heapless::Vec;

use super::types::{PlayerConfig, PlaylistConfig, SmartVoiceConfig, MAX_PLAYLIST};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Player,
    Playlist,
}

/// Parse TOML configuration into SmartVoiceConfig
///
/// Keys the parser does not know are ignored so that newer config files
/// still load.
pub fn parse_config(input: &str) -> Result<SmartVoiceConfig, ConfigError> {
    let mut config = SmartVoiceConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && !line.contains('=') {
            let header = line.split('#').next().unwrap_or(line).trim();
            if !header.ends_with(']') {
                return Err(ConfigError::InvalidSection);
            }
            section = parse_section_header(&header[1..header.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            match section {
                Section::Player => apply_player(&mut config.player, key, value)?,
                Section::Playlist => apply_playlist(&mut config.playlist, key, value)?,
                Section::Root => {} // No root-level keys
            }
        }
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ConfigError> {
    match header.trim() {
        "player" => Ok(Section::Player),
        "playlist" => Ok(Section::Playlist),
        _ => Err(ConfigError::InvalidSection),
    }
}

fn apply_player(player: &mut PlayerConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "baudrate" => player.baudrate = parse_int(value)?,
        "volume" => player.volume = parse_int(value)?,
        "boot_settle_ms" => player.boot_settle_ms = parse_int(value)?,
        "query_wait_ms" => player.query_wait_ms = parse_int(value)?,
        "reply_timeout_ms" => player.reply_timeout_ms = parse_int(value)?,
        "check_card" => player.check_card = parse_bool(value)?,
        _ => {} // Ignore unknown keys
    }
    Ok(())
}

fn apply_playlist(
    playlist: &mut PlaylistConfig,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    match key {
        "tracks" => playlist.tracks = parse_int_array(value)?,
        "announce_track" => playlist.announce_track = Some(parse_int(value)?),
        "announce_every" => playlist.announce_every = parse_int(value)?,
        "poll_interval_ms" => playlist.poll_interval_ms = parse_int(value)?,
        _ => {}
    }
    Ok(())
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse an integer value, accepting a quoted form and `_` separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    let value = value.trim_matches('"');
    let mut digits: heapless::String<16> = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ConfigError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ConfigError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue),
    }
}

/// Parse "[1, 2, 3]"
fn parse_int_array(value: &str) -> Result<Vec<u16, MAX_PLAYLIST>, ConfigError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ConfigError::InvalidValue)?;

    let mut items = Vec::new();
    for item in inner.split(',') {
        let item = item.trim();
        // Trailing comma
        if item.is_empty() {
            continue;
        }
        items
            .push(parse_int(item)?)
            .map_err(|_| ConfigError::TooManyItems)?;
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("volume = 25"), Some(("volume", "25")));
        assert_eq!(
            parse_key_value("volume = 25 # loud"),
            Some(("volume", "25"))
        );
        assert_eq!(parse_key_value("volume ="), None);
        assert_eq!(parse_key_value("no equals"), None);
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int::<u32>("9_600"), Ok(9600));
        assert_eq!(parse_int::<u8>("\"12\""), Ok(12));
        assert_eq!(parse_int::<u8>("300"), Err(ConfigError::InvalidValue));
        assert_eq!(parse_int::<u8>("abc"), Err(ConfigError::InvalidValue));
    }

    #[test]
    fn test_parse_int_array() {
        let tracks = parse_int_array("[1, 2, 3,]").unwrap();
        assert_eq!(tracks.as_slice(), &[1, 2, 3]);

        assert!(parse_int_array("[]").unwrap().is_empty());
        assert_eq!(parse_int_array("1, 2"), Err(ConfigError::InvalidValue));

        let too_many = "[1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,16,17]";
        assert_eq!(parse_int_array(too_many), Err(ConfigError::TooManyItems));
    }

    #[test]
    fn test_parse_section_header() {
        assert_eq!(parse_section_header("player"), Ok(Section::Player));
        assert_eq!(parse_section_header(" playlist "), Ok(Section::Playlist));
        assert_eq!(
            parse_section_header("display"),
            Err(ConfigError::InvalidSection)
        );
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
# Kitchen clock
[player]
volume = 25
boot_settle_ms = 800
check_card = false
future_option = 1

[playlist]
tracks = [1, 2, 5] # morning set
announce_track = 100
announce_every = 2
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.player.volume, 25);
        assert_eq!(config.player.boot_settle_ms, 800);
        assert_eq!(config.player.query_wait_ms, 50);
        assert!(!config.player.check_card);
        assert_eq!(config.playlist.tracks.as_slice(), &[1, 2, 5]);
        assert_eq!(config.playlist.announce_track, Some(100));
        assert_eq!(config.playlist.announce_every, 2);
        assert_eq!(config.playlist.poll_interval_ms, 1000);
    }

    #[test]
    fn test_parse_empty_config_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, SmartVoiceConfig::default());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_config("[speaker]\nvolume = 3"),
            Err(ConfigError::InvalidSection)
        );
        assert_eq!(
            parse_config("[player]\nvolume = 10\n[extra]\nfoo = 1\n"),
            Err(ConfigError::InvalidSection)
        );
        assert_eq!(
            parse_config("[player]\ncheck_card = yes"),
            Err(ConfigError::InvalidValue)
        );
    }

    #[test]
    fn test_multiline_array_rejected() {
        // Valid TOML, outside the supported subset
        assert_eq!(
            parse_config("[playlist]\ntracks = [\n 1,\n 2,\n]\n"),
            Err(ConfigError::InvalidValue)
        );
    }

    #[test]
    fn test_firmware_config_parses() {
        let config = parse_config(include_str!("../../../smartvoice-firmware/player.toml")).unwrap();
        assert_eq!(config.player.volume, 20);
        assert!(config.player.check_card);
        assert_eq!(config.playlist.tracks.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(config.playlist.announce_track, Some(100));
        assert_eq!(config.playlist.announce_every, 2);
        assert_eq!(config.playlist.poll_interval_ms, 500);
    }
}
