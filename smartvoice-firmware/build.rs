//! Build script for smartvoice-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates player.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use smartvoice_core::config::{parse_config, MAX_PLAYLIST};

/// Highest volume the module accepts
const MAX_VOLUME: i64 = 30;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate player.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=player.toml");

    let config_path = Path::new("player.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: player.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds player.toml from the crate directory.       ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read player.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in player.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_player(&config, &mut errors);
    validate_playlist(&config, &mut errors);

    // The firmware reads the file with the smartvoice-core parser, which
    // only handles a subset of TOML
    if let Err(e) = parse_config(&config_content) {
        errors.push(format!(
            "Firmware config parser rejected player.toml: {:?}",
            e
        ));
        errors.push("(single-line arrays, [player] and [playlist] only)".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: player.toml validation failed                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&errors.join("\n"))
        );
    }

    println!("cargo:warning=player.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate_player(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(player) = config.get("player") else {
        errors.push("Missing [player] section".to_string());
        return;
    };

    if let Some(baud) = player.get("baudrate").and_then(|v| v.as_integer()) {
        if baud != 9600 {
            println!(
                "cargo:warning=player.baudrate = {} - DFPlayer modules only speak 9600",
                baud
            );
        }
    }

    if let Some(volume) = player.get("volume") {
        match volume.as_integer() {
            Some(v) if (0..=MAX_VOLUME).contains(&v) => {}
            Some(v) if v > MAX_VOLUME && v <= 255 => println!(
                "cargo:warning=player.volume = {} will be clamped to {}",
                v, MAX_VOLUME
            ),
            _ => errors.push("player.volume must be an integer 0-30".to_string()),
        }
    }

    for key in ["boot_settle_ms", "query_wait_ms", "reply_timeout_ms"] {
        if let Some(value) = player.get(key) {
            match value.as_integer() {
                Some(v) if v >= 0 && v <= u32::MAX as i64 => {}
                _ => errors.push(format!("player.{} must be a non-negative integer", key)),
            }
        }
    }

    if let Some(value) = player.get("check_card") {
        if value.as_bool().is_none() {
            errors.push("player.check_card must be true or false".to_string());
        }
    }
}

fn validate_playlist(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(playlist) = config.get("playlist") else {
        println!("cargo:warning=No [playlist] section - firmware will only initialize the module");
        return;
    };

    match playlist.get("tracks").and_then(|v| v.as_array()) {
        Some(tracks) => {
            if tracks.len() > MAX_PLAYLIST {
                errors.push(format!(
                    "playlist.tracks has {} entries (max {})",
                    tracks.len(),
                    MAX_PLAYLIST
                ));
            }
            for (i, track) in tracks.iter().enumerate() {
                match track.as_integer() {
                    Some(t) if (1..=u16::MAX as i64).contains(&t) => {}
                    _ => errors.push(format!("playlist.tracks[{}] must be 1-65535", i)),
                }
            }
        }
        None => errors.push("playlist.tracks must be an array of track numbers".to_string()),
    }

    let announce_every = playlist
        .get("announce_every")
        .and_then(|v| v.as_integer())
        .unwrap_or(0);
    if !(0..=255).contains(&announce_every) {
        errors.push("playlist.announce_every must be 0-255".to_string());
    }
    if announce_every > 0 && playlist.get("announce_track").is_none() {
        errors.push("playlist.announce_every is set but announce_track is missing".to_string());
    }
}
