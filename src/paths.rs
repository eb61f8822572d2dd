//! Config file location
//!
//! Priority: `CAHBOT_CONFIG` > `$XDG_CONFIG_HOME/cahbot/config.toml` >
//! `~/.config/cahbot/config.toml` > `./config.toml`

use std::path::PathBuf;

/// Get the XDG config directory for cahbot
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("cahbot");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config/cahbot");
    }

    // Last resort: current directory
    PathBuf::from(".")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    std::env::var("CAHBOT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_dir().join("config.toml"))
}
