//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use ymusic_mpv::EngineConfig;
use ymusic_playback::RepeatMode;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,
}

/// Queue modes applied when a session starts
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default)]
    pub shuffle: bool,

    #[serde(default)]
    pub repeat: RepeatMode,
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Later sources override earlier ones: the user config file, then
    /// `explicit` (which must exist), then `YMUSIC_` variables such as
    /// `YMUSIC_ENGINE__SOCKET_PATH`.
    pub fn load(explicit: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut settings = config::Config::builder();

        if let Some(path) = default_config_path() {
            if path.exists() {
                settings = settings.add_source(config::File::from(path));
            }
        }

        if let Some(path) = explicit {
            settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("YMUSIC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        settings.build()?.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            playback: default_playback(),
        }
    }
}

/// `~/.config/ymusic/config.toml` (platform equivalent elsewhere)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ymusic").join("config.toml"))
}

// Default values
fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        shuffle: false,
        repeat: RepeatMode::Off,
    }
}
