//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Volume used when none (or a non-positive one) is configured
pub const DEFAULT_VOLUME: f64 = 70.0;

/// Settings for launching and talking to the engine process
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Engine executable, resolved through `PATH` when relative
    #[serde(default = "default_binary")]
    pub binary: PathBuf,

    /// Control socket location; removed before launch and after quit
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Volume (percent) pushed to the engine right after connecting
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f64,

    /// How many times to try connecting to the control socket
    #[serde(default = "default_startup_attempts")]
    pub startup_attempts: u32,

    /// Pause between connection attempts
    #[serde(default = "default_startup_interval_ms")]
    pub startup_interval_ms: u64,

    /// Events buffered for the orchestrator before new ones are dropped
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl EngineConfig {
    /// Use a different control socket path
    #[must_use]
    pub fn with_socket_path(mut self, socket_path: impl Into<PathBuf>) -> Self {
        self.socket_path = socket_path.into();
        self
    }

    /// Delay between connection attempts
    pub fn startup_interval(&self) -> Duration {
        Duration::from_millis(self.startup_interval_ms)
    }

    /// Initial volume with non-positive or non-finite values replaced by the
    /// default
    pub fn effective_initial_volume(&self) -> f64 {
        if self.initial_volume > 0.0 && self.initial_volume.is_finite() {
            self.initial_volume
        } else {
            DEFAULT_VOLUME
        }
    }
}

// Default values
fn default_binary() -> PathBuf {
    PathBuf::from("mpv")
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/tmp/ymusic-mpv.sock")
}

fn default_initial_volume() -> f64 {
    DEFAULT_VOLUME
}

fn default_startup_attempts() -> u32 {
    50
}

fn default_startup_interval_ms() -> u64 {
    100
}

fn default_event_capacity() -> usize {
    64
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            socket_path: default_socket_path(),
            initial_volume: default_initial_volume(),
            startup_attempts: default_startup_attempts(),
            startup_interval_ms: default_startup_interval_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}
