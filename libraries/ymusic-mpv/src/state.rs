//! Transport state snapshot

use crate::protocol::PropertyUpdate;
use serde::Serialize;

/// Engine transport state as last reported by the engine
///
/// Handed out by value only: every read is a full copy taken under the
/// session lock.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaybackState {
    /// Not paused (inverse of the engine's `pause` property)
    pub playing: bool,

    /// Position in the current file
    pub position_seconds: f64,

    /// Duration of the current file
    pub duration_seconds: f64,

    /// Engine volume, percent
    pub volume_percent: f64,

    /// No file loaded
    pub idle: bool,

    /// Last URL handed to `load_url`, set before the engine confirms it
    pub loaded_url: String,
}

impl PlaybackState {
    pub(crate) fn with_volume(volume_percent: f64) -> Self {
        Self {
            volume_percent,
            ..Self::default()
        }
    }

    /// Apply one property notification
    pub(crate) fn apply(&mut self, update: PropertyUpdate) {
        match update {
            PropertyUpdate::TimePos(seconds) => self.position_seconds = seconds,
            PropertyUpdate::Duration(seconds) => self.duration_seconds = seconds,
            PropertyUpdate::Pause(paused) => self.playing = !paused,
            PropertyUpdate::Volume(percent) => self.volume_percent = percent,
            PropertyUpdate::IdleActive(idle) => self.idle = idle,
        }
    }

    /// Position as a fraction of duration, 0.0 when duration is unknown
    pub fn progress(&self) -> f64 {
        if self.duration_seconds > 0.0 {
            (self.position_seconds / self.duration_seconds).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
