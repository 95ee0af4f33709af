//! Player facade
//!
//! Bundles the supervisor, the control channel and the event stream that the
//! orchestrator owns for one session.

use crate::channel::ControlChannel;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::events::{EventBus, EventStream};
use crate::launcher::{EngineLauncher, MpvLauncher};
use crate::session::SharedSession;
use crate::state::PlaybackState;
use crate::supervisor::ProcessSupervisor;

/// Playback control core for one session
///
/// All methods take `&self`; the player can be shared across threads behind
/// an `Arc`.
pub struct Player<L = MpvLauncher> {
    supervisor: ProcessSupervisor<L>,
    channel: ControlChannel,
}

impl Player<MpvLauncher> {
    /// Player driving the configured mpv binary
    pub fn new(config: EngineConfig) -> (Self, EventStream) {
        let launcher = MpvLauncher::new(config.binary.clone());
        Self::with_launcher(config, launcher)
    }
}

impl<L: EngineLauncher> Player<L> {
    /// Player using a custom engine launcher
    pub fn with_launcher(config: EngineConfig, launcher: L) -> (Self, EventStream) {
        let (bus, events) = EventBus::bounded(config.event_capacity);
        let session = SharedSession::new(config.effective_initial_volume());
        let channel = ControlChannel::new(session, bus);
        let supervisor = ProcessSupervisor::new(config, launcher, channel.clone());

        (
            Self {
                supervisor,
                channel,
            },
            events,
        )
    }

    /// Launch and connect to the engine (no-op when already started)
    pub fn start(&self) -> Result<()> {
        self.supervisor.start()
    }

    /// Tear down the engine; safe to call repeatedly
    pub fn quit(&self) {
        self.supervisor.quit();
    }

    /// Whether the engine is running and connected
    pub fn is_started(&self) -> bool {
        self.supervisor.is_started()
    }

    /// Full copy of the current transport state
    pub fn state(&self) -> PlaybackState {
        self.channel.state()
    }

    /// Toggle pause
    pub fn toggle_pause(&self) -> Result<()> {
        self.channel.toggle_pause()
    }

    /// Seek by `seconds` relative to the current position
    pub fn seek(&self, seconds: f64) -> Result<()> {
        self.channel.seek(seconds)
    }

    /// Seek to an absolute position in seconds
    pub fn seek_absolute(&self, seconds: f64) -> Result<()> {
        self.channel.seek_absolute(seconds)
    }

    /// Set volume in percent (not clamped)
    pub fn set_volume(&self, percent: f64) -> Result<()> {
        self.channel.set_volume(percent)
    }

    /// Stop playback
    pub fn stop(&self) -> Result<()> {
        self.channel.stop()
    }

    /// Load and play a resolved media URL
    pub fn load_url(&self, url: &str) -> Result<()> {
        self.channel.load_url(url)
    }

    /// Events dropped because the consumer fell behind
    pub fn dropped_events(&self) -> u64 {
        self.channel.dropped_events()
    }

    /// The underlying control channel
    pub fn channel(&self) -> &ControlChannel {
        &self.channel
    }
}
