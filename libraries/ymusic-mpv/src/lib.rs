//! mpv engine control
//!
//! Drives a headless mpv process over its JSON IPC socket.
//!
//! # Features
//!
//! - Process supervision: launch, bounded wait for the control socket, teardown
//! - Fire-and-forget commands (pause, seek, volume, load, stop)
//! - One decode thread applying property notifications to a shared state
//! - Bounded, drop-newest event delivery to a single consumer
//!
//! # Example
//!
//! ```no_run
//! use ymusic_mpv::{ControlEvent, EndFileReason, EngineConfig, Player};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (player, events) = Player::new(EngineConfig::default());
//! player.start()?;
//!
//! player.load_url("https://example.com/track.mp3")?;
//! player.set_volume(50.0)?;
//!
//! while let Some(event) = events.recv() {
//!     if let ControlEvent::EndOfFile { reason: EndFileReason::Eof } = event {
//!         break;
//!     }
//! }
//!
//! println!("{:?}", player.state());
//! player.quit();
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod channel;
pub mod config;
mod error;
mod events;
mod launcher;
mod player;
pub mod protocol;
mod session;
mod state;
mod supervisor;

pub use channel::ControlChannel;
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use events::{ControlEvent, EventBus, EventStream};
pub use launcher::{EngineLauncher, EngineProcess, MpvLauncher};
pub use player::Player;
pub use protocol::{EndFileReason, Property, PropertyUpdate};
pub use state::PlaybackState;
pub use supervisor::ProcessSupervisor;
