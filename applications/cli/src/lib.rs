//! ymusic terminal client
//!
//! Configuration, command parsing and the session orchestrator behind the
//! `ymusic` binary. Playback itself lives in `ymusic-mpv`; queue navigation
//! in `ymusic-playback`.

pub mod commands;
pub mod config;
pub mod orchestrator;

pub use commands::{ParseCommandError, UserCommand};
pub use config::AppConfig;
pub use orchestrator::{DirectResolver, Orchestrator, Outcome, PlayerControl, StreamResolver};
