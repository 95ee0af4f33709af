//! Session orchestration
//!
//! Glue between the queue and the engine. User commands and end-of-file
//! events move the queue; whatever track the queue lands on gets loaded.

use crate::commands::{UserCommand, HELP};
use anyhow::Context;
use std::time::Duration;
use ymusic_core::Track;
use ymusic_mpv::{ControlEvent, EndFileReason, EngineLauncher, PlaybackState, Player};
use ymusic_playback::PlaybackQueue;

/// Volume change per up/down command, in percent
pub const VOLUME_STEP: f64 = 5.0;

/// Relative seek distance
pub const SEEK_STEP_SECONDS: f64 = 10.0;

/// How often the status line is refreshed from polled state
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Engine operations the orchestrator needs
pub trait PlayerControl {
    fn state(&self) -> PlaybackState;
    fn toggle_pause(&self) -> ymusic_mpv::Result<()>;
    fn seek(&self, seconds: f64) -> ymusic_mpv::Result<()>;
    fn seek_absolute(&self, seconds: f64) -> ymusic_mpv::Result<()>;
    fn set_volume(&self, percent: f64) -> ymusic_mpv::Result<()>;
    fn stop(&self) -> ymusic_mpv::Result<()>;
    fn load_url(&self, url: &str) -> ymusic_mpv::Result<()>;
    fn quit(&self);
}

impl<L: EngineLauncher> PlayerControl for Player<L> {
    fn state(&self) -> PlaybackState {
        Player::state(self)
    }

    fn toggle_pause(&self) -> ymusic_mpv::Result<()> {
        Player::toggle_pause(self)
    }

    fn seek(&self, seconds: f64) -> ymusic_mpv::Result<()> {
        Player::seek(self, seconds)
    }

    fn seek_absolute(&self, seconds: f64) -> ymusic_mpv::Result<()> {
        Player::seek_absolute(self, seconds)
    }

    fn set_volume(&self, percent: f64) -> ymusic_mpv::Result<()> {
        Player::set_volume(self, percent)
    }

    fn stop(&self) -> ymusic_mpv::Result<()> {
        Player::stop(self)
    }

    fn load_url(&self, url: &str) -> ymusic_mpv::Result<()> {
        Player::load_url(self, url)
    }

    fn quit(&self) {
        Player::quit(self);
    }
}

/// Turns a queued track into something the engine can open
pub trait StreamResolver {
    fn resolve(&self, track: &Track) -> anyhow::Result<String>;
}

/// Uses the track id as the media location (local paths and direct URLs)
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectResolver;

impl StreamResolver for DirectResolver {
    fn resolve(&self, track: &Track) -> anyhow::Result<String> {
        Ok(track.id.to_string())
    }
}

/// Build a queue entry for a file path or URL
///
/// The title is the last path segment without its extension.
pub fn track_from_location(location: &str) -> Track {
    let segment = location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(location);
    let title = match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => segment,
    };
    Track::new(location, title)
}

/// What the caller should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// Text to show the user
    Show(String),
    Quit,
}

/// Drives one playback session
pub struct Orchestrator<P, R = DirectResolver> {
    player: P,
    queue: PlaybackQueue,
    resolver: R,
    last_status: Option<String>,
}

impl<P: PlayerControl, R: StreamResolver> Orchestrator<P, R> {
    pub fn new(player: P, queue: PlaybackQueue, resolver: R) -> Self {
        Self {
            player,
            queue,
            resolver,
            last_status: None,
        }
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn queue(&self) -> &PlaybackQueue {
        &self.queue
    }

    /// Load the track under the queue cursor
    pub fn play_current(&mut self) -> anyhow::Result<()> {
        let Some(track) = self.queue.current() else {
            tracing::info!("Queue is empty");
            return Ok(());
        };

        let url = self
            .resolver
            .resolve(track)
            .with_context(|| format!("Failed to resolve track {}", track.id))?;

        tracing::info!(title = %track.title, artist = %track.artist_name(), "Now playing");
        self.player.load_url(&url)?;
        Ok(())
    }

    pub fn handle_command(&mut self, command: UserCommand) -> anyhow::Result<Outcome> {
        match command {
            UserCommand::Next => self.advance()?,
            UserCommand::Prev => {
                if self.queue.prev().is_some() {
                    self.play_current()?;
                }
            }
            UserCommand::TogglePause => self.player.toggle_pause()?,
            UserCommand::SeekForward => self.player.seek(SEEK_STEP_SECONDS)?,
            UserCommand::SeekBackward => self.player.seek(-SEEK_STEP_SECONDS)?,
            UserCommand::SeekTo(fraction) => self.seek_to_fraction(fraction)?,
            UserCommand::VolumeUp => self.adjust_volume(VOLUME_STEP)?,
            UserCommand::VolumeDown => self.adjust_volume(-VOLUME_STEP)?,
            UserCommand::ToggleShuffle => {
                self.queue.toggle_shuffle();
                tracing::info!(shuffle = self.queue.is_shuffled(), "Shuffle toggled");
            }
            UserCommand::CycleRepeat => {
                self.queue.cycle_repeat();
                tracing::info!(repeat = %self.queue.repeat_mode(), "Repeat mode changed");
            }
            UserCommand::Stop => self.player.stop()?,
            UserCommand::Status => return Ok(Outcome::Show(self.status_line())),
            UserCommand::Queue => return Ok(Outcome::Show(self.queue_listing())),
            UserCommand::Help => return Ok(Outcome::Show(HELP.to_string())),
            UserCommand::Quit => return Ok(Outcome::Quit),
        }
        Ok(Outcome::Continue)
    }

    /// React to an engine notification
    ///
    /// Only a natural end of file advances the queue. Replacing the file
    /// (reason `stop`) must not, or a manual skip would skip twice.
    pub fn handle_event(&mut self, event: &ControlEvent) -> anyhow::Result<()> {
        match event {
            ControlEvent::EndOfFile {
                reason: EndFileReason::Eof,
            } => self.advance(),
            ControlEvent::EndOfFile { reason } => {
                tracing::debug!(?reason, "Playback ended");
                Ok(())
            }
            ControlEvent::Idle
            | ControlEvent::PropertyChange(_)
            | ControlEvent::UntypedPropertyChange { .. } => Ok(()),
        }
    }

    /// Status line, only when it differs from the previous poll
    pub fn poll_status(&mut self) -> Option<String> {
        let status = self.status_line();
        if self.last_status.as_ref() == Some(&status) {
            return None;
        }
        self.last_status = Some(status.clone());
        Some(status)
    }

    pub fn status_line(&self) -> String {
        let state = self.player.state();
        let icon = if state.idle {
            "[stopped]"
        } else if state.playing {
            "[playing]"
        } else {
            "[paused]"
        };
        let title = self.queue.current().map_or_else(
            || "-".to_string(),
            |track| format!("{} - {}", track.artist_name(), track.title),
        );
        let shuffle = if self.queue.is_shuffled() { " [S]" } else { "" };

        format!(
            "{} {}  {}/{}  vol {:.0}%  {}{}",
            icon,
            title,
            format_clock(state.position_seconds),
            format_clock(state.duration_seconds),
            state.volume_percent,
            self.queue.repeat_mode().label(),
            shuffle
        )
    }

    pub fn queue_listing(&self) -> String {
        let upcoming = self.queue.upcoming();
        if upcoming.is_empty() {
            return "(end of queue)".to_string();
        }
        upcoming
            .iter()
            .enumerate()
            .map(|(i, track)| format!("{:>3}. {} - {}", i + 1, track.artist_name(), track.title))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Stop the engine for good
    pub fn shutdown(&self) {
        self.player.quit();
    }

    fn advance(&mut self) -> anyhow::Result<()> {
        if self.queue.next().is_some() {
            self.play_current()
        } else {
            tracing::info!("End of queue");
            Ok(())
        }
    }

    fn seek_to_fraction(&self, fraction: f64) -> anyhow::Result<()> {
        let duration = self.player.state().duration_seconds;
        if duration > 0.0 {
            self.player.seek_absolute(fraction.clamp(0.0, 1.0) * duration)?;
        } else {
            tracing::debug!("Duration unknown, ignoring seek");
        }
        Ok(())
    }

    /// Volume range policy lives here, not in the engine channel
    fn adjust_volume(&self, delta: f64) -> anyhow::Result<()> {
        let current = self.player.state().volume_percent;
        let target = (current + delta).clamp(0.0, 100.0);
        self.player.set_volume(target)?;
        Ok(())
    }
}

/// `m:ss`, with anything negative or non-finite shown as `0:00`
fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
