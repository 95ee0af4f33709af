//! Control channel
//!
//! Two write paths:
//! - [`ControlChannel::setup`]: writes straight to the freshly connected
//!   socket before the session is published and before the decode loop
//!   exists, so it takes no lock.
//! - Steady-state commands: lock the session, write one line, return. They
//!   never wait for the engine's reply.
//!
//! A single background thread reads the socket, applies property changes to
//! the shared [`PlaybackState`] and publishes events.

use crate::error::{EngineError, Result};
use crate::events::{ControlEvent, EventBus};
use crate::protocol::{self, Command, InboundMessage, Property, PropertyUpdate, SeekMode};
use crate::session::SharedSession;
use crate::state::PlaybackState;
use std::io::{self, BufRead, BufReader, Read};
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Command and state access to a running engine
#[derive(Clone)]
pub struct ControlChannel {
    session: SharedSession,
    bus: EventBus,
    /// Correlation IDs for ordinary commands; replies are never awaited
    request_ids: Arc<AtomicI64>,
}

impl ControlChannel {
    pub(crate) fn new(session: SharedSession, bus: EventBus) -> Self {
        Self {
            session,
            bus,
            request_ids: Arc::new(AtomicI64::new(1)),
        }
    }

    pub(crate) fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Request property observations and push the initial volume
    ///
    /// Runs once per connection, before the decode loop starts and before
    /// the stream is visible to any other caller.
    pub(crate) fn setup(stream: &mut UnixStream, initial_volume: f64) -> Result<()> {
        for property in Property::ALL {
            protocol::write_command(
                stream,
                &Command::ObserveProperty(property),
                Some(property.observe_request_id()),
            )?;
        }
        protocol::write_command(stream, &Command::SetVolume(initial_volume), None)?;
        Ok(())
    }

    /// Start the decode loop on its own thread
    pub(crate) fn spawn_decode_loop(&self, reader: UnixStream) -> io::Result<JoinHandle<()>> {
        let session = self.session.clone();
        let bus = self.bus.clone();
        thread::Builder::new()
            .name("mpv-decode".to_string())
            .spawn(move || run_decode_loop(reader, &session, &bus))
    }

    /// Full copy of the current state
    pub fn state(&self) -> PlaybackState {
        self.session.lock().state.clone()
    }

    /// Toggle pause
    pub fn toggle_pause(&self) -> Result<()> {
        self.send(&Command::CyclePause)
    }

    /// Seek relative to the current position
    pub fn seek(&self, seconds: f64) -> Result<()> {
        self.send(&Command::Seek {
            seconds: finite("seek offset", seconds)?,
            mode: SeekMode::Relative,
        })
    }

    /// Seek to an absolute position
    pub fn seek_absolute(&self, seconds: f64) -> Result<()> {
        self.send(&Command::Seek {
            seconds: finite("seek position", seconds)?,
            mode: SeekMode::Absolute,
        })
    }

    /// Set engine volume in percent
    ///
    /// Passed through unclamped; range policy belongs to the caller. NaN and
    /// infinities are rejected.
    pub fn set_volume(&self, percent: f64) -> Result<()> {
        self.send(&Command::SetVolume(finite("volume", percent)?))
    }

    /// Stop playback and unload the current file
    pub fn stop(&self) -> Result<()> {
        self.send(&Command::Stop)
    }

    /// Replace the current file with `url`
    ///
    /// `loaded_url` is updated in the same critical section as the write, so
    /// readers see the pending URL before the engine reports anything.
    pub fn load_url(&self, url: &str) -> Result<()> {
        let mut session = self.session.lock();
        session.state.loaded_url = url.to_string();
        let writer = session.writer.as_mut().ok_or(EngineError::NotConnected)?;
        let command = Command::LoadFile(url.to_string());
        protocol::write_command(writer, &command, Some(self.next_request_id()))?;
        tracing::debug!(url, "Loading file");
        Ok(())
    }

    /// Number of events the bus has dropped
    pub fn dropped_events(&self) -> u64 {
        self.bus.dropped()
    }

    fn send(&self, command: &Command) -> Result<()> {
        let mut session = self.session.lock();
        let writer = session.writer.as_mut().ok_or(EngineError::NotConnected)?;
        protocol::write_command(writer, command, Some(self.next_request_id()))?;
        tracing::trace!(?command, "Command sent");
        Ok(())
    }

    fn next_request_id(&self) -> i64 {
        self.request_ids.fetch_add(1, Ordering::Relaxed)
    }
}

fn finite(argument: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::NonFinite { argument, value })
    }
}

/// Read lines until the socket errors or reaches EOF
///
/// Lines are handled strictly in arrival order. Undecodable lines are
/// skipped. Property changes with an unobserved name or a mistyped value
/// leave the state alone but are still published.
fn run_decode_loop<R: Read>(reader: R, session: &SharedSession, bus: &EventBus) {
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => {
                tracing::debug!("Control socket closed");
                break;
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!(error = %e, "Control socket read failed");
                break;
            }
        }

        let Some(message) = protocol::decode_line(&line) else {
            continue;
        };

        let event = match message {
            InboundMessage::PropertyChange { name, data } => {
                match PropertyUpdate::decode(&name, &data) {
                    Some(update) => {
                        // Applied before publishing so an event consumer that
                        // reads state sees at least this update
                        session.lock().state.apply(update);
                        ControlEvent::PropertyChange(update)
                    }
                    None => {
                        tracing::trace!(name, %data, "Property not applied to state");
                        ControlEvent::UntypedPropertyChange { name, data }
                    }
                }
            }
            InboundMessage::EndFile { reason } => ControlEvent::EndOfFile {
                reason: reason.as_str().into(),
            },
            InboundMessage::Idle => ControlEvent::Idle,
            InboundMessage::Other => continue,
        };

        bus.publish(event);
    }

    tracing::debug!("Decode loop exited");
}
