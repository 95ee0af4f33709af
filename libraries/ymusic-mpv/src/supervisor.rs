//! Engine process lifecycle
//!
//! `start` launches the engine, waits for its control socket, runs the
//! channel setup and spawns the decode loop. `quit` tears all of it down.
//! There is no other teardown path: the decode loop exits on its own once
//! the socket is shut down.

use crate::channel::ControlChannel;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::launcher::{EngineLauncher, EngineProcess, MpvLauncher};
use std::io;
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Owns the engine process and the control socket lifecycle
pub struct ProcessSupervisor<L = MpvLauncher> {
    config: EngineConfig,
    launcher: L,
    channel: ControlChannel,
    /// Serializes `start` and `quit` without holding the session lock while
    /// waiting for the socket
    lifecycle: Mutex<()>,
    decode_loop: Mutex<Option<JoinHandle<()>>>,
}

impl<L: EngineLauncher> ProcessSupervisor<L> {
    pub(crate) fn new(config: EngineConfig, launcher: L, channel: ControlChannel) -> Self {
        Self {
            config,
            launcher,
            channel,
            lifecycle: Mutex::new(()),
            decode_loop: Mutex::new(None),
        }
    }

    /// Launch the engine and connect to it
    ///
    /// A second call while started does nothing. On failure the spawned
    /// process is killed before returning.
    pub fn start(&self) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);

        if self.channel.session().lock().started {
            tracing::debug!("Engine already started");
            return Ok(());
        }

        let socket_path = self.config.socket_path.as_path();
        remove_socket(socket_path);

        let mut process = self.launcher.launch(socket_path).map_err(EngineError::Spawn)?;

        let Some(mut stream) = self.connect(socket_path) else {
            tracing::warn!(
                socket = %socket_path.display(),
                attempts = self.config.startup_attempts,
                "Engine control socket never became reachable"
            );
            abandon(process.as_mut(), socket_path);
            return Err(EngineError::Startup {
                socket_path: socket_path.to_path_buf(),
                attempts: self.config.startup_attempts,
            });
        };

        let volume = self.config.effective_initial_volume();
        let decode_loop = ControlChannel::setup(&mut stream, volume)
            .and_then(|()| stream.try_clone().map_err(EngineError::from))
            .and_then(|reader| {
                self.channel
                    .spawn_decode_loop(reader)
                    .map_err(EngineError::from)
            });
        let decode_loop = match decode_loop {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, "Engine setup failed");
                abandon(process.as_mut(), socket_path);
                return Err(e);
            }
        };

        // Published only once nothing else can fail
        {
            let mut session = self.channel.session().lock();
            session.writer = Some(stream);
            session.process = Some(process);
            session.started = true;
        }
        *self.decode_loop.lock().unwrap_or_else(PoisonError::into_inner) = Some(decode_loop);

        tracing::info!(socket = %socket_path.display(), volume, "Engine started");
        Ok(())
    }

    /// Close the socket, kill the engine and remove the socket file
    ///
    /// Safe to call repeatedly and before `start`.
    pub fn quit(&self) {
        let _lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);

        let was_started = {
            let mut session = self.channel.session().lock();
            if let Some(writer) = session.writer.take() {
                // Shutdown (not just drop) so the decode loop's blocked read returns
                if let Err(e) = writer.shutdown(Shutdown::Both) {
                    tracing::trace!(error = %e, "Control socket shutdown failed");
                }
            }
            if let Some(mut process) = session.process.take() {
                terminate(process.as_mut());
            }
            std::mem::replace(&mut session.started, false)
        };

        let handle = self.decode_loop.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::warn!("Decode loop panicked");
            }
        }

        remove_socket(&self.config.socket_path);

        if was_started {
            tracing::info!("Engine stopped");
        }
    }

    /// Whether the engine is running and connected
    pub fn is_started(&self) -> bool {
        self.channel.session().lock().started
    }

    /// Poll the socket with a fixed number of fixed-interval attempts
    fn connect(&self, socket_path: &Path) -> Option<UnixStream> {
        let attempts = self.config.startup_attempts;
        for attempt in 1..=attempts {
            match UnixStream::connect(socket_path) {
                Ok(stream) => {
                    tracing::debug!(attempt, "Connected to engine control socket");
                    return Some(stream);
                }
                Err(e) => tracing::trace!(attempt, error = %e, "Control socket not ready"),
            }
            if attempt < attempts {
                thread::sleep(self.config.startup_interval());
            }
        }
        None
    }
}

/// Undo a partial start: nothing has been published to the session yet
fn abandon(process: &mut dyn EngineProcess, socket_path: &Path) {
    terminate(process);
    remove_socket(socket_path);
}

fn terminate(process: &mut dyn EngineProcess) {
    if let Err(e) = process.kill() {
        tracing::debug!(error = %e, "Engine kill failed (already exited?)");
    }
    if let Err(e) = process.wait() {
        tracing::debug!(error = %e, "Engine wait failed");
    }
}

fn remove_socket(socket_path: &Path) {
    match std::fs::remove_file(socket_path) {
        Ok(()) => tracing::trace!(socket = %socket_path.display(), "Removed control socket"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::debug!(error = %e, "Could not remove control socket"),
    }
}
