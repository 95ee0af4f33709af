//! Shared session guarded by a single mutex

use crate::launcher::EngineProcess;
use crate::state::PlaybackState;
use std::os::unix::net::UnixStream;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Everything commands, the decode loop and teardown contend on
pub(crate) struct Session {
    /// Write half of the control socket
    pub(crate) writer: Option<UnixStream>,
    pub(crate) process: Option<Box<dyn EngineProcess>>,
    pub(crate) started: bool,
    pub(crate) state: PlaybackState,
}

/// Session shared between the supervisor, the channel and the decode loop
#[derive(Clone)]
pub(crate) struct SharedSession(Arc<Mutex<Session>>);

impl SharedSession {
    pub(crate) fn new(initial_volume: f64) -> Self {
        Self(Arc::new(Mutex::new(Session {
            writer: None,
            process: None,
            started: false,
            state: PlaybackState::with_volume(initial_volume),
        })))
    }

    /// Lock the session; a panic elsewhere never leaves it unusable
    pub(crate) fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
