//! Engine process launching
//!
//! [`ProcessSupervisor`](crate::ProcessSupervisor) starts the engine through
//! [`EngineLauncher`] so the process can be replaced in tests.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// A running engine process
pub trait EngineProcess: Send {
    /// Terminate the process
    fn kill(&mut self) -> io::Result<()>;

    /// Reap the process after [`kill`](Self::kill)
    fn wait(&mut self) -> io::Result<()>;
}

impl EngineProcess for Child {
    fn kill(&mut self) -> io::Result<()> {
        Child::kill(self)
    }

    fn wait(&mut self) -> io::Result<()> {
        Child::wait(self).map(|_| ())
    }
}

/// Starts an engine process listening on a control socket
pub trait EngineLauncher: Send + Sync {
    /// Launch the engine with its control socket at `socket_path`
    ///
    /// Must not wait for the socket to appear.
    fn launch(&self, socket_path: &Path) -> io::Result<Box<dyn EngineProcess>>;
}

/// Launches mpv headless, audio-only, without a terminal UI
#[derive(Debug, Clone)]
pub struct MpvLauncher {
    binary: PathBuf,
}

impl MpvLauncher {
    /// Launcher for the given mpv executable
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Fixed command-line arguments
    pub fn args(socket_path: &Path) -> Vec<String> {
        vec![
            "--idle".to_string(),
            "--no-video".to_string(),
            "--no-terminal".to_string(),
            format!("--input-ipc-server={}", socket_path.display()),
        ]
    }
}

impl Default for MpvLauncher {
    fn default() -> Self {
        Self::new("mpv")
    }
}

impl EngineLauncher for MpvLauncher {
    fn launch(&self, socket_path: &Path) -> io::Result<Box<dyn EngineProcess>> {
        let child = Command::new(&self.binary)
            .args(Self::args(socket_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        tracing::debug!(pid = child.id(), binary = %self.binary.display(), "Engine process spawned");
        Ok(Box::new(child))
    }
}
