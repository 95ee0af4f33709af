/// Engine control errors
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine control errors
///
/// Malformed inbound lines and property values of the wrong type never
/// surface here; the decode loop discards them.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine executable could not be launched
    #[error("Failed to launch engine: {0}")]
    Spawn(#[source] io::Error),

    /// Engine never opened its control socket
    #[error(
        "Engine control socket {} not reachable after {attempts} attempts",
        .socket_path.display()
    )]
    Startup {
        /// Socket path that was polled
        socket_path: PathBuf,
        /// Number of connection attempts made
        attempts: u32,
    },

    /// Seek or volume argument is NaN or infinite (JSON cannot carry it)
    #[error("Invalid {argument}: {value} is not a finite number")]
    NonFinite {
        /// Which argument was rejected
        argument: &'static str,
        /// The rejected value
        value: f64,
    },

    /// Command issued before start or after quit
    #[error("Engine not connected")]
    NotConnected,

    /// Read or write failure on the control socket
    #[error("Control socket error: {0}")]
    Transport(#[from] io::Error),

    /// Command could not be serialized
    #[error("Failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),
}

impl EngineError {
    /// Whether this is a startup failure (spawn or unreachable socket)
    pub fn is_startup(&self) -> bool {
        matches!(self, EngineError::Spawn(_) | EngineError::Startup { .. })
    }
}
