//! mpv JSON IPC codec
//!
//! One JSON object per line in both directions.
//!
//! Outbound: `{"command": [verb, arg...], "request_id": n}`.
//! Inbound: `property-change`, `end-file` and `idle` events are recognized;
//! replies and every other event are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;

/// Request IDs at and above this value are reserved for property
/// observation; ordinary commands count up from 1.
pub const RESERVED_REQUEST_ID_BASE: i64 = 1 << 40;

/// Engine properties observed for the lifetime of the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// `time-pos`, seconds (number)
    TimePos,
    /// `duration`, seconds (number)
    Duration,
    /// `pause` (bool)
    Pause,
    /// `volume`, percent (number)
    Volume,
    /// `idle-active` (bool)
    IdleActive,
}

impl Property {
    /// Observation table, in the order observations are requested
    pub const ALL: [Property; 5] = [
        Property::TimePos,
        Property::Duration,
        Property::Pause,
        Property::Volume,
        Property::IdleActive,
    ];

    /// Name on the wire
    pub fn name(self) -> &'static str {
        match self {
            Property::TimePos => "time-pos",
            Property::Duration => "duration",
            Property::Pause => "pause",
            Property::Volume => "volume",
            Property::IdleActive => "idle-active",
        }
    }

    /// Look up a property by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Observer ID passed to `observe_property`
    pub fn observe_id(self) -> i64 {
        match self {
            Property::TimePos => 1,
            Property::Duration => 2,
            Property::Pause => 3,
            Property::Volume => 4,
            Property::IdleActive => 5,
        }
    }

    /// Request ID used for the `observe_property` command itself
    pub fn observe_request_id(self) -> i64 {
        RESERVED_REQUEST_ID_BASE + self.observe_id()
    }
}

/// Typed value of an observed property
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "name", content = "value", rename_all = "kebab-case")]
pub enum PropertyUpdate {
    TimePos(f64),
    Duration(f64),
    Pause(bool),
    Volume(f64),
    IdleActive(bool),
}

impl PropertyUpdate {
    /// Decode `data` for the named property
    ///
    /// Returns `None` for names outside the observation table and for values
    /// whose JSON type does not match the property (numbers for
    /// `time-pos`/`duration`/`volume`, booleans for `pause`/`idle-active`).
    pub fn decode(name: &str, data: &Value) -> Option<Self> {
        let update = match Property::from_name(name)? {
            Property::TimePos => PropertyUpdate::TimePos(data.as_f64()?),
            Property::Duration => PropertyUpdate::Duration(data.as_f64()?),
            Property::Pause => PropertyUpdate::Pause(data.as_bool()?),
            Property::Volume => PropertyUpdate::Volume(data.as_f64()?),
            Property::IdleActive => PropertyUpdate::IdleActive(data.as_bool()?),
        };
        Some(update)
    }

    /// Property this update belongs to
    pub fn property(self) -> Property {
        match self {
            PropertyUpdate::TimePos(_) => Property::TimePos,
            PropertyUpdate::Duration(_) => Property::Duration,
            PropertyUpdate::Pause(_) => Property::Pause,
            PropertyUpdate::Volume(_) => Property::Volume,
            PropertyUpdate::IdleActive(_) => Property::IdleActive,
        }
    }
}

/// Why the engine stopped playing a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndFileReason {
    /// Reached the end of the file
    Eof,
    /// Playback was stopped or replaced by a new `loadfile`
    Stop,
    /// Engine is shutting down
    Quit,
    /// File could not be played
    Error,
    /// File was a redirect (playlist, etc.)
    Redirect,
    /// Any other reason string
    Other(String),
}

impl From<&str> for EndFileReason {
    fn from(reason: &str) -> Self {
        match reason {
            "eof" => EndFileReason::Eof,
            "stop" => EndFileReason::Stop,
            "quit" => EndFileReason::Quit,
            "error" => EndFileReason::Error,
            "redirect" => EndFileReason::Redirect,
            other => EndFileReason::Other(other.to_string()),
        }
    }
}

/// Inbound message shapes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum InboundMessage {
    PropertyChange {
        name: String,
        #[serde(default)]
        data: Value,
    },
    EndFile {
        #[serde(default)]
        reason: String,
    },
    Idle,
    /// Any other event name
    #[serde(other)]
    Other,
}

/// Decode one line from the control socket
///
/// Returns `None` for lines that are not JSON objects of a recognized shape,
/// including command replies (which carry no `event` field).
pub fn decode_line(line: &[u8]) -> Option<InboundMessage> {
    let value: Value = match serde_json::from_slice(line) {
        Ok(value) => value,
        Err(e) => {
            tracing::trace!(error = %e, "Skipping undecodable line");
            return None;
        }
    };

    match InboundMessage::deserialize(value) {
        Ok(InboundMessage::Other) => None,
        Ok(message) => Some(message),
        Err(_) => None,
    }
}

/// Seek reference point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    Relative,
    Absolute,
}

impl SeekMode {
    fn as_str(self) -> &'static str {
        match self {
            SeekMode::Relative => "relative",
            SeekMode::Absolute => "absolute",
        }
    }
}

/// Outbound commands
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ObserveProperty(Property),
    SetVolume(f64),
    LoadFile(String),
    CyclePause,
    Seek { seconds: f64, mode: SeekMode },
    Stop,
}

impl Command {
    /// The `command` array
    pub fn args(&self) -> Vec<Value> {
        match self {
            Command::ObserveProperty(property) => vec![
                "observe_property".into(),
                property.observe_id().into(),
                property.name().into(),
            ],
            Command::SetVolume(volume) => {
                vec!["set_property".into(), "volume".into(), (*volume).into()]
            }
            Command::LoadFile(url) => vec!["loadfile".into(), url.as_str().into()],
            Command::CyclePause => vec!["cycle".into(), "pause".into()],
            Command::Seek { seconds, mode } => {
                vec!["seek".into(), (*seconds).into(), mode.as_str().into()]
            }
            Command::Stop => vec!["stop".into()],
        }
    }
}

#[derive(Serialize)]
struct CommandMessage {
    command: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<i64>,
}

/// Serialize a command as one newline-terminated line
pub fn encode(command: &Command, request_id: Option<i64>) -> serde_json::Result<Vec<u8>> {
    let message = CommandMessage {
        command: command.args(),
        request_id,
    };
    let mut bytes = serde_json::to_vec(&message)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Encode and write a command in one `write_all`
pub(crate) fn write_command<W: Write>(
    writer: &mut W,
    command: &Command,
    request_id: Option<i64>,
) -> crate::Result<()> {
    let bytes = encode(command, request_id)?;
    writer.write_all(&bytes)?;
    Ok(())
}
