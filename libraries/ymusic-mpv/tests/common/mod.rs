//! In-process stand-in for the mpv engine
//!
//! `FakeEngine` binds a Unix listener at the requested socket path when
//! launched, records every JSON line the client writes, and lets a test push
//! lines back to the client.

#![allow(dead_code)]

use serde_json::Value;
use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use ymusic_mpv::{EngineConfig, EngineLauncher, EngineProcess};

/// Engine config pointing at `socket_path` with a short retry policy
pub fn test_config(socket_path: &Path) -> EngineConfig {
    let mut config = EngineConfig::default().with_socket_path(socket_path);
    config.startup_attempts = 20;
    config.startup_interval_ms = 10;
    config
}

/// Poll `condition` until it holds or `timeout` elapses
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

struct Shared {
    mode: Mutex<Mode>,
    launches: AtomicUsize,
    kills: AtomicUsize,
    malformed: AtomicUsize,
    received: Mutex<Vec<Value>>,
    peer: Mutex<Option<UnixStream>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Listen,
    NeverListen,
    /// Leaves a regular file where the socket should be
    PlainFile,
    FailSpawn,
}

/// Launcher whose "process" is a listener thread
#[derive(Clone)]
pub struct FakeEngine {
    shared: Arc<Shared>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::with_mode(Mode::Listen)
    }

    /// Launches successfully but never opens the socket
    pub fn unreachable() -> Self {
        Self::with_mode(Mode::NeverListen)
    }

    /// Launches, then leaves a file nobody can connect to at the socket path
    pub fn not_a_socket() -> Self {
        Self::with_mode(Mode::PlainFile)
    }

    /// Fails to launch at all
    pub fn broken() -> Self {
        Self::with_mode(Mode::FailSpawn)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            shared: Arc::new(Shared {
                mode: Mutex::new(mode),
                launches: AtomicUsize::new(0),
                kills: AtomicUsize::new(0),
                malformed: AtomicUsize::new(0),
                received: Mutex::new(Vec::new()),
                peer: Mutex::new(None),
            }),
        }
    }

    /// Behave normally from the next launch on
    pub fn heal(&self) {
        *self.shared.mode.lock().unwrap() = Mode::Listen;
    }

    pub fn launches(&self) -> usize {
        self.shared.launches.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.shared.kills.load(Ordering::SeqCst)
    }

    /// Lines that were not a single JSON object
    pub fn malformed(&self) -> usize {
        self.shared.malformed.load(Ordering::SeqCst)
    }

    /// Every JSON line received so far
    pub fn received(&self) -> Vec<Value> {
        self.shared.received.lock().unwrap().clone()
    }

    /// The `command` arrays received so far
    pub fn commands(&self) -> Vec<Value> {
        self.received()
            .into_iter()
            .map(|message| message["command"].clone())
            .collect()
    }

    /// Wait for at least `count` received lines
    pub fn wait_for_lines(&self, count: usize) -> Vec<Value> {
        assert!(
            wait_until(Duration::from_secs(2), || self.received().len() >= count),
            "expected {} lines, got {:?}",
            count,
            self.received()
        );
        self.received()
    }

    /// Write one line to the connected client
    pub fn send(&self, line: &str) {
        assert!(
            wait_until(Duration::from_secs(2), || self
                .shared
                .peer
                .lock()
                .unwrap()
                .is_some()),
            "client never connected"
        );
        let mut peer = self.shared.peer.lock().unwrap();
        let stream = peer.as_mut().unwrap();
        stream.write_all(line.as_bytes()).unwrap();
        stream.write_all(b"\n").unwrap();
    }
}

impl EngineLauncher for FakeEngine {
    fn launch(&self, socket_path: &Path) -> io::Result<Box<dyn EngineProcess>> {
        let mode = *self.shared.mode.lock().unwrap();
        if mode == Mode::FailSpawn {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such engine"));
        }
        self.shared.launches.fetch_add(1, Ordering::SeqCst);

        match mode {
            Mode::Listen => {
                let listener = UnixListener::bind(socket_path)?;
                let shared = Arc::clone(&self.shared);
                thread::spawn(move || serve(&listener, &shared));
            }
            Mode::PlainFile => std::fs::write(socket_path, b"not a socket")?,
            Mode::NeverListen | Mode::FailSpawn => {}
        }

        Ok(Box::new(FakeProcess {
            shared: Arc::clone(&self.shared),
        }))
    }
}

fn serve(listener: &UnixListener, shared: &Shared) {
    let Ok((stream, _)) = listener.accept() else {
        return;
    };
    *shared.peer.lock().unwrap() = Some(stream.try_clone().unwrap());

    for line in BufReader::new(stream).lines() {
        let Ok(line) = line else { break };
        match serde_json::from_str::<Value>(&line) {
            Ok(value) if value.is_object() => shared.received.lock().unwrap().push(value),
            _ => {
                shared.malformed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

struct FakeProcess {
    shared: Arc<Shared>,
}

impl EngineProcess for FakeProcess {
    fn kill(&mut self) -> io::Result<()> {
        self.shared.kills.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn wait(&mut self) -> io::Result<()> {
        Ok(())
    }
}
