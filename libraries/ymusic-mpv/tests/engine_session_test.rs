//! Integration tests for the engine session
//!
//! These drive a full `Player` against an in-process fake engine listening
//! on a temporary Unix socket.

mod common;

use common::{test_config, wait_until, FakeEngine};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use ymusic_mpv::protocol::RESERVED_REQUEST_ID_BASE;
use ymusic_mpv::{ControlEvent, EndFileReason, EngineError, Player, PropertyUpdate};

const TIMEOUT: Duration = Duration::from_secs(2);

const CALLER_THREADS: usize = 8;
const CALLS_PER_THREAD: usize = 50;
const NOTIFICATIONS: usize = 200;

/// Lines written during setup: five observations plus the initial volume
const SETUP_LINES: usize = 6;

#[test]
fn test_setup_observes_properties_then_sets_volume() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    let mut config = test_config(&dir.path().join("mpv.sock"));
    config.initial_volume = 0.0;
    let (player, _events) = Player::with_launcher(config, engine.clone());

    player.start().unwrap();
    let lines = engine.wait_for_lines(SETUP_LINES);

    let names = ["time-pos", "duration", "pause", "volume", "idle-active"];
    for (i, name) in names.iter().enumerate() {
        let id = i as i64 + 1;
        assert_eq!(lines[i]["command"], json!(["observe_property", id, name]));
        assert_eq!(lines[i]["request_id"], json!(RESERVED_REQUEST_ID_BASE + id));
    }
    // Non-positive configured volume falls back to 70
    assert_eq!(lines[5]["command"], json!(["set_property", "volume", 70.0]));
    assert_eq!(player.state().volume_percent, 70.0);

    player.quit();
}

#[test]
fn test_start_twice_launches_once() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    let (player, _events) =
        Player::with_launcher(test_config(&dir.path().join("mpv.sock")), engine.clone());

    player.start().unwrap();
    player.start().unwrap();

    assert_eq!(engine.launches(), 1);
    assert!(player.is_started());
    player.quit();
}

#[test]
fn test_unreachable_socket_fails_startup_and_kills_process() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::unreachable();
    let mut config = test_config(&dir.path().join("mpv.sock"));
    config.startup_attempts = 3;
    let (player, _events) = Player::with_launcher(config, engine.clone());

    let err = player.start().unwrap_err();

    assert!(
        matches!(err, EngineError::Startup { attempts: 3, .. }),
        "unexpected error: {err}"
    );
    assert!(err.is_startup());
    assert_eq!(engine.kills(), 1);
    assert!(!player.is_started());
}

#[test]
fn test_failed_start_rolls_back_and_can_be_retried() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("mpv.sock");
    let engine = FakeEngine::not_a_socket();
    let mut config = test_config(&socket_path);
    config.startup_attempts = 3;
    let (player, _events) = Player::with_launcher(config, engine.clone());

    assert!(player.start().unwrap_err().is_startup());

    // Nothing from the failed attempt is left behind
    assert!(!player.is_started());
    assert!(!socket_path.exists());
    assert_eq!(engine.kills(), 1);
    assert!(matches!(player.toggle_pause(), Err(EngineError::NotConnected)));

    engine.heal();
    player.start().unwrap();
    assert!(player.is_started());
    assert_eq!(engine.launches(), 2);
    engine.wait_for_lines(SETUP_LINES);

    player.quit();
}

#[test]
fn test_spawn_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (player, _events) = Player::with_launcher(
        test_config(&dir.path().join("mpv.sock")),
        FakeEngine::broken(),
    );

    assert!(matches!(player.start(), Err(EngineError::Spawn(_))));
    assert!(!player.is_started());
}

#[test]
fn test_property_changes_update_state() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    let (player, _events) =
        Player::with_launcher(test_config(&dir.path().join("mpv.sock")), engine.clone());
    player.start().unwrap();

    engine.send(r#"{"event":"property-change","id":2,"name":"duration","data":180.0}"#);
    engine.send(r#"{"event":"property-change","id":1,"name":"time-pos","data":45.0}"#);
    engine.send(r#"{"event":"property-change","id":3,"name":"pause","data":false}"#);
    engine.send(r#"{"event":"property-change","id":4,"name":"volume","data":55.0}"#);
    engine.send(r#"{"event":"property-change","id":5,"name":"idle-active","data":true}"#);

    // Lines are applied in order, so idle-active arriving means all have
    assert!(wait_until(TIMEOUT, || player.state().idle));
    let state = player.state();
    assert_eq!(state.duration_seconds, 180.0);
    assert_eq!(state.position_seconds, 45.0);
    assert!(state.playing);
    assert_eq!(state.volume_percent, 55.0);
    assert!((state.progress() - 0.25).abs() < 1e-9);

    engine.send(r#"{"event":"property-change","id":3,"name":"pause","data":true}"#);
    assert!(wait_until(TIMEOUT, || !player.state().playing));

    player.quit();
}

#[test]
fn test_malformed_lines_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    let (player, events) =
        Player::with_launcher(test_config(&dir.path().join("mpv.sock")), engine.clone());
    player.start().unwrap();

    engine.send("this is not json");
    engine.send(r#"{"request_id":7,"error":"success","data":null}"#);
    engine.send(r#"{"event":"property-change","name":"time-pos","data":3.0}"#);

    let event = events.recv_timeout(TIMEOUT);
    assert_eq!(
        event,
        Some(ControlEvent::PropertyChange(PropertyUpdate::TimePos(3.0)))
    );
    assert_eq!(player.state().position_seconds, 3.0);

    player.quit();
}

#[test]
fn test_mistyped_property_changes_are_published_without_state_change() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    let (player, events) =
        Player::with_launcher(test_config(&dir.path().join("mpv.sock")), engine.clone());
    player.start().unwrap();

    engine.send(r#"{"event":"property-change","id":3,"name":"pause","data":"yes"}"#);
    engine.send(r#"{"event":"property-change","id":1,"name":"time-pos","data":null}"#);

    assert_eq!(
        events.recv_timeout(TIMEOUT),
        Some(ControlEvent::UntypedPropertyChange {
            name: "pause".to_string(),
            data: json!("yes"),
        })
    );
    assert_eq!(
        events.recv_timeout(TIMEOUT),
        Some(ControlEvent::UntypedPropertyChange {
            name: "time-pos".to_string(),
            data: serde_json::Value::Null,
        })
    );

    let state = player.state();
    assert!(!state.playing);
    assert_eq!(state.position_seconds, 0.0);

    player.quit();
}

#[test]
fn test_end_of_file_and_idle_are_published() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    let (player, events) =
        Player::with_launcher(test_config(&dir.path().join("mpv.sock")), engine.clone());
    player.start().unwrap();

    engine.send(r#"{"event":"end-file","reason":"eof","playlist_entry_id":1}"#);
    engine.send(r#"{"event":"end-file","reason":"stop"}"#);
    engine.send(r#"{"event":"idle"}"#);

    assert_eq!(
        events.recv_timeout(TIMEOUT),
        Some(ControlEvent::EndOfFile {
            reason: EndFileReason::Eof
        })
    );
    assert_eq!(
        events.recv_timeout(TIMEOUT),
        Some(ControlEvent::EndOfFile {
            reason: EndFileReason::Stop
        })
    );
    assert_eq!(events.recv_timeout(TIMEOUT), Some(ControlEvent::Idle));

    player.quit();
}

#[test]
fn test_full_event_bus_drops_newest_but_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    let mut config = test_config(&dir.path().join("mpv.sock"));
    config.event_capacity = 2;
    let (player, events) = Player::with_launcher(config, engine.clone());
    player.start().unwrap();

    for i in 0..5 {
        engine.send(&format!(
            r#"{{"event":"property-change","name":"time-pos","data":{}.0}}"#,
            i
        ));
    }

    assert!(wait_until(TIMEOUT, || player.dropped_events() == 3));
    assert_eq!(player.state().position_seconds, 4.0);
    assert_eq!(
        events.drain(),
        vec![
            ControlEvent::PropertyChange(PropertyUpdate::TimePos(0.0)),
            ControlEvent::PropertyChange(PropertyUpdate::TimePos(1.0)),
        ]
    );

    player.quit();
}

#[test]
fn test_load_url_records_url_and_sends_loadfile() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    let (player, _events) =
        Player::with_launcher(test_config(&dir.path().join("mpv.sock")), engine.clone());
    player.start().unwrap();

    player.load_url("https://cdn.example.com/a.mp3").unwrap();

    assert_eq!(player.state().loaded_url, "https://cdn.example.com/a.mp3");
    let commands: Vec<_> = engine.wait_for_lines(SETUP_LINES + 1);
    assert_eq!(
        commands[SETUP_LINES]["command"],
        json!(["loadfile", "https://cdn.example.com/a.mp3"])
    );
    assert!(commands[SETUP_LINES]["request_id"].is_i64());

    player.quit();
}

#[test]
fn test_transport_commands_wire_shape() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    let (player, _events) =
        Player::with_launcher(test_config(&dir.path().join("mpv.sock")), engine.clone());
    player.start().unwrap();

    player.toggle_pause().unwrap();
    player.seek(10.0).unwrap();
    player.seek(-10.0).unwrap();
    player.seek_absolute(30.0).unwrap();
    player.set_volume(55.0).unwrap();
    player.stop().unwrap();

    engine.wait_for_lines(SETUP_LINES + 6);
    let commands = engine.commands();
    assert_eq!(
        commands[SETUP_LINES..],
        [
            json!(["cycle", "pause"]),
            json!(["seek", 10.0, "relative"]),
            json!(["seek", -10.0, "relative"]),
            json!(["seek", 30.0, "absolute"]),
            json!(["set_property", "volume", 55.0]),
            json!(["stop"]),
        ]
    );

    player.quit();
}

#[test]
fn test_commands_before_start_are_not_connected() {
    let dir = tempfile::tempdir().unwrap();
    let (player, _events) = Player::with_launcher(
        test_config(&dir.path().join("mpv.sock")),
        FakeEngine::new(),
    );

    assert!(matches!(player.toggle_pause(), Err(EngineError::NotConnected)));
    assert!(matches!(player.seek(5.0), Err(EngineError::NotConnected)));
    assert!(matches!(player.set_volume(50.0), Err(EngineError::NotConnected)));
    assert!(matches!(player.stop(), Err(EngineError::NotConnected)));
}

#[test]
fn test_quit_is_idempotent_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("mpv.sock");
    let engine = FakeEngine::new();
    let (player, _events) = Player::with_launcher(test_config(&socket_path), engine.clone());
    player.start().unwrap();
    assert!(socket_path.exists());

    player.quit();
    player.quit();

    assert!(!player.is_started());
    assert!(!socket_path.exists());
    assert_eq!(engine.kills(), 1);
    assert!(matches!(player.toggle_pause(), Err(EngineError::NotConnected)));
}

#[test]
fn test_quit_before_start_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    let (player, _events) =
        Player::with_launcher(test_config(&dir.path().join("mpv.sock")), engine.clone());

    player.quit();

    assert_eq!(engine.kills(), 0);
    assert!(!player.is_started());
}

#[test]
fn test_restart_after_quit() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    let (player, _events) =
        Player::with_launcher(test_config(&dir.path().join("mpv.sock")), engine.clone());

    player.start().unwrap();
    player.quit();
    player.start().unwrap();

    assert_eq!(engine.launches(), 2);
    assert!(player.is_started());
    player.quit();
}

#[test]
fn test_stale_socket_file_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("mpv.sock");
    std::fs::write(&socket_path, b"left over").unwrap();
    let engine = FakeEngine::new();
    let (player, _events) = Player::with_launcher(test_config(&socket_path), engine.clone());

    // Binding would fail with AddrInUse if the stale file survived
    player.start().unwrap();

    assert!(player.is_started());
    player.quit();
}

#[test]
fn test_concurrent_callers_write_whole_lines() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    let (player, _events) =
        Player::with_launcher(test_config(&dir.path().join("mpv.sock")), engine.clone());
    let player = Arc::new(player);
    player.start().unwrap();
    engine.wait_for_lines(SETUP_LINES);

    let callers: Vec<_> = (0..CALLER_THREADS)
        .map(|t| {
            let player = Arc::clone(&player);
            thread::spawn(move || {
                for i in 0..CALLS_PER_THREAD {
                    player
                        .load_url(&format!("https://cdn.example.com/{t}/{i}.mp3"))
                        .unwrap();
                    player.seek(1.0).unwrap();
                    // Readers run alongside the decode loop
                    let state = player.state();
                    assert!(state.loaded_url.starts_with("https://cdn.example.com/"));
                }
            })
        })
        .collect();

    for i in 0..NOTIFICATIONS {
        engine.send(&format!(
            r#"{{"event":"property-change","name":"time-pos","data":{}.0}}"#,
            i
        ));
    }

    for caller in callers {
        caller.join().unwrap();
    }

    let expected = SETUP_LINES + CALLER_THREADS * CALLS_PER_THREAD * 2;
    let lines = engine.wait_for_lines(expected);
    assert_eq!(lines.len(), expected);
    assert_eq!(engine.malformed(), 0);

    let commands = &lines[SETUP_LINES..];
    let loads = commands
        .iter()
        .filter(|line| line["command"][0] == "loadfile")
        .count();
    let seeks = commands
        .iter()
        .filter(|line| line["command"] == json!(["seek", 1.0, "relative"]))
        .count();
    assert_eq!(loads, CALLER_THREADS * CALLS_PER_THREAD);
    assert_eq!(seeks, CALLER_THREADS * CALLS_PER_THREAD);

    let request_ids: HashSet<i64> = commands
        .iter()
        .map(|line| line["request_id"].as_i64().unwrap())
        .collect();
    assert_eq!(request_ids.len(), commands.len());

    let last_position = (NOTIFICATIONS - 1) as f64;
    assert!(wait_until(TIMEOUT, || player.state().position_seconds == last_position));

    player.quit();
}
