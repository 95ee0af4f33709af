//! ymusic - Playback Queue
//!
//! Synchronous, in-memory play order for the terminal client.
//!
//! This crate provides:
//! - Working order (what plays next) and original order (insertion order)
//! - Cursor-based navigation (`next` / `prev`)
//! - Shuffle that never interrupts the current track
//! - Repeat modes (Off, All, One)
//!
//! # Architecture
//!
//! `ymusic-playback` has no knowledge of the audio engine. The orchestrator
//! asks the queue which track is current and hands that track's resolved URL
//! to the player on its own.
//!
//! The queue holds no lock. Callers serialize all access onto one logical
//! thread.
//!
//! # Example
//!
//! ```rust
//! use ymusic_core::Track;
//! use ymusic_playback::{PlaybackQueue, RepeatMode};
//!
//! let mut queue = PlaybackQueue::new();
//! queue.set(
//!     vec![Track::new("a", "A"), Track::new("b", "B"), Track::new("c", "C")],
//!     0,
//! );
//!
//! assert_eq!(queue.next().map(|t| t.id.as_str()), Some("b"));
//! assert_eq!(queue.next().map(|t| t.id.as_str()), Some("c"));
//! assert!(queue.next().is_none()); // end of queue, repeat off
//!
//! queue.cycle_repeat();
//! assert_eq!(queue.repeat_mode(), RepeatMode::All);
//! assert_eq!(queue.next().map(|t| t.id.as_str()), Some("a"));
//! ```

mod queue;
mod shuffle;
pub mod types;

// Public exports
pub use queue::PlaybackQueue;
pub use shuffle::shuffle_keeping_current;
pub use types::RepeatMode;
