//! ymusic Core
//!
//! Domain types shared by the playback libraries and the terminal client.
//!
//! Tracks are handed to the playback core by the remote API client and are
//! never mutated afterwards. Identity is the opaque [`TrackId`]; every other
//! field is display metadata.
//!
//! # Example
//!
//! ```rust
//! use ymusic_core::{AlbumRef, Track};
//! use std::time::Duration;
//!
//! let track = Track::new("42", "Song")
//!     .with_artists(["First", "Second"])
//!     .with_duration(Duration::from_secs(215))
//!     .with_album(AlbumRef::new("7", "Album"));
//!
//! assert_eq!(track.artist_name(), "First, Second");
//! assert_eq!(track.album_title(), "Album");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod ids;
mod track;

pub use ids::{AlbumId, TrackId};
pub use track::{AlbumRef, Track};
