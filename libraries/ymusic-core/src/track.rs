/// Track domain type
use crate::ids::{AlbumId, TrackId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reference to the album a track was released on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    /// Album identifier
    pub id: AlbumId,

    /// Album title
    pub title: String,
}

impl AlbumRef {
    /// Create a new album reference
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: AlbumId::new(id),
            title: title.into(),
        }
    }
}

/// Playable track as obtained from the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist names, in credit order
    #[serde(default)]
    pub artists: Vec<String>,

    /// Track duration
    #[serde(default)]
    pub duration: Duration,

    /// Album the track belongs to
    #[serde(default)]
    pub album: Option<AlbumRef>,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artists: Vec::new(),
            duration: Duration::ZERO,
            album: None,
        }
    }

    /// Set the credited artists
    #[must_use]
    pub fn with_artists<I, S>(mut self, artists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artists = artists.into_iter().map(Into::into).collect();
        self
    }

    /// Set the duration
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the album reference
    #[must_use]
    pub fn with_album(mut self, album: AlbumRef) -> Self {
        self.album = Some(album);
        self
    }

    /// All artist names joined for display, or "Unknown"
    pub fn artist_name(&self) -> String {
        if self.artists.is_empty() {
            return "Unknown".to_string();
        }
        self.artists.join(", ")
    }

    /// Album title, empty when the track has no album
    pub fn album_title(&self) -> &str {
        self.album.as_ref().map_or("", |album| album.title.as_str())
    }

    /// Duration in whole seconds
    pub fn duration_secs(&self) -> u64 {
        self.duration.as_secs()
    }
}
