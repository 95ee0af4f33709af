//! Ordered playback queue
//!
//! Keeps two orders of the same tracks:
//! - Working order: what actually plays, possibly shuffled
//! - Original order: insertion order, restored when shuffle is turned off

use crate::shuffle::shuffle_keeping_current;
use crate::types::RepeatMode;
use rand::Rng;
use ymusic_core::{Track, TrackId};

/// Playback queue with shuffle and repeat
///
/// ```text
/// original: [A, B, C, D]      (insertion order)
/// working:  [C, A, D, B]      (shuffle on)
///                ^ cursor
/// ```
///
/// Invariant: when the working order is non-empty the cursor is a valid index
/// into it. Every operation on an empty queue yields `None` instead of
/// indexing.
#[derive(Debug, Clone, Default)]
pub struct PlaybackQueue {
    /// Current play order
    tracks: Vec<Track>,

    /// Insertion order, restored when shuffle is disabled
    original_order: Vec<Track>,

    /// Index of the current track in `tracks`
    cursor: usize,

    shuffle: bool,
    repeat: RepeatMode,
}

impl PlaybackQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue contents and select `start_index`
    ///
    /// A start index past the end selects the last track. While shuffle is on
    /// the new tracks are reshuffled immediately with the selected track
    /// moved to the front.
    pub fn set(&mut self, tracks: Vec<Track>, start_index: usize) {
        self.set_with_rng(tracks, start_index, &mut rand::thread_rng());
    }

    /// [`set`](Self::set) with an explicit random source
    pub fn set_with_rng<R: Rng + ?Sized>(
        &mut self,
        tracks: Vec<Track>,
        start_index: usize,
        rng: &mut R,
    ) {
        self.original_order.clone_from(&tracks);
        self.tracks = tracks;
        self.cursor = start_index.min(self.tracks.len().saturating_sub(1));

        if self.shuffle {
            self.reshuffle(rng);
        }
    }

    /// Track at the cursor
    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.cursor)
    }

    /// Advance to the next track
    ///
    /// - Repeat One: stays on the current track
    /// - Repeat All: wraps from the last track to the first
    /// - Repeat Off: at the end, the cursor stays on the last track and
    ///   `None` is returned
    pub fn next(&mut self) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }

        if self.repeat == RepeatMode::One {
            return self.current();
        }

        if self.cursor + 1 < self.tracks.len() {
            self.cursor += 1;
        } else if self.repeat == RepeatMode::All {
            self.cursor = 0;
        } else {
            self.cursor = self.tracks.len() - 1;
            return None;
        }

        self.current()
    }

    /// Go back to the previous track
    ///
    /// Before the first track: wraps to the last under Repeat All, otherwise
    /// stays on (and replays) the first track.
    pub fn prev(&mut self) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }

        if self.cursor > 0 {
            self.cursor -= 1;
        } else if self.repeat == RepeatMode::All {
            self.cursor = self.tracks.len() - 1;
        } else {
            self.cursor = 0;
        }

        self.current()
    }

    /// Flip shuffle on or off without interrupting the current track
    pub fn toggle_shuffle(&mut self) {
        self.toggle_shuffle_with_rng(&mut rand::thread_rng());
    }

    /// [`toggle_shuffle`](Self::toggle_shuffle) with an explicit random source
    pub fn toggle_shuffle_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.shuffle = !self.shuffle;

        if self.shuffle {
            self.reshuffle(rng);
        } else {
            self.restore_original_order();
        }
    }

    /// Rotate repeat mode: Off -> All -> One -> Off
    pub fn cycle_repeat(&mut self) {
        self.repeat = self.repeat.cycled();
    }

    /// Set repeat mode directly
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Append tracks to both orders (continuous radio)
    pub fn append(&mut self, tracks: impl IntoIterator<Item = Track>) {
        let tracks: Vec<Track> = tracks.into_iter().collect();
        self.original_order.extend(tracks.iter().cloned());
        self.tracks.extend(tracks);
    }

    /// Whether shuffle is enabled
    pub fn is_shuffled(&self) -> bool {
        self.shuffle
    }

    /// Current repeat mode
    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    /// Tracks in working (play) order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Tracks in insertion order
    pub fn original_order(&self) -> &[Track] {
        &self.original_order
    }

    /// Cursor position in the working order
    pub fn index(&self) -> usize {
        self.cursor
    }

    /// Number of tracks in the queue
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks after the cursor in working order
    pub fn upcoming(&self) -> &[Track] {
        self.tracks.get(self.cursor + 1..).unwrap_or(&[])
    }

    /// Rebuild the working order as a permutation of the original order with
    /// the current track at the front
    fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let current = self.current_id();
        let mut shuffled = self.original_order.clone();
        self.cursor = shuffle_keeping_current(&mut shuffled, current.as_ref(), rng);
        self.tracks = shuffled;
    }

    fn restore_original_order(&mut self) {
        let current = self.current_id();
        self.tracks.clone_from(&self.original_order);
        self.cursor = current
            .and_then(|id| self.tracks.iter().position(|t| t.id == id))
            .unwrap_or(0);
    }

    fn current_id(&self) -> Option<TrackId> {
        self.current().map(|t| t.id.clone())
    }
}
