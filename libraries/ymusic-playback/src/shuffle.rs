//! Shuffle algorithm for queue randomization
//!
//! Fisher-Yates permutation followed by moving the playing track to the front.

use rand::seq::SliceRandom;
use rand::Rng;
use ymusic_core::{Track, TrackId};

/// Shuffle `tracks` uniformly, then move the track identified by `current`
/// to index 0.
///
/// Identity is the track ID, never field equality. Returns the index the
/// cursor should point at afterwards: 0 in every case, including when
/// `current` is not present.
pub fn shuffle_keeping_current<R>(
    tracks: &mut [Track],
    current: Option<&TrackId>,
    rng: &mut R,
) -> usize
where
    R: Rng + ?Sized,
{
    tracks.shuffle(rng);

    if let Some(id) = current {
        if let Some(pos) = tracks.iter().position(|t| &t.id == id) {
            tracks.swap(0, pos);
        }
    }

    0
}
