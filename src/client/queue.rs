use crate::network::messages::{TrackId, TrackPayload};
use thiserror::Error;
use tracing::{debug, info};

/// Cursor value meaning "no current track"
pub const IDLE_CURSOR: i64 = -1;

/// Queue entry
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub author: String,
    pub image_url: Option<String>,
    pub duration_ms: u64,
}

impl From<TrackPayload> for Track {
    fn from(payload: TrackPayload) -> Self {
        Self {
            id: payload.track_id,
            title: payload.info.title,
            author: payload.info.author,
            image_url: payload.thumbnail,
            duration_ms: payload.info.length,
        }
    }
}

/// Local queue disagrees with what the server expects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Divergence {
    #[error("offset {offset} resolves outside the queue")]
    OutOfRange { offset: i64 },

    #[error("expected track {expected:?} at index {index}, found {found}")]
    Fingerprint {
        index: usize,
        expected: Option<TrackId>,
        found: TrackId,
    },
}

/// Shared queue with a cursor on the current track.
///
/// The cursor is zero-based and may point outside the queue, in which case
/// nothing is playing. Positions received from the server for swaps and
/// moves are offsets relative to the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Queue {
    tracks: Vec<Track>,
    cursor: i64,
}

impl Queue {
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            cursor: IDLE_CURSOR,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Cursor as an index, if it points at a track
    pub fn current_index(&self) -> Option<usize> {
        usize::try_from(self.cursor)
            .ok()
            .filter(|index| *index < self.tracks.len())
    }

    pub fn current(&self) -> Option<&Track> {
        self.current_index().and_then(|index| self.tracks.get(index))
    }

    /// Set the cursor from the server's one-based queue position
    pub fn set_position(&mut self, one_based: i64) -> Option<&Track> {
        self.cursor = one_based.saturating_sub(1);
        debug!("Queue cursor set to {}", self.cursor);
        self.current()
    }

    /// Tracks from the cursor onward, the current one included
    pub fn remaining(&self) -> usize {
        let start = self.cursor.max(0) as usize;
        self.tracks.len().saturating_sub(start)
    }

    pub fn append(&mut self, tracks: impl IntoIterator<Item = Track>) -> usize {
        let before = self.tracks.len();
        self.tracks.extend(tracks);
        self.tracks.len() - before
    }

    /// Replace every track, keeping the cursor
    pub fn replace(&mut self, tracks: Vec<Track>) {
        info!("Replacing queue with {} tracks", tracks.len());
        self.tracks = tracks;
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = IDLE_CURSOR;
    }

    /// Absolute index for an offset from the cursor
    pub fn resolve(&self, offset: i64) -> Option<usize> {
        let absolute = self.cursor.checked_add(offset)?;
        usize::try_from(absolute)
            .ok()
            .filter(|index| *index < self.tracks.len())
    }

    /// Track a one-based queue position would make current, without
    /// moving the cursor
    pub fn peek_position(&self, one_based: i64) -> Option<&Track> {
        let index = usize::try_from(one_based.checked_sub(1)?).ok()?;
        self.tracks.get(index)
    }

    fn check(
        &self,
        offset: i64,
        expected: Option<&TrackId>,
    ) -> Result<usize, Divergence> {
        let index = self
            .resolve(offset)
            .ok_or(Divergence::OutOfRange { offset })?;
        let found = &self.tracks[index].id;
        if expected != Some(found) {
            return Err(Divergence::Fingerprint {
                index,
                expected: expected.cloned(),
                found: found.clone(),
            });
        }
        Ok(index)
    }

    /// Swap the tracks at two offsets, provided each currently holds the
    /// expected track. Nothing changes on mismatch.
    pub fn swap(
        &mut self,
        first: i64,
        expected_first: Option<&TrackId>,
        second: i64,
        expected_second: Option<&TrackId>,
    ) -> Result<(usize, usize), Divergence> {
        let a = self.check(first, expected_first)?;
        let b = self.check(second, expected_second)?;
        self.tracks.swap(a, b);
        info!("Swapped queue entries {} and {}", a, b);
        Ok((a, b))
    }

    /// Move the track at `from` to `to`, both offsets from the cursor.
    ///
    /// The source must hold the expected track. The destination is applied
    /// to the list after removal, and the cursor keeps pointing at the same
    /// track. Returns the absolute destination index.
    pub fn move_track(
        &mut self,
        from: i64,
        expected: Option<&TrackId>,
        to: i64,
    ) -> Result<usize, Divergence> {
        let source = self.check(from, expected)?;
        let destination = self
            .cursor
            .checked_add(to)
            .and_then(|absolute| usize::try_from(absolute).ok())
            .filter(|index| *index < self.tracks.len())
            .ok_or(Divergence::OutOfRange { offset: to })?;

        let track = self.tracks.remove(source);
        self.tracks.insert(destination, track);

        if let Some(current) = self.current_index() {
            if current == source {
                self.cursor = destination as i64;
            } else if source < current && destination >= current {
                self.cursor -= 1;
            } else if source > current && destination <= current {
                self.cursor += 1;
            }
        }
        info!("Moved queue entry {} to {}", source, destination);
        Ok(destination)
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}
