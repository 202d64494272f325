//! Ordered playlist with a circular cursor.

use tracing::trace;
use tunesource::{format_duration, Song};

/// An ordered list of songs and a cursor on the current one.
///
/// Duplicates are allowed. Whenever the playlist is not empty the cursor
/// designates an existing entry; on an empty playlist it is 0 and
/// [`Playlist::current_song`] returns `None`.
///
/// Out-of-range indices make every mutating call a no-op.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    songs: Vec<Song>,
    current_index: usize,
}

/// Owned copy of a playlist, as published to listeners.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistSnapshot {
    pub songs: Vec<Song>,
    pub current_index: usize,
}

impl PlaylistSnapshot {
    pub fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.current_index)
    }
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a playlist positioned on its first song.
    pub fn from_songs(songs: Vec<Song>) -> Self {
        Self {
            songs,
            current_index: 0,
        }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.current_index)
    }

    /// Appends a song. The cursor does not move.
    pub fn add(&mut self, song: Song) {
        trace!(song = song.id(), position = self.songs.len(), "Playlist add");
        self.songs.push(song);
    }

    /// Removes the song at `index`.
    ///
    /// Removing at or before the cursor shifts the cursor back by one, unless
    /// it is already on the first entry.
    pub fn remove(&mut self, index: usize) -> Option<Song> {
        if index >= self.songs.len() {
            return None;
        }

        let removed = self.songs.remove(index);
        if index <= self.current_index && self.current_index > 0 {
            self.current_index -= 1;
        }
        trace!(song = removed.id(), index, cursor = self.current_index, "Playlist remove");
        Some(removed)
    }

    /// Moves the song at `from` so that it ends up at index `to`.
    ///
    /// The cursor keeps designating the same entry.
    pub fn move_song(&mut self, from: usize, to: usize) -> bool {
        let len = self.songs.len();
        if from >= len || to >= len {
            return false;
        }

        let song = self.songs.remove(from);
        self.songs.insert(to, song);

        let current = self.current_index;
        self.current_index = if from == current {
            to
        } else if from < current && current <= to {
            current - 1
        } else if to <= current && current < from {
            current + 1
        } else {
            current
        };
        trace!(from, to, cursor = self.current_index, "Playlist move");
        true
    }

    /// Advances the cursor, wrapping to the first song after the last one.
    pub fn next(&mut self) -> Option<&Song> {
        if self.songs.is_empty() {
            return None;
        }
        self.current_index = (self.current_index + 1) % self.songs.len();
        self.current_song()
    }

    /// Moves the cursor back, wrapping to the last song before the first one.
    pub fn previous(&mut self) -> Option<&Song> {
        if self.songs.is_empty() {
            return None;
        }
        let len = self.songs.len();
        self.current_index = (self.current_index + len - 1) % len;
        self.current_song()
    }

    /// Puts the cursor on `index`.
    pub fn select(&mut self, index: usize) -> Option<&Song> {
        if index >= self.songs.len() {
            return None;
        }
        self.current_index = index;
        self.current_song()
    }

    /// Empties the playlist and rewinds the cursor.
    pub fn clear(&mut self) {
        self.songs.clear();
        self.current_index = 0;
    }

    /// Replaces the whole content, positioning the cursor on the first song.
    pub fn replace(&mut self, songs: Vec<Song>) {
        self.songs = songs;
        self.current_index = 0;
    }

    /// Sum of song durations, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.songs.iter().map(Song::duration).sum()
    }

    /// Total duration as `H:MM:SS` (one hour or more) or `M:SS`.
    pub fn formatted_total_duration(&self) -> String {
        format_duration(self.total_duration())
    }

    pub fn snapshot(&self) -> PlaylistSnapshot {
        PlaylistSnapshot {
            songs: self.songs.clone(),
            current_index: self.current_index,
        }
    }
}
