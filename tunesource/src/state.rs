//! Playback state and progress values published by providers.

use std::fmt;

/// Transport state of a provider.
///
/// `Error` is terminal until the next explicit play request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
    Loading,
    Error(String),
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PlaybackState::Error(_))
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Stopped => f.write_str("stopped"),
            PlaybackState::Playing => f.write_str("playing"),
            PlaybackState::Paused => f.write_str("paused"),
            PlaybackState::Loading => f.write_str("loading"),
            PlaybackState::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// Position within the current song, in seconds.
///
/// Values are not clamped: `current_time` may briefly exceed `duration`
/// during the tick that ends a song.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackProgress {
    current_time: f64,
    duration: f64,
}

impl PlaybackProgress {
    pub fn new(current_time: f64, duration: f64) -> Self {
        Self {
            current_time,
            duration,
        }
    }

    /// Progress at the start of a song.
    pub fn start_of(duration: f64) -> Self {
        Self::new(0.0, duration)
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// `current_time / duration`, or 0 for an empty duration.
    pub fn fraction(&self) -> f64 {
        if self.duration > 0.0 {
            self.current_time / self.duration
        } else {
            0.0
        }
    }

    pub(crate) fn advanced_by(self, seconds: f64) -> Self {
        Self::new(self.current_time + seconds, self.duration)
    }

    pub(crate) fn at(self, current_time: f64) -> Self {
        Self::new(current_time, self.duration)
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.current_time >= self.duration
    }
}
