//! Song metadata shared by every source.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::SourceError;

/// Origin of a song, used to route playback to the right provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "spotify")]
    Spotify,
    #[serde(rename = "audioDB")]
    AudioDb,
    #[serde(rename = "discogs")]
    Discogs,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Local,
        SourceKind::Spotify,
        SourceKind::AudioDb,
        SourceKind::Discogs,
    ];

    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Local => "local",
            SourceKind::Spotify => "spotify",
            SourceKind::AudioDb => "audioDB",
            SourceKind::Discogs => "discogs",
        }
    }

    /// Lower-case key used in configuration sections.
    pub fn config_key(&self) -> &'static str {
        match self {
            SourceKind::AudioDb => "audiodb",
            other => other.as_str(),
        }
    }

    /// Human readable name for logs and listings.
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceKind::Local => "Local Library",
            SourceKind::Spotify => "Spotify",
            SourceKind::AudioDb => "TheAudioDB",
            SourceKind::Discogs => "Discogs",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SourceError::InvalidKind(s.to_string()))
    }
}

/// A playable track.
///
/// Songs are immutable once built. Identity is the `id` alone: two songs with
/// the same id compare equal even if their metadata differs.
///
/// Exactly one of `stream_url` / `local_path` is set, according to `source`:
/// use [`Song::local`] for files on disk and [`Song::remote`] for everything
/// else. Deserialization enforces the same rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SongRecord")]
pub struct Song {
    id: String,
    title: String,
    artist: String,
    album: String,
    duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    artwork_url: Option<String>,
    source: SourceKind,
    #[serde(rename = "streamURL", skip_serializing_if = "Option::is_none")]
    stream_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_path: Option<String>,
}

/// Wire shape of [`Song`], validated on the way in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SongRecord {
    id: String,
    title: String,
    artist: String,
    album: String,
    duration: f64,
    #[serde(default)]
    artwork_url: Option<String>,
    source: SourceKind,
    #[serde(default, rename = "streamURL")]
    stream_url: Option<String>,
    #[serde(default)]
    local_path: Option<String>,
}

impl TryFrom<SongRecord> for Song {
    type Error = SourceError;

    fn try_from(record: SongRecord) -> Result<Self, Self::Error> {
        let song = match record.source {
            SourceKind::Local => {
                let path = record.local_path.ok_or_else(|| {
                    SourceError::decode(format!("local song {} has no localPath", record.id))
                })?;
                Song::local(record.id, record.title, record.artist, record.album, record.duration, path)
            }
            source => {
                let url = record.stream_url.ok_or_else(|| {
                    SourceError::decode(format!("{} song {} has no streamURL", source, record.id))
                })?;
                Song::remote(source, record.id, record.title, record.artist, record.album, record.duration, url)
            }
        };

        Ok(match record.artwork_url {
            Some(artwork_url) => song.with_artwork(artwork_url),
            None => song,
        })
    }
}

impl Song {
    /// A song backed by a local file.
    pub fn local(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration: f64,
        local_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration: duration.max(0.0),
            artwork_url: None,
            source: SourceKind::Local,
            stream_url: None,
            local_path: Some(local_path.into()),
        }
    }

    /// A song streamed from a remote source.
    ///
    /// `source` must not be [`SourceKind::Local`].
    pub fn remote(
        source: SourceKind,
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration: f64,
        stream_url: impl Into<String>,
    ) -> Self {
        debug_assert!(source != SourceKind::Local, "remote songs need a remote source");
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration: duration.max(0.0),
            artwork_url: None,
            source,
            stream_url: Some(stream_url.into()),
            local_path: None,
        }
    }

    pub fn with_artwork(mut self, artwork_url: impl Into<String>) -> Self {
        self.artwork_url = Some(artwork_url.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn artwork_url(&self) -> Option<&str> {
        self.artwork_url.as_deref()
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn stream_url(&self) -> Option<&str> {
        self.stream_url.as_deref()
    }

    pub fn local_path(&self) -> Option<&str> {
        self.local_path.as_deref()
    }

    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration)
    }

    /// Case-insensitive substring match on title, artist or album.
    ///
    /// `needle` must already be lower-cased.
    pub fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.artist, &self.album]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl PartialEq for Song {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Song {}

impl Hash for Song {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Formats seconds as `H:MM:SS` from one hour up, `M:SS` below.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_names() {
        for kind in SourceKind::ALL {
            assert_eq!(kind.as_str().parse::<SourceKind>().unwrap(), kind);
        }
        assert_eq!("AUDIODB".parse::<SourceKind>().unwrap(), SourceKind::AudioDb);
        assert_eq!(SourceKind::AudioDb.config_key(), "audiodb");
        assert!("tidal".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_constructors_keep_location_consistent() {
        let local = Song::local("l1", "Title", "Artist", "Album", 120.0, "/music/a.flac");
        assert_eq!(local.source(), SourceKind::Local);
        assert_eq!(local.local_path(), Some("/music/a.flac"));
        assert!(local.stream_url().is_none());

        let remote = Song::remote(
            SourceKind::Spotify,
            "s1",
            "Title",
            "Artist",
            "Album",
            90.0,
            "https://stream.example/s1",
        );
        assert!(remote.local_path().is_none());
        assert_eq!(remote.stream_url(), Some("https://stream.example/s1"));
    }

    #[test]
    fn test_equality_is_by_id() {
        let a = Song::local("same", "One", "X", "Y", 10.0, "/a");
        let b = Song::local("same", "Two", "Z", "W", 20.0, "/b");
        let c = Song::local("other", "One", "X", "Y", 10.0, "/a");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_negative_duration_is_floored() {
        let song = Song::local("n", "T", "A", "B", -5.0, "/n");
        assert_eq!(song.duration(), 0.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(59.9), "0:59");
        assert_eq!(format_duration(185.0), "3:05");
        assert_eq!(format_duration(3600.0), "1:00:00");
        assert_eq!(format_duration(3725.0), "1:02:05");
        assert_eq!(format_duration(f64::NAN), "0:00");
    }

    #[test]
    fn test_matches_any_text_field() {
        let song = Song::local("m", "Blue Monday", "New Order", "Power, Corruption", 300.0, "/m");
        assert!(song.matches("monday"));
        assert!(song.matches("order"));
        assert!(song.matches("corruption"));
        assert!(!song.matches("joy division"));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let song = Song::remote(SourceKind::AudioDb, "a1", "T", "A", "B", 1.0, "http://x/a1")
            .with_artwork("http://x/a1.jpg");
        let json = serde_json::to_value(&song).unwrap();
        assert_eq!(json["source"], "audioDB");
        assert_eq!(json["streamURL"], "http://x/a1");
        assert_eq!(json["artworkUrl"], "http://x/a1.jpg");
        assert!(json.get("localPath").is_none());

        let back: Song = serde_json::from_value(json).unwrap();
        assert_eq!(back.artwork_url(), Some("http://x/a1.jpg"));
        assert_eq!(back.source(), SourceKind::AudioDb);
    }

    #[test]
    fn test_deserialize_applies_constructor_rules() {
        let song: Song = serde_json::from_value(serde_json::json!({
            "id": "l9",
            "title": "T",
            "artist": "A",
            "album": "B",
            "duration": -12.5,
            "source": "local",
            "localPath": "/m/l9.mp3",
            "streamURL": "http://stray/l9"
        }))
        .unwrap();
        assert_eq!(song.duration(), 0.0);
        assert_eq!(song.local_path(), Some("/m/l9.mp3"));
        assert!(song.stream_url().is_none());

        let missing_path = serde_json::from_value::<Song>(serde_json::json!({
            "id": "l10",
            "title": "T",
            "artist": "A",
            "album": "B",
            "duration": 10.0,
            "source": "local"
        }));
        assert!(missing_path.is_err());

        let missing_url = serde_json::from_value::<Song>(serde_json::json!({
            "id": "d1",
            "title": "T",
            "artist": "A",
            "album": "B",
            "duration": 10.0,
            "source": "discogs",
            "localPath": "/m/d1.mp3"
        }));
        assert!(missing_url.is_err());
    }
}
