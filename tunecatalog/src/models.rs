//! Data models for catalog responses
//!
//! Catalogs answer with a JSON object holding an optional list of track
//! records:
//!
//! ```json
//! { "track": [ { "idTrack": "32793500", "strTrack": "Intro", "intDuration": "184" } ] }
//! ```
//!
//! Every record field is optional. Missing text fields decode to `"Unknown"`
//! and a missing or malformed duration decodes to 0.

use serde::{Deserialize, Deserializer, Serialize};
use tunesource::{Song, SourceKind};
use url::Url;

/// Placeholder for missing text fields
pub const UNKNOWN: &str = "Unknown";

/// Body of a catalog response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrackList {
    /// `null` and absent both mean "no results"
    #[serde(default, alias = "tracks")]
    pub track: Option<Vec<TrackRecord>>,
}

impl TrackList {
    pub fn into_records(self) -> Vec<TrackRecord> {
        self.track.unwrap_or_default()
    }
}

/// One track record
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TrackRecord {
    #[serde(rename = "idTrack", default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,

    #[serde(rename = "strTrack", default)]
    pub title: Option<String>,

    #[serde(rename = "strArtist", default)]
    pub artist: Option<String>,

    #[serde(rename = "strAlbum", default)]
    pub album: Option<String>,

    /// Duration in seconds; catalogs send it as a string
    #[serde(rename = "intDuration", default, deserialize_with = "deserialize_lenient_seconds")]
    pub duration: Option<u64>,

    #[serde(rename = "strMusicVidUrl", default)]
    pub stream_url: Option<String>,

    #[serde(rename = "strTrackThumb", default)]
    pub artwork_url: Option<String>,
}

impl TrackRecord {
    /// Converts the record into a [`Song`] of the given kind.
    ///
    /// Records without an id cannot be played back and yield `None`. When no
    /// stream URL is given, one is derived from the catalog endpoint.
    pub fn into_song(self, kind: SourceKind, endpoint: &Url) -> Option<Song> {
        let id = self.id.filter(|id| !id.is_empty())?;
        let stream_url = non_empty(self.stream_url).unwrap_or_else(|| fallback_stream_url(endpoint, &id));

        let song = Song::remote(
            kind,
            id,
            text_or_unknown(self.title),
            text_or_unknown(self.artist),
            text_or_unknown(self.album),
            self.duration.unwrap_or(0) as f64,
            stream_url,
        );

        Some(match non_empty(self.artwork_url) {
            Some(artwork) => song.with_artwork(artwork),
            None => song,
        })
    }
}

/// `<endpoint without query>/stream/<id>`
pub fn fallback_stream_url(endpoint: &Url, id: &str) -> String {
    let mut base = endpoint.clone();
    base.set_query(None);
    base.set_fragment(None);
    format!("{}/stream/{}", base.as_str().trim_end_matches('/'), id)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn text_or_unknown(value: Option<String>) -> String {
    non_empty(value).unwrap_or_else(|| UNKNOWN.to_string())
}

/// Deserialize an id sent either as a string or a number
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => None,
        Some(StringOrNumber::String(s)) => Some(s),
        Some(StringOrNumber::Number(n)) => Some(n.to_string()),
    })
}

/// Deserialize a duration in seconds, mapping anything unusable to `None`
fn deserialize_lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Int(u64),
        Float(f64),
        String(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Seconds>::deserialize(deserializer)? {
        Some(Seconds::Int(n)) => Some(n),
        Some(Seconds::Float(f)) if f.is_finite() && f >= 0.0 => Some(f as u64),
        Some(Seconds::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
        }
        _ => None,
    })
}
