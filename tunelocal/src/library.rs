//! Built-in catalogs.

use tunesource::{Song, SourceKind};

const LOCAL_LIBRARY_ROOT: &str = "/music";
const SPOTIFY_STREAM_BASE: &str = "https://stream.spotify.mock/tracks";
const SPOTIFY_ARTWORK_BASE: &str = "https://i.scdn.mock/image";

/// Songs shipped with the local library source.
pub fn local_library() -> Vec<Song> {
    [
        ("local-1", "Local Song 1", "Local Artist A", "Home Recordings", 184.0),
        ("local-2", "Local Song 2", "Local Artist A", "Home Recordings", 215.0),
        ("local-3", "Local Song 3", "Local Artist B", "Garage Tapes", 162.0),
        ("local-4", "Evening Drive", "Local Artist B", "Garage Tapes", 247.0),
        ("local-5", "Morning Light", "Local Artist C", "Field Notes", 199.0),
    ]
    .into_iter()
    .map(|(id, title, artist, album, duration)| {
        Song::local(
            id,
            title,
            artist,
            album,
            duration,
            format!("{}/{}.mp3", LOCAL_LIBRARY_ROOT, id),
        )
    })
    .collect()
}

/// Songs served by the streaming mock.
pub fn spotify_catalog() -> Vec<Song> {
    [
        ("sp-1", "Spotify Song 1", "Streaming Artist", "Mock Hits", 201.0),
        ("sp-2", "Spotify Song 2", "Streaming Artist", "Mock Hits", 176.0),
        ("sp-3", "Night Shift", "The Placeholders", "Demo Reel", 233.0),
        ("sp-4", "Loop Station", "The Placeholders", "Demo Reel", 158.0),
    ]
    .into_iter()
    .map(|(id, title, artist, album, duration)| {
        Song::remote(
            SourceKind::Spotify,
            id,
            title,
            artist,
            album,
            duration,
            format!("{}/{}", SPOTIFY_STREAM_BASE, id),
        )
        .with_artwork(format!("{}/{}.jpg", SPOTIFY_ARTWORK_BASE, id))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogs_respect_source_kinds() {
        for song in local_library() {
            assert_eq!(song.source(), SourceKind::Local);
            assert!(song.local_path().is_some());
        }
        for song in spotify_catalog() {
            assert_eq!(song.source(), SourceKind::Spotify);
            assert!(song.stream_url().is_some());
        }
    }
}
