//! Integration tests for tunecatalog

use serde_json::json;
use std::time::Duration;
use tunecatalog::{CatalogClient, CatalogSource, Error};
use tunesource::{EngineSettings, MusicProvider, PlaybackState, SourceError, SourceKind};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create a mock search response
fn mock_tracks_json() -> serde_json::Value {
    json!({
        "track": [
            {
                "idTrack": "32793500",
                "strTrack": "Get Lucky",
                "strArtist": "Daft Punk",
                "strAlbum": "Random Access Memories",
                "intDuration": "369",
                "strMusicVidUrl": "https://video.example/get-lucky",
                "strTrackThumb": "https://img.example/get-lucky.jpg"
            },
            {
                "idTrack": "32793501",
                "strTrack": "Instant Crush",
                "intDuration": "not a number"
            },
            {
                "strTrack": "Record without id"
            }
        ]
    })
}

async fn source_for(server: &MockServer, kind: SourceKind) -> CatalogSource {
    let client = CatalogClient::builder(format!("{}/api/search", server.uri()))
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    CatalogSource::new(kind, client, EngineSettings::default())
}

#[tokio::test]
async fn test_search_decodes_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("query", "daft punk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_tracks_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, SourceKind::AudioDb).await;
    let songs = source.search("daft punk").await.unwrap();

    assert_eq!(songs.len(), 2);

    let lucky = &songs[0];
    assert_eq!(lucky.id(), "32793500");
    assert_eq!(lucky.title(), "Get Lucky");
    assert_eq!(lucky.artist(), "Daft Punk");
    assert_eq!(lucky.duration(), 369.0);
    assert_eq!(lucky.source(), SourceKind::AudioDb);
    assert_eq!(lucky.stream_url(), Some("https://video.example/get-lucky"));
    assert_eq!(lucky.artwork_url(), Some("https://img.example/get-lucky.jpg"));

    let crush = &songs[1];
    assert_eq!(crush.artist(), "Unknown");
    assert_eq!(crush.album(), "Unknown");
    assert_eq!(crush.duration(), 0.0);
    assert_eq!(
        crush.stream_url().map(str::to_string),
        Some(format!("{}/api/search/stream/32793501", mock_server.uri()))
    );
}

#[tokio::test]
async fn test_search_without_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "track": null })))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, SourceKind::Discogs).await;
    assert!(source.search("nothing").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_details_by_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("id", "32793500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_tracks_json()))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, SourceKind::Discogs).await;
    let song = source.fetch_details("32793500").await.unwrap();
    assert_eq!(song.title(), "Get Lucky");
    assert_eq!(song.source(), SourceKind::Discogs);
}

#[tokio::test]
async fn test_fetch_details_missing_id_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("id", "404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_tracks_json()))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, SourceKind::AudioDb).await;
    let err = source.fetch_details("404").await.unwrap_err();
    assert!(matches!(err, SourceError::Decode(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unparsable_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, SourceKind::AudioDb).await;
    let err = source.search("anything").await.unwrap_err();
    assert!(matches!(err, SourceError::Decode(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_error_status_is_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = CatalogClient::builder(format!("{}/api/search", mock_server.uri()))
        .build()
        .unwrap();
    let err = client.search("anything").await.unwrap_err();
    assert!(matches!(err, Error::Status(503)));

    let source = CatalogSource::new(SourceKind::AudioDb, client, EngineSettings::default());
    let err = source.search("anything").await.unwrap_err();
    assert!(matches!(err, SourceError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    // Nothing listens on the discard port.
    let client = CatalogClient::builder("http://127.0.0.1:9/search")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    let source = CatalogSource::new(SourceKind::Discogs, client, EngineSettings::default());

    let err = source.search("anything").await.unwrap_err();
    assert!(matches!(err, SourceError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_endpoint_query_parameters_are_preserved() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("key", "secret"))
        .and(query_param("query", "a&b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_tracks_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CatalogClient::builder(format!("{}/api/search?key=secret", mock_server.uri()))
        .build()
        .unwrap();
    assert_eq!(client.search("a&b").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_catalog_song_plays_through_engine() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_tracks_json()))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, SourceKind::AudioDb).await;
    let song = source.search("lucky").await.unwrap().remove(0);

    source.prepare_playback(song.clone()).await.unwrap();
    assert_eq!(*source.state().borrow(), PlaybackState::Loading);
    source.start_playback().await.unwrap();
    assert_eq!(*source.state().borrow(), PlaybackState::Playing);
    assert_eq!(source.progress().borrow().duration(), 369.0);

    source.shutdown().await;
    assert!(matches!(
        source.search("lucky").await,
        Err(SourceError::Disposed(SourceKind::AudioDb))
    ));
}
