//! [`MusicProvider`] backed by a [`CatalogClient`].

use tokio::sync::Mutex;
use tracing::{debug, warn};
use tunesource::{
    async_trait, EngineSettings, MusicProvider, PlaybackEngine, Result, Song, SourceError,
    SourceKind,
};

use crate::client::CatalogClient;

/// A remote catalog source (TheAudioDB, Discogs).
///
/// Catalog requests of one source are issued one at a time.
#[derive(Debug)]
pub struct CatalogSource {
    name: String,
    client: CatalogClient,
    engine: PlaybackEngine,
    requests: Mutex<()>,
}

impl CatalogSource {
    pub fn new(kind: SourceKind, client: CatalogClient, settings: EngineSettings) -> Self {
        debug!(source = %kind, endpoint = %client.endpoint(), "Catalog source created");
        Self {
            name: kind.display_name().to_string(),
            client,
            engine: PlaybackEngine::new(kind, settings),
            requests: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }
}

#[async_trait]
impl MusicProvider for CatalogSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    async fn search(&self, query: &str) -> Result<Vec<Song>> {
        self.engine.ensure_alive()?;
        let _guard = self.requests.lock().await;

        let records = self.client.search(query).await.map_err(|err| {
            warn!(source = %self.kind(), query = %query, error = %err, "Catalog search failed");
            SourceError::from(err)
        })?;

        let total = records.len();
        let songs: Vec<Song> = records
            .into_iter()
            .filter_map(|record| record.into_song(self.kind(), self.client.endpoint()))
            .collect();

        if songs.len() < total {
            debug!(source = %self.kind(), skipped = total - songs.len(), "Skipped records without id");
        }
        debug!(source = %self.kind(), query = %query, results = songs.len(), "Search");
        Ok(songs)
    }

    async fn fetch_details(&self, id: &str) -> Result<Song> {
        self.engine.ensure_alive()?;
        let _guard = self.requests.lock().await;

        let record = self.client.lookup(id).await.map_err(|err| {
            warn!(source = %self.kind(), id = %id, error = %err, "Catalog lookup failed");
            SourceError::from(err)
        })?;

        record
            .into_song(self.kind(), self.client.endpoint())
            .ok_or_else(|| SourceError::decode(format!("record for {} has no id", id)))
    }
}
