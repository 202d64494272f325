//! Builds one provider per source kind.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tunecatalog::client::{
    DEFAULT_AUDIODB_ENDPOINT, DEFAULT_DISCOGS_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use tunecatalog::{CatalogClient, CatalogConfigExt, CatalogSource};
use tuneconfig::Config;
use tunelocal::LibrarySource;
use tunesource::{DEFAULT_TICK_INTERVAL, EngineSettings, MusicProvider, SourceKind};

use crate::config_ext::ControlConfigExt;
use crate::errors::{ControlError, Result};

/// Everything the factory needs to build providers.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub tick_interval: Duration,
    pub buffering_delays: HashMap<SourceKind, Duration>,
    pub catalog_endpoints: HashMap<SourceKind, String>,
    pub request_timeout: Duration,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            buffering_delays: HashMap::new(),
            catalog_endpoints: HashMap::from([
                (SourceKind::AudioDb, DEFAULT_AUDIODB_ENDPOINT.to_string()),
                (SourceKind::Discogs, DEFAULT_DISCOGS_ENDPOINT.to_string()),
            ]),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl SourceSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut settings = Self {
            tick_interval: config.get_tick_interval()?,
            request_timeout: config.get_catalog_timeout()?,
            ..Self::default()
        };

        for kind in SourceKind::ALL {
            settings
                .buffering_delays
                .insert(kind, config.get_buffering_delay(kind)?);
        }
        for kind in [SourceKind::AudioDb, SourceKind::Discogs] {
            settings
                .catalog_endpoints
                .insert(kind, config.get_catalog_endpoint(kind)?);
        }
        Ok(settings)
    }

    pub fn with_endpoint(mut self, kind: SourceKind, endpoint: impl Into<String>) -> Self {
        self.catalog_endpoints.insert(kind, endpoint.into());
        self
    }

    pub fn with_buffering_delay(mut self, kind: SourceKind, delay: Duration) -> Self {
        self.buffering_delays.insert(kind, delay);
        self
    }

    pub fn engine_settings(&self, kind: SourceKind) -> EngineSettings {
        EngineSettings {
            tick_interval: self.tick_interval,
            buffering_delay: self
                .buffering_delays
                .get(&kind)
                .copied()
                .unwrap_or(Duration::ZERO),
        }
    }
}

/// Creates the provider for `kind`.
pub fn create_source(kind: SourceKind, settings: &SourceSettings) -> Result<Arc<dyn MusicProvider>> {
    let engine = settings.engine_settings(kind);

    let provider: Arc<dyn MusicProvider> = match kind {
        SourceKind::Local => Arc::new(LibrarySource::local_library(engine)),
        SourceKind::Spotify => Arc::new(LibrarySource::spotify(engine)),
        SourceKind::AudioDb | SourceKind::Discogs => {
            let endpoint = settings
                .catalog_endpoints
                .get(&kind)
                .ok_or_else(|| ControlError::source_build(kind, "no catalog endpoint"))?;
            let client = CatalogClient::builder(endpoint.as_str())
                .timeout(settings.request_timeout)
                .build()
                .map_err(|err| ControlError::source_build(kind, err))?;
            Arc::new(CatalogSource::new(kind, client, engine))
        }
    };

    debug!(source = %kind, name = provider.name(), "Source created");
    Ok(provider)
}

/// Creates one provider for every [`SourceKind`].
pub fn create_all(settings: &SourceSettings) -> Result<HashMap<SourceKind, Arc<dyn MusicProvider>>> {
    SourceKind::ALL
        .into_iter()
        .map(|kind| Ok((kind, create_source(kind, settings)?)))
        .collect()
}
