//! HTTP client for catalog search endpoints

use crate::error::{Error, Result};
use crate::models::{TrackList, TrackRecord};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default TheAudioDB search endpoint
pub const DEFAULT_AUDIODB_ENDPOINT: &str =
    "https://www.theaudiodb.com/api/v1/json/2/searchtrack.php";

/// Default Discogs search endpoint
pub const DEFAULT_DISCOGS_ENDPOINT: &str = "https://api.discogs.com/database/tracks";

/// Default timeout for catalog requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = concat!("tunecatalog/", env!("CARGO_PKG_VERSION"));

/// Catalog HTTP client
///
/// Speaks the catalog search contract:
///
/// - `GET <endpoint>?query=<text>` for searches
/// - `GET <endpoint>?id=<id>` for detail lookups
///
/// Both answer with a [`TrackList`].
///
/// # Example
///
/// ```no_run
/// use tunecatalog::CatalogClient;
///
/// # async fn run() -> tunecatalog::Result<()> {
/// let client = CatalogClient::builder("https://catalog.example/search").build()?;
/// let records = client.search("daft punk").await?;
/// println!("{} records", records.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    endpoint: Url,
    request_timeout: Duration,
}

impl CatalogClient {
    /// Create a builder for the given endpoint
    pub fn builder(endpoint: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(endpoint)
    }

    /// Create a client with a custom reqwest::Client and default timeout
    pub fn with_client(client: Client, endpoint: &str) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Search the catalog
    ///
    /// The query is forwarded verbatim, URL-encoded.
    pub async fn search(&self, query: &str) -> Result<Vec<TrackRecord>> {
        let list = self.fetch("query", query).await?;
        Ok(list.into_records())
    }

    /// Fetch a single record by id
    ///
    /// Fails with [`Error::TrackNotFound`] when the response has no record
    /// carrying this id.
    pub async fn lookup(&self, id: &str) -> Result<TrackRecord> {
        self.fetch("id", id)
            .await?
            .into_records()
            .into_iter()
            .find(|record| record.id.as_deref() == Some(id))
            .ok_or_else(|| Error::TrackNotFound(id.to_string()))
    }

    async fn fetch(&self, key: &str, value: &str) -> Result<TrackList> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair(key, value);

        debug!(url = %url, "Catalog request");
        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Builder for [`CatalogClient`]
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    endpoint: String,
    client: Option<Client>,
    timeout: Duration,
    user_agent: String,
}

impl ClientBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Use a custom reqwest client (the user agent setting is then ignored)
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<CatalogClient> {
        let endpoint = Url::parse(&self.endpoint)?;
        let client = match self.client {
            Some(client) => client,
            None => Client::builder().user_agent(self.user_agent).build()?,
        };

        Ok(CatalogClient {
            client,
            endpoint,
            request_timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = CatalogClient::builder(DEFAULT_AUDIODB_ENDPOINT).build().unwrap();
        assert_eq!(client.endpoint().as_str(), DEFAULT_AUDIODB_ENDPOINT);
        assert_eq!(
            client.request_timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_builder_rejects_invalid_endpoint() {
        let err = CatalogClient::builder("not a url").build().unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_with_client() {
        let client =
            CatalogClient::with_client(Client::new(), DEFAULT_DISCOGS_ENDPOINT).unwrap();
        assert_eq!(client.endpoint().host_str(), Some("api.discogs.com"));
    }
}
