//! Extension pour intégrer les catalogues dans tuneconfig
//!
//! Ce module fournit le trait `CatalogConfigExt` qui ajoute à
//! `tuneconfig::Config` la gestion des endpoints de recherche et du timeout
//! des requêtes.
//!
//! # Exemple
//!
//! ```no_run
//! use tuneconfig::Config;
//! use tunecatalog::CatalogConfigExt;
//! use tunesource::SourceKind;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load_config("")?;
//! let endpoint = config.get_catalog_endpoint(SourceKind::AudioDb)?;
//! println!("AudioDB endpoint: {}", endpoint);
//! # Ok(())
//! # }
//! ```

use crate::client::{DEFAULT_AUDIODB_ENDPOINT, DEFAULT_DISCOGS_ENDPOINT};
use anyhow::{anyhow, Result};
use serde_yaml::Value;
use std::time::Duration;
use tuneconfig::Config;
use tunesource::SourceKind;

/// Trait d'extension pour la configuration des catalogues
pub trait CatalogConfigExt {
    /// Endpoint de recherche du catalogue `kind`
    ///
    /// Retourne une erreur pour les sources qui ne sont pas des catalogues HTTP.
    fn get_catalog_endpoint(&self, kind: SourceKind) -> Result<String>;

    /// Définit l'endpoint de recherche du catalogue `kind`
    fn set_catalog_endpoint(&self, kind: SourceKind, endpoint: String) -> Result<()>;

    /// Timeout des requêtes HTTP
    fn get_catalog_timeout(&self) -> Result<Duration>;
}

fn default_endpoint(kind: SourceKind) -> Result<&'static str> {
    match kind {
        SourceKind::AudioDb => Ok(DEFAULT_AUDIODB_ENDPOINT),
        SourceKind::Discogs => Ok(DEFAULT_DISCOGS_ENDPOINT),
        other => Err(anyhow!("{} is not an HTTP catalog", other)),
    }
}

impl CatalogConfigExt for Config {
    fn get_catalog_endpoint(&self, kind: SourceKind) -> Result<String> {
        let default = default_endpoint(kind)?;
        Ok(self
            .get_string(&["catalog", "endpoints", kind.config_key()])
            .unwrap_or_else(|| default.to_string()))
    }

    fn set_catalog_endpoint(&self, kind: SourceKind, endpoint: String) -> Result<()> {
        default_endpoint(kind)?;
        self.set_value(
            &["catalog", "endpoints", kind.config_key()],
            Value::String(endpoint),
        )
    }

    fn get_catalog_timeout(&self) -> Result<Duration> {
        Ok(Duration::from_secs(self.get_request_timeout_secs()? as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_come_from_config() {
        let config = Config::from_yaml_str(
            "catalog:\n  endpoints:\n    audiodb: http://127.0.0.1:9/search\n",
        )
        .unwrap();
        assert_eq!(
            config.get_catalog_endpoint(SourceKind::AudioDb).unwrap(),
            "http://127.0.0.1:9/search"
        );
        assert!(config.get_catalog_endpoint(SourceKind::Local).is_err());
    }

    #[test]
    fn test_set_endpoint_and_timeout() {
        let config = Config::defaults().unwrap();
        config
            .set_catalog_endpoint(SourceKind::Discogs, "http://localhost/d".into())
            .unwrap();
        assert_eq!(
            config.get_catalog_endpoint(SourceKind::Discogs).unwrap(),
            "http://localhost/d"
        );
        assert!(config
            .set_catalog_endpoint(SourceKind::Spotify, "http://x".into())
            .is_err());
        assert_eq!(config.get_catalog_timeout().unwrap(), Duration::from_secs(10));
    }
}
