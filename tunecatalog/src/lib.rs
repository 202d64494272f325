//! # TuneCatalog
//!
//! Sources backed by a remote HTTP catalog: TheAudioDB and Discogs.
//!
//! Both catalogs share one search contract (see [`CatalogClient`]) and one
//! response shape (see [`models`]). A [`CatalogSource`] wraps a client and a
//! playback engine to provide the [`tunesource::MusicProvider`] surface.
//!
//! ## Example
//!
//! ```no_run
//! use tunecatalog::{CatalogClient, CatalogSource};
//! use tunesource::{EngineSettings, MusicProvider, SourceKind};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CatalogClient::builder("https://catalog.example/search").build()?;
//! let source = CatalogSource::new(SourceKind::AudioDb, client, EngineSettings::default());
//! for song in source.search("coldplay").await? {
//!     println!("{} - {}", song.artist(), song.title());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config_ext;
pub mod error;
pub mod models;
mod source;

pub use client::{CatalogClient, ClientBuilder};
pub use config_ext::CatalogConfigExt;
pub use error::{Error, Result};
pub use models::{TrackList, TrackRecord};
pub use source::CatalogSource;
