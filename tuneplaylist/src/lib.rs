//! # tuneplaylist - Playlist ordonnée avec curseur circulaire
//!
//! Cette crate fournit :
//! - Une playlist ordonnée (doublons autorisés) avec un curseur courant
//! - Navigation circulaire (`next` / `previous`)
//! - Déplacement et suppression qui préservent le morceau courant
//! - Statistiques de durée (`H:MM:SS` / `M:SS`)
//! - Des points d'accroche de persistance (`PlaylistStore`)
//!
//! # Exemple d'utilisation
//!
//! ```
//! use tuneplaylist::Playlist;
//! use tunesource::Song;
//!
//! let mut playlist = Playlist::new();
//! playlist.add(Song::local("1", "One", "Artist", "Album", 61.0, "/m/1.mp3"));
//! playlist.add(Song::local("2", "Two", "Artist", "Album", 62.0, "/m/2.mp3"));
//!
//! assert_eq!(playlist.next().map(|s| s.id()), Some("2"));
//! assert_eq!(playlist.next().map(|s| s.id()), Some("1"));
//! assert_eq!(playlist.formatted_total_duration(), "2:03");
//! ```

mod error;
mod playlist;
mod store;

// Réexports publics
pub use error::{Error, Result};
pub use playlist::{Playlist, Playlist as PlaylistManager, PlaylistSnapshot};
pub use store::{JsonPlaylistStore, MemoryPlaylistStore, PlaylistStore};
