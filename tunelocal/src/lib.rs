//! # TuneLocal
//!
//! Sources backed by an in-memory catalog: the local music library and the
//! Spotify streaming mock. Both share [`LibrarySource`]; only the catalog
//! differs.

pub mod library;
mod source;

pub use source::LibrarySource;
