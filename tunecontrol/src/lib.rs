//! # TuneControl
//!
//! Playback coordinator for TuneDeck: routes songs to the provider of their
//! source kind, mirrors the active provider's streams, drives the playlist and
//! reacts to audio-session interruptions.

mod events;

pub mod config_ext;
pub mod coordinator;
pub mod errors;
pub mod factory;
pub mod session;

pub use config_ext::ControlConfigExt;
pub use coordinator::{CoordinatorBuilder, PlaybackCoordinator};
pub use errors::{ControlError, Result};
pub use events::CoordinatorEvent;
pub use factory::{SourceSettings, create_all, create_source};
pub use session::{SessionBridge, SessionSignal};
