use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tunesource::{Song, SourceKind};

use crate::session::SessionSignal;

/// Coordinator notifications that are not part of the mirrored state.
///
/// Unlike the `watch` streams, every event is delivered to every subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    /// A different provider became the active one.
    ActiveSourceChanged { kind: SourceKind },
    /// The selection hint changed.
    SourceSelected { kind: SourceKind },
    /// `play_song` started for this song.
    PlaybackRequested { song: Song },
    /// A provider call failed; the mirrored state is now `Error`.
    PlaybackFailed { kind: SourceKind, message: String },
    /// A song was routed to a kind with no registered provider.
    UnknownSource { kind: SourceKind, song_id: String },
    PlaylistChanged { len: usize, current_index: usize },
    Session(SessionSignal),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CoordinatorEventBus {
    subscribers: Arc<Mutex<Vec<UnboundedSender<CoordinatorEvent>>>>,
}

impl CoordinatorEventBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&self) -> UnboundedReceiver<CoordinatorEvent> {
        let (tx, rx) = unbounded_channel();
        self.lock().push(tx);
        rx
    }

    pub(crate) fn broadcast(&self, event: CoordinatorEvent) {
        self.lock().retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<UnboundedSender<CoordinatorEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_reaches_every_subscriber() {
        let bus = CoordinatorEventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.broadcast(CoordinatorEvent::SourceSelected {
            kind: SourceKind::Spotify,
        });

        let expected = CoordinatorEvent::SourceSelected {
            kind: SourceKind::Spotify,
        };
        assert_eq!(first.try_recv().unwrap(), expected);
        assert_eq!(second.try_recv().unwrap(), expected);
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let bus = CoordinatorEventBus::new();
        let rx = bus.subscribe();
        drop(rx);
        bus.broadcast(CoordinatorEvent::Session(SessionSignal::Interrupted));
        assert!(bus.lock().is_empty());
    }
}
