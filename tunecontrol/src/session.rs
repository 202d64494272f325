//! Audio-session signals from the host platform.
//!
//! The platform layer feeds two signals into a [`SessionBridge`]; the
//! coordinator maps `Interrupted` to pause and `Resumed` to play.

use tokio::sync::broadcast;
use tracing::trace;

const SESSION_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// Another audio client took over (call, alarm, ...).
    Interrupted,
    /// The interruption ended.
    Resumed,
}

/// Fan-out point for session signals. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct SessionBridge {
    tx: broadcast::Sender<SessionSignal>,
}

impl Default for SessionBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBridge {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn send(&self, signal: SessionSignal) {
        if self.tx.send(signal).is_err() {
            trace!(?signal, "Session signal dropped: no listener");
        }
    }

    pub fn interrupted(&self) {
        self.send(SessionSignal::Interrupted);
    }

    pub fn resumed(&self) {
        self.send(SessionSignal::Resumed);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.tx.subscribe()
    }
}
