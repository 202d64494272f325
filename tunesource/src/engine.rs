//! Simulated playback clock.
//!
//! Every provider owns one [`PlaybackEngine`]. The engine holds the
//! provider's `(song, state, progress)` triple behind a single async mutex,
//! so transport calls and clock ticks never interleave. Each value is also
//! published on a `watch` channel that replays the latest value to new
//! subscribers.
//!
//! While playing, a background task advances the position by one second per
//! tick and runs the stop transition as soon as the position reaches the
//! song's duration. The tick task carries a generation number; any transport
//! call that cancels ticking bumps the generation, so a tick that was already
//! waiting on the lock exits without touching the state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::error::{Result, SourceError};
use crate::song::{Song, SourceKind};
use crate::state::{PlaybackProgress, PlaybackState};

/// Default clock period.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Seconds added to the position on every tick.
const TICK_STEP_SECONDS: f64 = 1.0;

/// Timing knobs for a [`PlaybackEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Clock period.
    pub tick_interval: Duration,
    /// Simulated buffering time spent in `prepare` after entering `Loading`.
    pub buffering_delay: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            buffering_delay: Duration::ZERO,
        }
    }
}

impl EngineSettings {
    pub fn with_buffering_delay(mut self, delay: Duration) -> Self {
        self.buffering_delay = delay;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }
}

/// Per-provider playback state machine with its progress clock.
///
/// Cloning shares the same engine.
#[derive(Debug, Clone)]
pub struct PlaybackEngine {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    kind: SourceKind,
    settings: EngineSettings,
    inner: Mutex<Inner>,
    disposed: AtomicBool,
    state_tx: watch::Sender<PlaybackState>,
    progress_tx: watch::Sender<PlaybackProgress>,
    song_tx: watch::Sender<Option<Song>>,
}

#[derive(Debug, Default)]
struct Inner {
    song: Option<Song>,
    state: PlaybackState,
    progress: PlaybackProgress,
    ticker: Option<JoinHandle<()>>,
    generation: u64,
}

impl PlaybackEngine {
    pub fn new(kind: SourceKind, settings: EngineSettings) -> Self {
        let (state_tx, _) = watch::channel(PlaybackState::Stopped);
        let (progress_tx, _) = watch::channel(PlaybackProgress::default());
        let (song_tx, _) = watch::channel(None);

        Self {
            shared: Arc::new(Shared {
                kind,
                settings,
                inner: Mutex::new(Inner::default()),
                disposed: AtomicBool::new(false),
                state_tx,
                progress_tx,
                song_tx,
            }),
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.shared.kind
    }

    pub fn settings(&self) -> EngineSettings {
        self.shared.settings
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::Acquire)
    }

    /// Fails with [`SourceError::Disposed`] once [`PlaybackEngine::shutdown`]
    /// has run.
    pub fn ensure_alive(&self) -> Result<()> {
        if self.is_disposed() {
            Err(SourceError::Disposed(self.shared.kind))
        } else {
            Ok(())
        }
    }

    pub fn state(&self) -> watch::Receiver<PlaybackState> {
        self.shared.state_tx.subscribe()
    }

    pub fn progress(&self) -> watch::Receiver<PlaybackProgress> {
        self.shared.progress_tx.subscribe()
    }

    pub fn current_song(&self) -> watch::Receiver<Option<Song>> {
        self.shared.song_tx.subscribe()
    }

    /// Loads `song`, enters `Loading` and waits the buffering delay.
    ///
    /// Any running clock is cancelled and the position is reset to the start
    /// of the new song before the delay begins.
    pub async fn prepare(&self, song: Song) -> Result<()> {
        {
            let mut inner = self.lock_alive().await?;
            self.shared.cancel_ticker(&mut inner);

            debug!(source = %self.shared.kind, song = song.id(), title = song.title(), "Preparing playback");
            let progress = PlaybackProgress::start_of(song.duration());
            inner.song = Some(song.clone());
            self.shared.song_tx.send_replace(Some(song));
            self.shared.set_progress(&mut inner, progress);
            self.shared.set_state(&mut inner, PlaybackState::Loading);
        }

        let delay = self.shared.settings.buffering_delay;
        if !delay.is_zero() {
            time::sleep(delay).await;
        }
        Ok(())
    }

    /// Enters `Playing` and (re)starts the clock from the current position.
    pub async fn start(&self) -> Result<()> {
        let mut inner = self.lock_alive().await?;
        self.shared.cancel_ticker(&mut inner);
        self.shared.set_state(&mut inner, PlaybackState::Playing);

        let generation = inner.generation;
        inner.ticker = Some(self.spawn_ticker(generation));
        debug!(source = %self.shared.kind, position = inner.progress.current_time(), "Playback started");
        Ok(())
    }

    /// Enters `Paused`; the position is frozen.
    pub async fn pause(&self) -> Result<()> {
        let mut inner = self.lock_alive().await?;
        self.shared.cancel_ticker(&mut inner);
        self.shared.set_state(&mut inner, PlaybackState::Paused);
        debug!(source = %self.shared.kind, position = inner.progress.current_time(), "Playback paused");
        Ok(())
    }

    /// Enters `Stopped` and rewinds to the start of the current song.
    pub async fn stop(&self) -> Result<()> {
        let mut inner = self.lock_alive().await?;
        self.shared.stop_locked(&mut inner);
        Ok(())
    }

    /// Moves the position without changing the transport state.
    ///
    /// The target is clamped to `[0, duration]` when a song is loaded, and to
    /// `>= 0` otherwise. Non-finite targets rewind to 0.
    pub async fn seek(&self, time: f64) -> Result<()> {
        let mut inner = self.lock_alive().await?;
        let duration = inner.progress.duration();
        let time = if !time.is_finite() {
            0.0
        } else if duration > 0.0 {
            time.clamp(0.0, duration)
        } else {
            time.max(0.0)
        };

        let progress = inner.progress.at(time);
        self.shared.set_progress(&mut inner, progress);
        debug!(source = %self.shared.kind, position = time, "Seek");
        Ok(())
    }

    /// Stops the clock and refuses every later transport call.
    pub async fn shutdown(&self) {
        let mut inner = self.shared.inner.lock().await;
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shared.cancel_ticker(&mut inner);
        self.shared.set_state(&mut inner, PlaybackState::Stopped);
        debug!(source = %self.shared.kind, "Playback engine disposed");
    }

    async fn lock_alive(&self) -> Result<MutexGuard<'_, Inner>> {
        let inner = self.shared.inner.lock().await;
        self.ensure_alive()?;
        Ok(inner)
    }

    fn spawn_ticker(&self, generation: u64) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        let period = shared.settings.tick_interval;

        tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let mut inner = shared.inner.lock().await;
                if inner.generation != generation || inner.state != PlaybackState::Playing {
                    break;
                }

                let progress = inner.progress.advanced_by(TICK_STEP_SECONDS);
                shared.set_progress(&mut inner, progress);
                trace!(source = %shared.kind, position = progress.current_time(), "Tick");

                if progress.is_finished() {
                    // Detach ourselves before stopping so stop_locked does not abort this task.
                    inner.ticker = None;
                    debug!(source = %shared.kind, "Reached end of song");
                    shared.stop_locked(&mut inner);
                    break;
                }
            }
        })
    }
}

impl Shared {
    fn cancel_ticker(&self, inner: &mut Inner) {
        inner.generation = inner.generation.wrapping_add(1);
        if let Some(handle) = inner.ticker.take() {
            handle.abort();
        }
    }

    fn stop_locked(&self, inner: &mut Inner) {
        self.cancel_ticker(inner);
        let duration = inner.song.as_ref().map(Song::duration).unwrap_or(0.0);
        self.set_state(inner, PlaybackState::Stopped);
        self.set_progress(inner, PlaybackProgress::start_of(duration));
        debug!(source = %self.kind, "Playback stopped");
    }

    fn set_state(&self, inner: &mut Inner, state: PlaybackState) {
        inner.state = state.clone();
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }

    fn set_progress(&self, inner: &mut Inner, progress: PlaybackProgress) {
        inner.progress = progress;
        self.progress_tx.send_replace(progress);
    }
}
