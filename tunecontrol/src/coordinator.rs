//! The playback coordinator.
//!
//! One coordinator owns every provider (one per [`SourceKind`]), the
//! playlist, and mirrored copies of the active provider's state, progress and
//! current song. Commands are forwarded to the active provider; the mirrors
//! follow whichever provider is active.
//!
//! Four things trigger playback changes:
//!
//! 1. [`PlaybackCoordinator::play_song`], routed by the song's source kind.
//! 2. Transport commands (`play`, `pause`, `stop`, `seek`, `next`, `previous`).
//! 3. A playlist edit that changes the identity of the current song.
//! 4. Session signals from a [`SessionBridge`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{Mutex, MutexGuard, RwLock, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use tuneconfig::Config;
use tuneplaylist::{JsonPlaylistStore, Playlist, PlaylistSnapshot, PlaylistStore};
use tunesource::{MusicProvider, PlaybackProgress, PlaybackState, Song, SourceError, SourceKind};

use crate::config_ext::ControlConfigExt;
use crate::errors::{ControlError, Result};
use crate::events::{CoordinatorEvent, CoordinatorEventBus};
use crate::factory::{self, SourceSettings};
use crate::session::{SessionBridge, SessionSignal};

/// Handle on the playback coordinator. Cloning shares the same coordinator.
#[derive(Debug, Clone)]
pub struct PlaybackCoordinator {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    providers: HashMap<SourceKind, Arc<dyn MusicProvider>>,
    active: Mutex<Option<ActiveSource>>,
    selected: RwLock<SourceKind>,
    playlist: Mutex<Playlist>,
    /// Serializes `play_song` end-to-end and orders transport commands after it.
    play_gate: Mutex<()>,
    mirrors: Arc<Mirrors>,
    playlist_tx: watch::Sender<PlaylistSnapshot>,
    events: CoordinatorEventBus,
    store: Option<Arc<dyn PlaylistStore>>,
    tasks: std::sync::Mutex<Vec<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

#[derive(Debug)]
struct ActiveSource {
    kind: SourceKind,
    provider: Arc<dyn MusicProvider>,
    forwarder: JoinHandle<()>,
}

/// Mirrored streams of the active provider.
#[derive(Debug)]
struct Mirrors {
    state: watch::Sender<PlaybackState>,
    progress: watch::Sender<PlaybackProgress>,
    song: watch::Sender<Option<Song>>,
    /// Bumped on every re-binding; a forwarder only publishes for its epoch.
    epoch: AtomicU64,
    /// Set while the mirrored state is `Error`; provider states are not relayed.
    error_latched: AtomicBool,
}

impl Mirrors {
    fn new() -> Self {
        Self {
            state: watch::channel(PlaybackState::Stopped).0,
            progress: watch::channel(PlaybackProgress::default()).0,
            song: watch::channel(None).0,
            epoch: AtomicU64::new(0),
            error_latched: AtomicBool::new(false),
        }
    }

    fn publish_state(&self, state: PlaybackState) {
        self.state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }

    /// Publishes a state coming from the provider, unless an error is latched.
    ///
    /// The latch is read and written under the state channel's lock, so a
    /// relay racing `latch_error` cannot land after the error.
    fn relay_state(&self, state: PlaybackState) {
        self.state.send_if_modified(|current| {
            if self.is_error_latched() || *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }

    fn latch_error(&self, message: String) {
        self.state.send_modify(|current| {
            self.error_latched.store(true, Ordering::Release);
            *current = PlaybackState::Error(message);
        });
    }

    fn clear_error(&self) {
        self.error_latched.store(false, Ordering::Release);
    }

    fn is_error_latched(&self) -> bool {
        self.error_latched.load(Ordering::Acquire)
    }

    fn publish_progress(&self, progress: PlaybackProgress) {
        self.progress.send_replace(progress);
    }

    fn publish_song(&self, song: Option<Song>) {
        self.song.send_if_modified(|current| {
            let changed = current.as_ref().map(Song::id) != song.as_ref().map(Song::id);
            *current = song;
            changed
        });
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::Acquire) == epoch
    }

    /// Copies the provider's current values into the mirrors.
    fn sync_from(&self, provider: &dyn MusicProvider) {
        let state = provider.state().borrow().clone();
        let progress = *provider.progress().borrow();
        let song = provider.current_song().borrow().clone();
        self.relay_state(state);
        self.publish_progress(progress);
        self.publish_song(song);
    }

    /// Makes the mirrors follow `provider`.
    ///
    /// The current values are copied before this returns; later changes are
    /// forwarded by the returned task.
    fn bind(self: &Arc<Self>, provider: &Arc<dyn MusicProvider>) -> JoinHandle<()> {
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;

        let mut state_rx = provider.state();
        let mut progress_rx = provider.progress();
        let mut song_rx = provider.current_song();

        let state = state_rx.borrow_and_update().clone();
        let progress = *progress_rx.borrow_and_update();
        let song = song_rx.borrow_and_update().clone();
        self.relay_state(state);
        self.publish_progress(progress);
        self.publish_song(song);

        let mirrors = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = state_rx.changed() => {
                        if changed.is_err() || !mirrors.is_current(epoch) {
                            break;
                        }
                        let state = state_rx.borrow_and_update().clone();
                        mirrors.relay_state(state);
                    }
                    changed = progress_rx.changed() => {
                        if changed.is_err() || !mirrors.is_current(epoch) {
                            break;
                        }
                        let progress = *progress_rx.borrow_and_update();
                        mirrors.publish_progress(progress);
                    }
                    changed = song_rx.changed() => {
                        if changed.is_err() || !mirrors.is_current(epoch) {
                            break;
                        }
                        let song = song_rx.borrow_and_update().clone();
                        mirrors.publish_song(song);
                    }
                }
            }
        })
    }
}

/// Builder for [`PlaybackCoordinator`]
#[derive(Debug, Default)]
pub struct CoordinatorBuilder {
    providers: HashMap<SourceKind, Arc<dyn MusicProvider>>,
    default_source: Option<SourceKind>,
    store: Option<Arc<dyn PlaylistStore>>,
}

impl CoordinatorBuilder {
    /// Registers a provider under its own kind, replacing any previous one.
    pub fn provider(mut self, provider: Arc<dyn MusicProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn providers(
        mut self,
        providers: impl IntoIterator<Item = (SourceKind, Arc<dyn MusicProvider>)>,
    ) -> Self {
        self.providers.extend(providers);
        self
    }

    /// Initial selection hint.
    pub fn default_source(mut self, kind: SourceKind) -> Self {
        self.default_source = Some(kind);
        self
    }

    pub fn playlist_store(mut self, store: Arc<dyn PlaylistStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> PlaybackCoordinator {
        let selected = self
            .default_source
            .filter(|kind| self.providers.contains_key(kind))
            .or_else(|| {
                SourceKind::ALL
                    .into_iter()
                    .find(|kind| self.providers.contains_key(kind))
            })
            .unwrap_or(SourceKind::Local);

        info!(
            sources = self.providers.len(),
            selected = %selected,
            "Playback coordinator created"
        );

        PlaybackCoordinator {
            inner: Arc::new(Inner {
                providers: self.providers,
                active: Mutex::new(None),
                selected: RwLock::new(selected),
                playlist: Mutex::new(Playlist::new()),
                play_gate: Mutex::new(()),
                mirrors: Arc::new(Mirrors::new()),
                playlist_tx: watch::channel(PlaylistSnapshot::default()).0,
                events: CoordinatorEventBus::new(),
                store: self.store,
                tasks: std::sync::Mutex::new(Vec::new()),
                shut_down: AtomicBool::new(false),
            }),
        }
    }
}

impl PlaybackCoordinator {
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::default()
    }

    /// Builds every provider from the configuration and a JSON playlist
    /// store at the configured path.
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = SourceSettings::from_config(config)?;
        let providers = factory::create_all(&settings)?;
        let store = JsonPlaylistStore::new(config.get_playlist_file()?);

        Ok(Self::builder()
            .providers(providers)
            .default_source(config.get_default_source()?)
            .playlist_store(Arc::new(store))
            .build())
    }

    // ============= Observation =============

    /// State of the active provider.
    pub fn state(&self) -> watch::Receiver<PlaybackState> {
        self.inner.mirrors.state.subscribe()
    }

    /// Progress of the active provider.
    pub fn progress(&self) -> watch::Receiver<PlaybackProgress> {
        self.inner.mirrors.progress.subscribe()
    }

    /// Song loaded in the active provider.
    pub fn current_song(&self) -> watch::Receiver<Option<Song>> {
        self.inner.mirrors.song.subscribe()
    }

    pub fn playlist(&self) -> watch::Receiver<PlaylistSnapshot> {
        self.inner.playlist_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> mpsc::UnboundedReceiver<CoordinatorEvent> {
        self.inner.events.subscribe()
    }

    /// Registered kinds, in declaration order.
    pub fn sources(&self) -> Vec<SourceKind> {
        SourceKind::ALL
            .into_iter()
            .filter(|kind| self.inner.providers.contains_key(kind))
            .collect()
    }

    pub fn provider(&self, kind: SourceKind) -> Option<Arc<dyn MusicProvider>> {
        self.inner.providers.get(&kind).cloned()
    }

    pub async fn active_source(&self) -> Option<SourceKind> {
        self.inner.active.lock().await.as_ref().map(|active| active.kind)
    }

    pub async fn selected_source(&self) -> SourceKind {
        *self.inner.selected.read().await
    }

    // ============= Source selection =============

    /// Changes the selection hint used by [`search`](Self::search) and
    /// [`fetch_details`](Self::fetch_details).
    ///
    /// Playback is routed by each song's own kind, so the active provider and
    /// the current playback are left untouched.
    pub async fn switch_music_source(&self, kind: SourceKind) -> Result<()> {
        if !self.inner.providers.contains_key(&kind) {
            warn!(source = %kind, "Cannot select unregistered source");
            return Err(ControlError::UnknownSource(kind));
        }

        let mut selected = self.inner.selected.write().await;
        let previous = *selected;
        if previous != kind {
            info!(from = %previous, to = %kind, "Music source selected");
            *selected = kind;
            self.inner
                .events
                .broadcast(CoordinatorEvent::SourceSelected { kind });
        }
        Ok(())
    }

    /// Searches the selected source.
    pub async fn search(&self, query: &str) -> Result<Vec<Song>> {
        let provider = self.selected_provider().await?;
        Ok(provider.search(query).await?)
    }

    /// Fetches a song from the selected source.
    pub async fn fetch_details(&self, id: &str) -> Result<Song> {
        let provider = self.selected_provider().await?;
        Ok(provider.fetch_details(id).await?)
    }

    // ============= Playback =============

    /// Plays `song` on the provider of its source kind.
    ///
    /// Fails only with [`ControlError::UnknownSource`], leaving the
    /// coordinator untouched. Provider failures are reported through the
    /// state stream as [`PlaybackState::Error`].
    pub async fn play_song(&self, song: Song) -> Result<()> {
        let kind = song.source();
        let Some(provider) = self.provider(kind) else {
            warn!(source = %kind, song = song.id(), "No provider registered for song source");
            self.inner.events.broadcast(CoordinatorEvent::UnknownSource {
                kind,
                song_id: song.id().to_string(),
            });
            return Err(ControlError::UnknownSource(kind));
        };

        let _gate = self.lock_gate().await;
        self.play_song_locked(provider, song).await;
        Ok(())
    }

    /// Starts or resumes the active provider.
    ///
    /// From the `Error` state this replays the active song from the start.
    pub async fn play(&self) {
        let _gate = self.lock_gate().await;
        let Some((kind, provider)) = self.active_provider().await else {
            debug!("play ignored: no active source");
            return;
        };

        if self.inner.mirrors.is_error_latched() {
            let song = provider.current_song().borrow().clone();
            if let Some(song) = song {
                info!(source = %kind, song = song.id(), "Retrying playback after error");
                self.start_song(provider, song).await;
                return;
            }
            self.inner.mirrors.clear_error();
            self.inner.mirrors.sync_from(provider.as_ref());
        }

        let result = provider.start_playback().await;
        self.report(kind, "play", result);
    }

    pub async fn pause(&self) {
        let _gate = self.lock_gate().await;
        if self.ignored_in_error("pause") {
            return;
        }
        if let Some((kind, provider)) = self.active_provider().await {
            let result = provider.pause_playback().await;
            self.report(kind, "pause", result);
        }
    }

    pub async fn stop(&self) {
        let _gate = self.lock_gate().await;
        if self.ignored_in_error("stop") {
            return;
        }
        if let Some((kind, provider)) = self.active_provider().await {
            let result = provider.stop_playback().await;
            self.report(kind, "stop", result);
        }
    }

    pub async fn seek(&self, time: f64) {
        let _gate = self.lock_gate().await;
        if self.ignored_in_error("seek") {
            return;
        }
        if let Some((kind, provider)) = self.active_provider().await {
            let result = provider.seek(time).await;
            self.report(kind, "seek", result);
        }
    }

    /// Advances the playlist cursor and plays the new current song.
    pub async fn next(&self) -> Option<Song> {
        self.navigate(|playlist| playlist.next().cloned()).await
    }

    /// Moves the playlist cursor back and plays the new current song.
    pub async fn previous(&self) -> Option<Song> {
        self.navigate(|playlist| playlist.previous().cloned()).await
    }

    // ============= Playlist =============

    /// Appends a song; plays it when it becomes the current song.
    pub async fn add_to_playlist(&self, song: Song) {
        self.edit_playlist(move |playlist| playlist.add(song)).await
    }

    pub async fn remove_from_playlist(&self, index: usize) -> Option<Song> {
        self.edit_playlist(move |playlist| playlist.remove(index))
            .await
    }

    pub async fn move_in_playlist(&self, from: usize, to: usize) -> bool {
        self.edit_playlist(move |playlist| playlist.move_song(from, to))
            .await
    }

    /// Puts the cursor on `index` and plays that song.
    pub async fn select_in_playlist(&self, index: usize) -> Option<Song> {
        self.navigate(move |playlist| playlist.select(index).cloned())
            .await
    }

    pub async fn clear_playlist(&self) {
        self.edit_playlist(|playlist| playlist.clear()).await
    }

    pub async fn playlist_snapshot(&self) -> PlaylistSnapshot {
        self.inner.playlist.lock().await.snapshot()
    }

    pub async fn playlist_total_duration(&self) -> f64 {
        self.inner.playlist.lock().await.total_duration()
    }

    pub async fn formatted_playlist_duration(&self) -> String {
        self.inner.playlist.lock().await.formatted_total_duration()
    }

    /// Replaces the playlist with the stored one. Nothing starts playing.
    pub async fn load_playlist(&self) -> Result<usize> {
        let store = self.store()?;
        let songs = store.load_playlist().await?;
        let count = songs.len();

        let mut playlist = self.inner.playlist.lock().await;
        playlist.replace(songs);
        self.publish_playlist(&playlist);
        info!(songs = count, "Playlist restored");
        Ok(count)
    }

    pub async fn save_playlist(&self) -> Result<()> {
        let store = self.store()?;
        let songs = self.inner.playlist.lock().await.songs().to_vec();
        store.save_playlist(&songs).await?;
        debug!(songs = songs.len(), "Playlist saved");
        Ok(())
    }

    // ============= Session =============

    /// Pauses on `Interrupted` and resumes on `Resumed` signals of `bridge`.
    pub fn attach_session(&self, bridge: &SessionBridge) {
        let mut signals = bridge.subscribe();
        let weak = Arc::downgrade(&self.inner);

        let handle = tokio::spawn(async move {
            loop {
                match signals.recv().await {
                    Ok(signal) => {
                        let Some(inner) = weak.upgrade() else {
                            break;
                        };
                        PlaybackCoordinator { inner }
                            .handle_session_signal(signal)
                            .await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Session signals lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        self.lock_tasks().push(handle);
    }

    pub async fn handle_session_signal(&self, signal: SessionSignal) {
        info!(?signal, "Session signal");
        self.inner.events.broadcast(CoordinatorEvent::Session(signal));
        match signal {
            SessionSignal::Interrupted => self.pause().await,
            SessionSignal::Resumed => self.play().await,
        }
    }

    // ============= Lifecycle =============

    /// Stops forwarding, disposes every provider and ends session listeners.
    pub async fn shutdown(&self) {
        if self.inner.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }

        for handle in self.lock_tasks().drain(..) {
            handle.abort();
        }

        let _gate = self.inner.play_gate.lock().await;
        if let Some(active) = self.inner.active.lock().await.take() {
            active.forwarder.abort();
        }
        self.inner.mirrors.epoch.fetch_add(1, Ordering::AcqRel);

        for (kind, provider) in &self.inner.providers {
            provider.shutdown().await;
            debug!(source = %kind, "Provider disposed");
        }
        self.inner.mirrors.clear_error();
        self.inner.mirrors.publish_state(PlaybackState::Stopped);
        info!("Playback coordinator shut down");
    }

    // ============= Internals =============

    fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::Acquire)
    }

    async fn lock_gate(&self) -> MutexGuard<'_, ()> {
        self.inner.play_gate.lock().await
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.inner
            .tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn store(&self) -> Result<Arc<dyn PlaylistStore>> {
        self.inner
            .store
            .clone()
            .ok_or(ControlError::NoPlaylistStore)
    }

    async fn selected_provider(&self) -> Result<Arc<dyn MusicProvider>> {
        let kind = self.selected_source().await;
        self.provider(kind).ok_or(ControlError::UnknownSource(kind))
    }

    async fn active_provider(&self) -> Option<(SourceKind, Arc<dyn MusicProvider>)> {
        if self.is_shut_down() {
            return None;
        }
        self.inner
            .active
            .lock()
            .await
            .as_ref()
            .map(|active| (active.kind, Arc::clone(&active.provider)))
    }

    /// `Error` holds until the next `play` or `play_song`.
    fn ignored_in_error(&self, operation: &str) -> bool {
        let latched = self.inner.mirrors.is_error_latched();
        if latched {
            debug!(operation, "Ignored while in error state");
        }
        latched
    }

    /// `play_song` body. The caller holds the play gate.
    async fn play_song_locked(&self, provider: Arc<dyn MusicProvider>, song: Song) {
        if self.is_shut_down() {
            debug!(song = song.id(), "play_song ignored after shutdown");
            return;
        }
        self.start_song(provider, song).await;
    }

    /// Runs the prepare/start sequence. The caller holds the play gate.
    async fn start_song(&self, provider: Arc<dyn MusicProvider>, song: Song) {
        let kind = song.source();
        self.inner.mirrors.clear_error();
        self.activate(kind, &provider).await;

        info!(source = %kind, song = song.id(), title = song.title(), "Playing song");
        self.inner
            .events
            .broadcast(CoordinatorEvent::PlaybackRequested { song: song.clone() });

        let playback = match provider.prepare_playback(song).await {
            Ok(()) => provider.start_playback().await,
            Err(err) => Err(err),
        };
        self.report(kind, "play_song", playback);
    }

    /// Makes `provider` the active one and re-binds the mirrors to it.
    ///
    /// The previously active provider, if different, is stopped.
    async fn activate(&self, kind: SourceKind, provider: &Arc<dyn MusicProvider>) {
        let previous = {
            let mut active = self.inner.active.lock().await;
            if let Some(current) = active.as_ref() {
                if current.kind == kind {
                    self.inner.mirrors.sync_from(provider.as_ref());
                    return;
                }
                current.forwarder.abort();
            }

            let forwarder = self.inner.mirrors.bind(provider);
            active.replace(ActiveSource {
                kind,
                provider: Arc::clone(provider),
                forwarder,
            })
        };

        debug!(source = %kind, "Active source changed");
        self.inner
            .events
            .broadcast(CoordinatorEvent::ActiveSourceChanged { kind });

        if let Some(previous) = previous {
            if let Err(err) = previous.provider.stop_playback().await {
                debug!(source = %previous.kind, error = %err, "Could not stop previous source");
            }
        }
    }

    /// Surfaces a provider failure as the `Error` state.
    fn report(
        &self,
        kind: SourceKind,
        operation: &str,
        result: std::result::Result<(), SourceError>,
    ) {
        let Err(err) = result else {
            return;
        };

        error!(source = %kind, operation, error = %err, "Playback command failed");

        let message = err.to_string();
        self.inner.mirrors.latch_error(message.clone());
        self.inner
            .events
            .broadcast(CoordinatorEvent::PlaybackFailed { kind, message });
    }

    /// Plays a song picked from the playlist. The caller holds the play gate.
    async fn play_from_playlist(&self, song: Song) {
        let kind = song.source();
        let Some(provider) = self.provider(kind) else {
            warn!(source = %kind, song = song.id(), "No provider registered for playlist song");
            self.inner.events.broadcast(CoordinatorEvent::UnknownSource {
                kind,
                song_id: song.id().to_string(),
            });
            return;
        };
        self.play_song_locked(provider, song).await;
    }

    /// Applies an edit and plays the current song if its identity changed.
    ///
    /// The play gate is held from the edit through the follow-up play, so
    /// concurrent edits start their songs in the order they changed the cursor.
    async fn edit_playlist<R, F>(&self, edit: F) -> R
    where
        F: FnOnce(&mut Playlist) -> R + Send,
        R: Send,
    {
        let _gate = self.lock_gate().await;
        let (result, follow_up) = {
            let mut playlist = self.inner.playlist.lock().await;
            let before = playlist.current_song().map(|song| song.id().to_string());
            let result = edit(&mut playlist);
            self.publish_playlist(&playlist);

            let after = playlist.current_song().cloned();
            let changed = after.as_ref().map(Song::id) != before.as_deref();
            (result, after.filter(|_| changed))
        };

        if let Some(song) = follow_up {
            debug!(song = song.id(), "Current playlist song changed");
            self.play_from_playlist(song).await;
        }
        result
    }

    /// Moves the cursor and always plays the resulting song.
    async fn navigate<F>(&self, step: F) -> Option<Song>
    where
        F: FnOnce(&mut Playlist) -> Option<Song> + Send,
    {
        let _gate = self.lock_gate().await;
        let song = {
            let mut playlist = self.inner.playlist.lock().await;
            let song = step(&mut playlist);
            self.publish_playlist(&playlist);
            song
        };

        if let Some(song) = &song {
            self.play_from_playlist(song.clone()).await;
        }
        song
    }

    fn publish_playlist(&self, playlist: &Playlist) {
        let snapshot = playlist.snapshot();
        let event = CoordinatorEvent::PlaylistChanged {
            len: snapshot.songs.len(),
            current_index: snapshot.current_index,
        };
        self.inner.playlist_tx.send_replace(snapshot);
        self.inner.events.broadcast(event);
    }
}
