use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};
use tuneconfig::Config;
use tunecontrol::{PlaybackCoordinator, SessionBridge};
use tunesource::SourceKind;

fn init_logging(config: &Config) {
    let level = config
        .get_log_min_level()
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    Registry::default()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(true),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Configuration ==========
    let config = Config::load_config("")?;
    init_logging(&config);
    info!(dir = %config.config_dir().display(), "Configuration loaded");

    // ========== PHASE 2 : Sources et playlist ==========
    info!("🎵 Registering music sources...");
    let coordinator = PlaybackCoordinator::from_config(&config)?;
    for kind in coordinator.sources() {
        info!("  - {} ({})", kind.display_name(), kind);
    }

    let session = SessionBridge::new();
    coordinator.attach_session(&session);

    match coordinator.load_playlist().await {
        Ok(count) => info!("📜 Playlist restored ({} songs)", count),
        Err(e) => warn!("⚠️ Failed to restore playlist: {}", e),
    }

    if coordinator.playlist_snapshot().await.songs.is_empty() {
        let selected = coordinator.selected_source().await;
        coordinator.switch_music_source(SourceKind::Local).await?;
        for song in coordinator.search("").await? {
            coordinator.add_to_playlist(song).await;
        }
        coordinator.switch_music_source(selected).await?;
    } else if let Some(song) = coordinator.playlist_snapshot().await.current_song().cloned() {
        if let Err(e) = coordinator.play_song(song).await {
            warn!("⚠️ Cannot resume playlist: {}", e);
        }
    }

    // ========== PHASE 3 : Lecture ==========
    let mut state = coordinator.state();
    let mut song = coordinator.current_song();
    let monitor = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = state.borrow_and_update().clone();
                    info!(state = %current, "Playback state");
                }
                changed = song.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = song.borrow_and_update().clone();
                    if let Some(current) = current {
                        info!(
                            source = %current.source(),
                            "▶️ {} - {} ({})",
                            current.artist(),
                            current.title(),
                            current.formatted_duration()
                        );
                    }
                }
            }
        }
    });

    info!(
        "✅ TuneDeck is ready! ({} in playlist)",
        coordinator.formatted_playlist_duration().await
    );
    info!("Press Ctrl+C to stop...");
    tokio::signal::ctrl_c().await?;

    // ========== PHASE 4 : Arrêt ==========
    info!("Shutting down...");
    if let Err(e) = coordinator.save_playlist().await {
        warn!("⚠️ Failed to save playlist: {}", e);
    }
    coordinator.shutdown().await;
    monitor.abort();

    Ok(())
}
