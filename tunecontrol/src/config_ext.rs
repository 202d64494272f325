//! Extension pour la configuration de la lecture dans tuneconfig
//!
//! Le trait `ControlConfigExt` ajoute à `tuneconfig::Config` :
//!
//! - la période de l'horloge de progression
//! - le délai de mise en tampon simulé, par source
//! - la source sélectionnée au démarrage
//! - l'emplacement du fichier de playlist

use anyhow::Result;
use serde_yaml::{Number, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use tuneconfig::Config;
use tunesource::SourceKind;

const DEFAULT_PLAYLIST_FILE: &str = "playlist.json";

/// Trait d'extension pour la configuration du coordinateur
pub trait ControlConfigExt {
    /// Période de l'horloge de progression
    fn get_tick_interval(&self) -> Result<Duration>;

    /// Délai de mise en tampon simulé pour la source `kind` (0 par défaut)
    fn get_buffering_delay(&self, kind: SourceKind) -> Result<Duration>;

    fn set_buffering_delay_ms(&self, kind: SourceKind, delay_ms: u64) -> Result<()>;

    /// Source sélectionnée au démarrage (`local` par défaut)
    fn get_default_source(&self) -> Result<SourceKind>;

    fn set_default_source(&self, kind: SourceKind) -> Result<()>;

    /// Chemin du fichier de playlist, résolu par rapport au répertoire de configuration
    fn get_playlist_file(&self) -> Result<PathBuf>;
}

impl ControlConfigExt for Config {
    fn get_tick_interval(&self) -> Result<Duration> {
        let ms = self.get_tick_interval_ms()?.max(1);
        Ok(Duration::from_millis(ms as u64))
    }

    fn get_buffering_delay(&self, kind: SourceKind) -> Result<Duration> {
        let ms = self
            .get_usize(&["playback", "buffering_delay_ms", kind.config_key()])
            .unwrap_or(0);
        Ok(Duration::from_millis(ms as u64))
    }

    fn set_buffering_delay_ms(&self, kind: SourceKind, delay_ms: u64) -> Result<()> {
        self.set_value(
            &["playback", "buffering_delay_ms", kind.config_key()],
            Value::Number(Number::from(delay_ms)),
        )
    }

    fn get_default_source(&self) -> Result<SourceKind> {
        let Some(name) = self.get_string(&["playback", "default_source"]) else {
            return Ok(SourceKind::Local);
        };
        match name.parse() {
            Ok(kind) => Ok(kind),
            Err(err) => {
                warn!(value = %name, error = %err, "Invalid default source, using local");
                Ok(SourceKind::Local)
            }
        }
    }

    fn set_default_source(&self, kind: SourceKind) -> Result<()> {
        self.set_value(
            &["playback", "default_source"],
            Value::String(kind.as_str().to_string()),
        )
    }

    fn get_playlist_file(&self) -> Result<PathBuf> {
        let file = self
            .get_string(&["playlist", "file"])
            .unwrap_or_else(|| DEFAULT_PLAYLIST_FILE.to_string());
        Ok(self.resolve_path(&file))
    }
}
