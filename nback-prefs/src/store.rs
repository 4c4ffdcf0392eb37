//! Preference stores.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::errors::{PrefsError, Result};
use crate::types::{PreferenceUpdate, UserPreferences};

/// Default location of the preferences document.
///
/// `$NBACK_PREFS` wins; otherwise `~/.nback/preferences.json`.
pub fn default_path() -> PathBuf {
    if let Ok(path) = std::env::var("NBACK_PREFS") {
        return PathBuf::from(path);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".nback").join("preferences.json")
}

/// Durable key-value store for the trainer's preferences.
pub trait PreferenceStore: Send + Sync {
    /// Current preferences. Never fails; falls back to defaults.
    fn read(&self) -> UserPreferences;

    /// Latest-value stream of the preferences, shared by every subscriber.
    fn subscribe(&self) -> watch::Receiver<UserPreferences>;

    /// Writes one field. Writing the value already stored is a no-op.
    fn write(&self, update: PreferenceUpdate) -> Result<()>;

    fn save_high_score(&self, score: u32) -> Result<()> {
        self.write(PreferenceUpdate::HighScore(score))
    }

    fn save_n_back_level(&self, level: u32) -> Result<()> {
        self.write(PreferenceUpdate::NBackLevel(level))
    }

    fn save_grid_size(&self, size: u32) -> Result<()> {
        self.write(PreferenceUpdate::GridSize(size))
    }

    fn save_num_events(&self, events: u32) -> Result<()> {
        self.write(PreferenceUpdate::NumEvents(events))
    }

    fn save_event_interval(&self, interval_ms: u64) -> Result<()> {
        self.write(PreferenceUpdate::EventIntervalMs(interval_ms))
    }
}

/// Preferences kept only for the lifetime of the process.
#[derive(Debug)]
pub struct MemoryPreferenceStore {
    tx: watch::Sender<UserPreferences>,
}

impl MemoryPreferenceStore {
    pub fn new(initial: UserPreferences) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }
}

impl Default for MemoryPreferenceStore {
    fn default() -> Self {
        Self::new(UserPreferences::default())
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn read(&self) -> UserPreferences {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<UserPreferences> {
        self.tx.subscribe()
    }

    fn write(&self, update: PreferenceUpdate) -> Result<()> {
        self.tx.send_if_modified(|prefs| update.apply_to(prefs));
        Ok(())
    }
}

/// Preferences persisted as a JSON document.
///
/// The whole document is rewritten on every change through a temporary
/// file and a rename, so a crash mid-write leaves the previous version.
#[derive(Debug)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    tx: watch::Sender<UserPreferences>,
    write_lock: Mutex<()>,
}

impl JsonPreferenceStore {
    /// Opens the store at `path`, loading whatever is there.
    ///
    /// A missing file means first launch. An unreadable or malformed file is
    /// logged and replaced by defaults on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial = match load(&path) {
            Ok(Some(prefs)) => {
                debug!(?path, "preferences loaded");
                prefs
            }
            Ok(None) => {
                info!(?path, "no preferences file, using defaults");
                UserPreferences::default()
            }
            Err(e) => {
                warn!(error = %e, ?path, "error reading preferences, using defaults");
                UserPreferences::default()
            }
        };
        let (tx, _) = watch::channel(initial);
        Self {
            path,
            tx,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, prefs: &UserPreferences) -> Result<()> {
        let io_err = |source| PrefsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_vec_pretty(prefs)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn read(&self) -> UserPreferences {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<UserPreferences> {
        self.tx.subscribe()
    }

    fn write(&self, update: PreferenceUpdate) -> Result<()> {
        // serializes concurrent writers so the file always holds the latest value
        let _guard = self.write_lock.lock();
        let mut next = self.read();
        if !update.apply_to(&mut next) && self.path.exists() {
            return Ok(());
        }
        self.persist(&next)?;
        self.tx.send_replace(next);
        debug!(key = update.key(), path = ?self.path, "preference written");
        Ok(())
    }
}

fn load(path: &Path) -> Result<Option<UserPreferences>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PrefsError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}
