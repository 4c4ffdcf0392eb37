use std::time::Duration;

use nback_core::{Modality, SPEAKABLE_LETTERS};
use nback_prefs::UserPreferences;
use serde::Serialize;

use crate::errors::{EngineError, Result};

/// Pause before the first tick so the presentation can attach.
pub const STARTUP_GRACE: Duration = Duration::from_millis(1500);

/// Share of eligible positions that repeat their n-back predecessor.
pub const VISUAL_MATCH_PERCENT: u32 = 35;
pub const AUDIO_MATCH_PERCENT: u32 = 25;

pub const MIN_N_BACK: u32 = 1;
pub const MIN_GRID_SIZE: u32 = 3;
pub const MIN_EVENTS: u32 = 1;
pub const MIN_INTERVAL_MS: u64 = 1;

/// Settings a session is played with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameConfig {
    pub n_back: u32,
    pub grid_size: u32,
    pub number_of_events: u32,
    pub event_interval_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from(&UserPreferences::default())
    }
}

impl From<&UserPreferences> for GameConfig {
    fn from(prefs: &UserPreferences) -> Self {
        Self {
            n_back: prefs.n_back_level,
            grid_size: prefs.grid_size,
            number_of_events: prefs.num_events,
            event_interval_ms: prefs.event_interval_ms,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        check_min("n-back level", self.n_back.into(), MIN_N_BACK.into())?;
        check_min("grid size", self.grid_size.into(), MIN_GRID_SIZE.into())?;
        check_min(
            "number of events",
            self.number_of_events.into(),
            MIN_EVENTS.into(),
        )?;
        check_min("event interval", self.event_interval_ms, MIN_INTERVAL_MS)
    }

    /// Stored settings that fail validation are replaced field by field
    /// with the defaults.
    pub fn sanitized(prefs: &UserPreferences) -> Self {
        let defaults = UserPreferences::default();
        let pick = |value: u32, min: u32, default: u32| if value >= min { value } else { default };
        Self {
            n_back: pick(prefs.n_back_level, MIN_N_BACK, defaults.n_back_level),
            grid_size: pick(prefs.grid_size, MIN_GRID_SIZE, defaults.grid_size),
            number_of_events: pick(prefs.num_events, MIN_EVENTS, defaults.num_events),
            event_interval_ms: if prefs.event_interval_ms >= MIN_INTERVAL_MS {
                prefs.event_interval_ms
            } else {
                defaults.event_interval_ms
            },
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.event_interval_ms)
    }

    /// Number of grid cells a visual stimulus can land in.
    pub fn visual_alphabet(&self) -> u32 {
        self.grid_size.saturating_mul(self.grid_size)
    }

    /// Audio stimuli are spoken letters, so the grid alphabet is capped.
    pub fn audio_alphabet(&self) -> u32 {
        self.visual_alphabet().min(SPEAKABLE_LETTERS)
    }

    pub fn alphabet(&self, modality: Modality) -> u32 {
        match modality {
            Modality::Audio => self.audio_alphabet(),
            Modality::Visual => self.visual_alphabet(),
        }
    }

    pub fn match_percent(modality: Modality) -> u32 {
        match modality {
            Modality::Audio => AUDIO_MATCH_PERCENT,
            Modality::Visual => VISUAL_MATCH_PERCENT,
        }
    }
}

pub(crate) fn check_min(setting: &'static str, value: u64, min: u64) -> Result<()> {
    if value < min {
        return Err(EngineError::InvalidSetting {
            setting,
            value,
            min,
        });
    }
    Ok(())
}
