use serde::{Deserialize, Serialize};

/// Everything the trainer keeps between launches.
///
/// On disk each field sits under its store key (`highscore`, `nBackLevel`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    #[serde(rename = "highscore")]
    pub high_score: u32,
    #[serde(rename = "nBackLevel")]
    pub n_back_level: u32,
    #[serde(rename = "gridSize")]
    pub grid_size: u32,
    #[serde(rename = "numberOfEvents")]
    pub num_events: u32,
    #[serde(rename = "eventInterval")]
    pub event_interval_ms: u64,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            high_score: 0,
            n_back_level: 1,
            grid_size: 5,
            num_events: 10,
            event_interval_ms: 2000,
        }
    }
}

/// A write to exactly one preference field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceUpdate {
    HighScore(u32),
    NBackLevel(u32),
    GridSize(u32),
    NumEvents(u32),
    EventIntervalMs(u64),
}

impl PreferenceUpdate {
    /// Applies the update, returning whether the value actually changed.
    pub fn apply_to(self, prefs: &mut UserPreferences) -> bool {
        let before = *prefs;
        match self {
            Self::HighScore(v) => prefs.high_score = v,
            Self::NBackLevel(v) => prefs.n_back_level = v,
            Self::GridSize(v) => prefs.grid_size = v,
            Self::NumEvents(v) => prefs.num_events = v,
            Self::EventIntervalMs(v) => prefs.event_interval_ms = v,
        }
        before != *prefs
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::HighScore(_) => "highscore",
            Self::NBackLevel(_) => "nBackLevel",
            Self::GridSize(_) => "gridSize",
            Self::NumEvents(_) => "numberOfEvents",
            Self::EventIntervalMs(_) => "eventInterval",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_launch() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.high_score, 0);
        assert_eq!(prefs.n_back_level, 1);
        assert_eq!(prefs.grid_size, 5);
        assert_eq!(prefs.num_events, 10);
        assert_eq!(prefs.event_interval_ms, 2000);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let prefs: UserPreferences = serde_json::from_str(r#"{"gridSize": 4}"#).unwrap();
        assert_eq!(prefs.grid_size, 4);
        assert_eq!(prefs.n_back_level, 1);
        assert_eq!(prefs.event_interval_ms, 2000);
    }

    #[test]
    fn serializes_with_store_keys() {
        let json = serde_json::to_value(UserPreferences::default()).unwrap();
        assert_eq!(json["highscore"], 0);
        assert_eq!(json["nBackLevel"], 1);
        assert_eq!(json["numberOfEvents"], 10);
        assert_eq!(json["eventInterval"], 2000);
    }

    #[test]
    fn apply_reports_change() {
        let mut prefs = UserPreferences::default();
        assert!(PreferenceUpdate::GridSize(3).apply_to(&mut prefs));
        assert!(!PreferenceUpdate::GridSize(3).apply_to(&mut prefs));
        assert_eq!(prefs.grid_size, 3);
    }
}
