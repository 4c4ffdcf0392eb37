use nback_core::{GameType, GuessFeedback, Modality};
use serde::Serialize;

use crate::config::GameConfig;

/// One scored guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuessRecord {
    pub modality: Modality,
    pub event_index: u32,
    pub feedback: GuessFeedback,
}

/// Result of a session that ran to the end of its sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub game_type: GameType,
    pub config: GameConfig,
    pub score: u32,
    pub high_score: u32,
    pub new_high_score: bool,
    pub correct: usize,
    pub incorrect: usize,
    pub guesses: Vec<GuessRecord>,
    /// Mean tick spacing observed, in milliseconds.
    pub average_interval_ms: f64,
    pub jitter_ms: f64,
}

impl SessionSummary {
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.correct + self.incorrect;
        (total > 0).then(|| self.correct as f64 / total as f64)
    }
}
