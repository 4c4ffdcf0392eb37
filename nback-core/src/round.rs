use serde::Serialize;

/// Per-modality view of the stream currently being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RoundState {
    /// Stimulus on screen / last spoken, `None` between sessions.
    pub current_value: Option<u32>,
    pub index: u32,
    pub finished: bool,
}

impl RoundState {
    pub fn advance(&mut self, value: u32) {
        self.current_value = Some(value);
        self.index += 1;
    }

    /// Back to the sentinel value. `finished` survives so the presentation can
    /// tell a completed session from one that never ran.
    pub fn clear(&mut self) {
        self.current_value = None;
        self.index = 0;
    }
}

/// Outcome shown for the last guess of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessFeedback {
    #[default]
    None,
    Correct,
    Incorrect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_then_clear() {
        let mut round = RoundState::default();
        round.advance(4);
        round.advance(7);
        assert_eq!(round.current_value, Some(7));
        assert_eq!(round.index, 2);

        round.finished = true;
        round.clear();
        assert_eq!(round.current_value, None);
        assert_eq!(round.index, 0);
        assert!(round.finished);
    }
}
