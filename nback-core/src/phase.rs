/// Session lifecycle.
///
/// `Idle -> Running` on start, `Running -> Finished` when the sequence is
/// exhausted, and any state back to `Idle` on an explicit end.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
    Finished,
}

impl SessionPhase {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// The game type may only change while no tick loop is live.
    pub fn accepts_game_type(&self) -> bool {
        !self.is_running()
    }
}
