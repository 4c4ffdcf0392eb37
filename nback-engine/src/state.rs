//! Session state machine and match checker.
//!
//! Everything here is synchronous. The engine serializes calls behind a
//! single lock; the tick loop and user guesses never observe each other
//! half-way.

use nback_core::{GameType, GuessFeedback, Modality, RoundState, SessionPhase};
use nback_timing::TickStatsSummary;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::errors::{EngineError, Result};
use crate::record::{GuessRecord, SessionSummary};
use crate::sequence::{SequenceGenerator, SequenceRequest};

/// What one clock step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Active streams moved to the next stimulus. `spoken` carries the new
    /// audio stimulus when the audio stream is active.
    Advanced { spoken: Option<u32> },
    /// Every event has been shown.
    Exhausted,
    /// No session is running.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotRunning,
    InactiveModality,
    NotEnoughHistory,
    SequenceExhausted,
    AlreadyGuessed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Correct,
    Incorrect,
    Ignored(IgnoreReason),
}

/// Read-only projection handed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GameSnapshot {
    pub phase: SessionPhase,
    pub game_type: GameType,
    /// Settings the next session will use.
    pub config: GameConfig,
    pub score: u32,
    pub high_score: u32,
    pub current_event_index: u32,
    pub audio: RoundState,
    pub visual: RoundState,
    pub audio_feedback: GuessFeedback,
    pub visual_feedback: GuessFeedback,
    pub audio_guessed: bool,
    pub visual_guessed: bool,
}

impl GameSnapshot {
    pub fn round(&self, modality: Modality) -> &RoundState {
        match modality {
            Modality::Audio => &self.audio,
            Modality::Visual => &self.visual,
        }
    }

    pub fn feedback(&self, modality: Modality) -> GuessFeedback {
        match modality {
            Modality::Audio => self.audio_feedback,
            Modality::Visual => self.visual_feedback,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Stream {
    sequence: Vec<u32>,
    round: RoundState,
    feedback: GuessFeedback,
    guessed: bool,
}

impl Stream {
    fn reset(&mut self) {
        self.sequence.clear();
        self.round.clear();
        self.feedback = GuessFeedback::None;
        self.guessed = false;
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    phase: SessionPhase,
    game_type: GameType,
    /// Settings for the next session.
    config: GameConfig,
    /// Settings frozen when the running session started.
    session_config: GameConfig,
    score: u32,
    high_score: u32,
    current_event_index: u32,
    audio: Stream,
    visual: Stream,
    guesses: Vec<GuessRecord>,
    generation: u64,
}

impl SessionState {
    pub fn new(config: GameConfig, high_score: u32) -> Self {
        Self {
            phase: SessionPhase::Idle,
            game_type: GameType::default(),
            config,
            session_config: config,
            score: 0,
            high_score,
            current_event_index: 0,
            audio: Stream::default(),
            visual: Stream::default(),
            guesses: Vec::new(),
            generation: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GameConfig {
        &mut self.config
    }

    /// Settings of the running (or last) session.
    pub fn session_config(&self) -> &GameConfig {
        &self.session_config
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn current_event_index(&self) -> u32 {
        self.current_event_index
    }

    /// Identifies the tick loop allowed to drive this state.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sequence(&self, modality: Modality) -> &[u32] {
        &self.stream(modality).sequence
    }

    pub fn guesses(&self) -> &[GuessRecord] {
        &self.guesses
    }

    fn stream(&self, modality: Modality) -> &Stream {
        match modality {
            Modality::Audio => &self.audio,
            Modality::Visual => &self.visual,
        }
    }

    fn stream_mut(&mut self, modality: Modality) -> &mut Stream {
        match modality {
            Modality::Audio => &mut self.audio,
            Modality::Visual => &mut self.visual,
        }
    }

    pub fn set_game_type(&mut self, game_type: GameType) -> Result<()> {
        if !self.phase.accepts_game_type() {
            return Err(EngineError::SessionRunning);
        }
        self.game_type = game_type;
        Ok(())
    }

    /// Begins a fresh session and returns its generation.
    ///
    /// Any previous session is discarded. Sequences are drawn once here and
    /// stay fixed until the session ends.
    pub fn start(&mut self, generator: &mut dyn SequenceGenerator) -> u64 {
        self.generation += 1;
        self.session_config = self.config;
        self.score = 0;
        self.current_event_index = 0;
        self.guesses.clear();
        for stream in [&mut self.audio, &mut self.visual] {
            stream.reset();
            stream.round.finished = false;
        }

        let config = self.session_config;
        for &modality in self.game_type.modalities() {
            let request = SequenceRequest {
                num_events: config.number_of_events,
                alphabet_size: config.alphabet(modality),
                match_percent: GameConfig::match_percent(modality),
                n: config.n_back,
            };
            let sequence = generator.generate(&request);
            debug!(modality = modality.label(), ?sequence, "sequence generated");
            self.stream_mut(modality).sequence = sequence;
        }

        self.phase = SessionPhase::Running;
        info!(
            generation = self.generation,
            game_type = ?self.game_type,
            n_back = config.n_back,
            events = config.number_of_events,
            "session started"
        );
        self.generation
    }

    /// Stops the session and returns to `Idle`. Idempotent.
    pub fn end(&mut self) {
        if self.phase.is_running() {
            info!(generation = self.generation, score = self.score, "session ended");
        }
        self.generation += 1;
        self.reset_streams();
        self.phase = SessionPhase::Idle;
    }

    fn reset_streams(&mut self) {
        self.current_event_index = 0;
        self.audio.reset();
        self.visual.reset();
    }

    /// Moves every active stream to the stimulus at the shared index.
    pub fn advance_tick(&mut self) -> TickOutcome {
        if !self.phase.is_running() {
            return TickOutcome::Stopped;
        }
        let idx = self.current_event_index as usize;
        if self.current_event_index >= self.session_config.number_of_events {
            return TickOutcome::Exhausted;
        }

        let mut spoken = None;
        for &modality in self.game_type.modalities() {
            let stream = self.stream_mut(modality);
            let Some(&value) = stream.sequence.get(idx) else {
                return TickOutcome::Exhausted;
            };
            stream.feedback = GuessFeedback::None;
            stream.guessed = false;
            stream.round.advance(value);
            if modality == Modality::Audio {
                spoken = Some(value);
            }
        }
        TickOutcome::Advanced { spoken }
    }

    /// Closes the current tick once its interval has elapsed.
    pub fn finish_tick(&mut self) {
        if self.phase.is_running() {
            self.current_event_index += 1;
        }
    }

    /// Scores a "match" guess for `modality` against the stimulus `n` back.
    pub fn check_match(&mut self, modality: Modality) -> MatchOutcome {
        if !self.phase.is_running() {
            return MatchOutcome::Ignored(IgnoreReason::NotRunning);
        }
        if !self.game_type.has(modality) {
            return MatchOutcome::Ignored(IgnoreReason::InactiveModality);
        }
        let idx = self.current_event_index as usize;
        let n = self.session_config.n_back as usize;
        if idx < n {
            return MatchOutcome::Ignored(IgnoreReason::NotEnoughHistory);
        }
        let stream = self.stream(modality);
        if idx >= stream.sequence.len() {
            return MatchOutcome::Ignored(IgnoreReason::SequenceExhausted);
        }
        if stream.guessed {
            return MatchOutcome::Ignored(IgnoreReason::AlreadyGuessed);
        }

        let is_match = stream.sequence[idx] == stream.sequence[idx - n];
        let (outcome, feedback) = if is_match {
            self.score += 1;
            (MatchOutcome::Correct, GuessFeedback::Correct)
        } else {
            self.score = self.score.saturating_sub(1);
            (MatchOutcome::Incorrect, GuessFeedback::Incorrect)
        };

        let event_index = self.current_event_index;
        let stream = self.stream_mut(modality);
        stream.feedback = feedback;
        stream.guessed = true;
        self.guesses.push(GuessRecord {
            modality,
            event_index,
            feedback,
        });
        debug!(
            modality = modality.label(),
            event_index,
            ?feedback,
            score = self.score,
            "guess scored"
        );
        outcome
    }

    /// Wraps up a session whose sequence ran out.
    ///
    /// Marks both rounds finished, clears the streams like an explicit end,
    /// and raises the high score when beaten.
    pub fn complete(&mut self, ticks: &TickStatsSummary) -> SessionSummary {
        self.audio.round.finished = true;
        self.visual.round.finished = true;
        self.reset_streams();
        self.phase = SessionPhase::Finished;

        let new_high_score = self.score > self.high_score;
        if new_high_score {
            self.high_score = self.score;
        }
        let correct = self
            .guesses
            .iter()
            .filter(|g| g.feedback == GuessFeedback::Correct)
            .count();
        info!(
            generation = self.generation,
            score = self.score,
            high_score = self.high_score,
            new_high_score,
            "session finished"
        );

        SessionSummary {
            game_type: self.game_type,
            config: self.session_config,
            score: self.score,
            high_score: self.high_score,
            new_high_score,
            correct,
            incorrect: self.guesses.len() - correct,
            guesses: self.guesses.clone(),
            average_interval_ms: ticks.average_interval_ns / 1_000_000.0,
            jitter_ms: ticks.jitter_ns / 1_000_000.0,
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            game_type: self.game_type,
            config: self.config,
            score: self.score,
            high_score: self.high_score,
            current_event_index: self.current_event_index,
            audio: self.audio.round,
            visual: self.visual.round,
            audio_feedback: self.audio.feedback,
            visual_feedback: self.visual.feedback,
            audio_guessed: self.audio.guessed,
            visual_guessed: self.visual.guessed,
        }
    }
}
