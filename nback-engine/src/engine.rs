//! Clock-driven game engine.
//!
//! [`GameEngine`] owns a [`SessionState`] behind a single lock. The tick loop
//! runs as a Tokio task and only suspends in its startup grace and its
//! per-tick sleep, both cancellable. User guesses lock, mutate and return
//! without awaiting. Every mutation republishes a [`GameSnapshot`] on a
//! `watch` channel.

use std::sync::Arc;

use nback_core::{GameType, Modality, stimulus_letter};
use nback_prefs::{PreferenceStore, PreferenceUpdate};
use nback_timing::{SleepOutcome, TickStats, TickStatsSummary, Timer, TokioTimer, cancellable_sleep};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::{
    GameConfig, MIN_EVENTS, MIN_GRID_SIZE, MIN_INTERVAL_MS, MIN_N_BACK, STARTUP_GRACE, check_min,
};
use crate::errors::Result;
use crate::record::SessionSummary;
use crate::sequence::{RandomSequenceGenerator, SequenceGenerator};
use crate::speech::Speaker;
use crate::state::{GameSnapshot, MatchOutcome, SessionState, TickOutcome};

const SUMMARY_CAPACITY: usize = 16;

/// The tick loop currently allowed to drive the session.
struct ActiveRun {
    generation: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ActiveRun {
    fn stop(self) {
        debug!(generation = self.generation, "cancelling tick loop");
        self.cancel.cancel();
        self.handle.abort();
    }
}

struct Inner {
    session: SessionState,
    generator: Box<dyn SequenceGenerator>,
    run: Option<ActiveRun>,
}

struct Shared {
    inner: Mutex<Inner>,
    snapshots: watch::Sender<GameSnapshot>,
    summaries: broadcast::Sender<SessionSummary>,
    store: Arc<dyn PreferenceStore>,
    speaker: Arc<dyn Speaker>,
}

impl Shared {
    fn publish(&self, session: &SessionState) {
        self.snapshots.send_replace(session.snapshot());
    }

    fn say(&self, value: u32) {
        match stimulus_letter(value) {
            Ok(letter) => self.speaker.speak(letter),
            Err(e) => error!(error = %e, "cannot speak audio stimulus"),
        }
    }

    fn finish(&self, generation: u64, ticks: &TickStatsSummary) {
        let summary = {
            let mut inner = self.inner.lock();
            if inner.session.generation() != generation {
                return;
            }
            let summary = inner.session.complete(ticks);
            inner.run = None;
            self.publish(&inner.session);
            summary
        };
        debug!(
            samples = ticks.samples,
            drift_ms = ticks.drift_ns / 1_000_000.0,
            jitter_ms = ticks.jitter_ns / 1_000_000.0,
            "tick timing"
        );
        if summary.new_high_score {
            if let Err(e) = self.store.save_high_score(summary.high_score) {
                warn!(error = %e, high_score = summary.high_score, "failed to persist high score");
            }
        }
        let _ = self.summaries.send(summary);
    }
}

/// N-back game engine.
///
/// Mutating entry points are synchronous and never block on the clock.
/// [`GameEngine::start_game`] spawns the tick loop and therefore must be
/// called from within a Tokio runtime.
pub struct GameEngine<T: Timer = TokioTimer> {
    shared: Arc<Shared>,
    timer: T,
}

impl GameEngine<TokioTimer> {
    /// Engine with random sequences and the Tokio clock.
    pub fn new(store: Arc<dyn PreferenceStore>, speaker: Arc<dyn Speaker>) -> Self {
        Self::with_parts(
            store,
            speaker,
            Box::new(RandomSequenceGenerator::new()),
            TokioTimer,
        )
    }
}

impl<T: Timer> GameEngine<T> {
    /// Reads the store once; invalid stored settings fall back to defaults.
    pub fn with_parts(
        store: Arc<dyn PreferenceStore>,
        speaker: Arc<dyn Speaker>,
        generator: Box<dyn SequenceGenerator>,
        timer: T,
    ) -> Self {
        let prefs = store.read();
        let config = GameConfig::sanitized(&prefs);
        if config != GameConfig::from(&prefs) {
            warn!(?prefs, ?config, "stored settings out of range, using defaults for those");
        }
        let session = SessionState::new(config, prefs.high_score);
        let (snapshots, _) = watch::channel(session.snapshot());
        let (summaries, _) = broadcast::channel(SUMMARY_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    session,
                    generator,
                    run: None,
                }),
                snapshots,
                summaries,
                store,
                speaker,
            }),
            timer,
        }
    }

    /// Latest state, multicast to every subscriber.
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        *self.shared.snapshots.borrow()
    }

    /// Summaries of sessions that ran to completion.
    pub fn summaries(&self) -> broadcast::Receiver<SessionSummary> {
        self.shared.summaries.subscribe()
    }

    pub fn set_game_type(&self, game_type: GameType) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        inner.session.set_game_type(game_type)?;
        self.shared.publish(&inner.session);
        Ok(())
    }

    /// Starts a new session, cancelling any running one first.
    pub fn start_game(&self) {
        let mut inner = self.shared.inner.lock();
        if let Some(run) = inner.run.take() {
            run.stop();
        }
        let Inner {
            session, generator, ..
        } = &mut *inner;
        let generation = session.start(generator.as_mut());

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_session(
            Arc::clone(&self.shared),
            self.timer.clone(),
            generation,
            cancel.clone(),
        ));
        inner.run = Some(ActiveRun {
            generation,
            cancel,
            handle,
        });
        self.shared.publish(&inner.session);
    }

    /// Stops any session and returns to idle. Idempotent.
    pub fn end_game(&self) {
        let mut inner = self.shared.inner.lock();
        if let Some(run) = inner.run.take() {
            run.stop();
        }
        inner.session.end();
        self.shared.publish(&inner.session);
    }

    /// Registers a "match" guess. Out-of-window guesses are ignored.
    pub fn check_match(&self, modality: Modality) -> MatchOutcome {
        let mut inner = self.shared.inner.lock();
        let outcome = inner.session.check_match(modality);
        if !matches!(outcome, MatchOutcome::Ignored(_)) {
            self.shared.publish(&inner.session);
        }
        outcome
    }

    pub fn save_n_back_level(&self, level: u32) -> Result<()> {
        check_min("n-back level", level.into(), MIN_N_BACK.into())?;
        self.update_setting(PreferenceUpdate::NBackLevel(level), |c| c.n_back = level);
        Ok(())
    }

    pub fn save_grid_size(&self, size: u32) -> Result<()> {
        check_min("grid size", size.into(), MIN_GRID_SIZE.into())?;
        self.update_setting(PreferenceUpdate::GridSize(size), |c| c.grid_size = size);
        Ok(())
    }

    pub fn save_num_events(&self, events: u32) -> Result<()> {
        check_min("number of events", events.into(), MIN_EVENTS.into())?;
        self.update_setting(PreferenceUpdate::NumEvents(events), |c| {
            c.number_of_events = events
        });
        Ok(())
    }

    pub fn save_event_interval(&self, interval_ms: u64) -> Result<()> {
        check_min("event interval", interval_ms, MIN_INTERVAL_MS)?;
        self.update_setting(PreferenceUpdate::EventIntervalMs(interval_ms), |c| {
            c.event_interval_ms = interval_ms
        });
        Ok(())
    }

    /// Applies to the next session. Store failures are logged, not returned.
    fn update_setting(&self, update: PreferenceUpdate, apply: impl FnOnce(&mut GameConfig)) {
        {
            let mut inner = self.shared.inner.lock();
            apply(inner.session.config_mut());
            self.shared.publish(&inner.session);
        }
        if let Err(e) = self.shared.store.write(update) {
            warn!(error = %e, key = update.key(), "failed to persist setting");
        }
    }
}

impl<T: Timer> Drop for GameEngine<T> {
    fn drop(&mut self) {
        if let Some(run) = self.shared.inner.lock().run.take() {
            run.stop();
        }
    }
}

async fn run_session<T: Timer>(
    shared: Arc<Shared>,
    timer: T,
    generation: u64,
    cancel: CancellationToken,
) {
    if cancellable_sleep(&timer, STARTUP_GRACE, &cancel).await == SleepOutcome::Cancelled {
        return;
    }

    let interval = {
        let inner = shared.inner.lock();
        if inner.session.generation() != generation {
            return;
        }
        inner.session.session_config().interval()
    };
    let mut stats = TickStats::new(interval);
    let mut last_tick = None;

    loop {
        let outcome = {
            let mut inner = shared.inner.lock();
            if inner.session.generation() != generation {
                return;
            }
            let outcome = inner.session.advance_tick();
            shared.publish(&inner.session);
            outcome
        };

        match outcome {
            TickOutcome::Advanced { spoken } => {
                let now = timer.now();
                if let Some(prev) = last_tick.replace(now) {
                    stats.record(timer.elapsed(prev));
                }
                if let Some(value) = spoken {
                    shared.say(value);
                }
            }
            TickOutcome::Exhausted => break,
            TickOutcome::Stopped => return,
        }

        if cancellable_sleep(&timer, interval, &cancel).await == SleepOutcome::Cancelled {
            return;
        }

        let mut inner = shared.inner.lock();
        if inner.session.generation() != generation {
            return;
        }
        inner.session.finish_tick();
        shared.publish(&inner.session);
    }

    shared.finish(generation, &stats.summary());
}
