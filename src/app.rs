use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use nback_engine::{
    GameEngine, LogSpeaker, MatchOutcome, RandomSequenceGenerator, SessionSummary, Speaker,
};
use nback_prefs::{JsonPreferenceStore, PreferenceStore, default_path};
use nback_timing::TokioTimer;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::{Cli, Speech};
use crate::command::{Command, HELP};
use crate::render;

/// Prints spoken letters where a phone would voice them.
struct ConsoleSpeaker;

impl Speaker for ConsoleSpeaker {
    fn speak(&self, letter: char) {
        println!("  ({letter})");
    }
}

pub struct App {
    engine: GameEngine,
    results_path: Option<PathBuf>,
    results: Vec<SessionSummary>,
    autostart: bool,
}

impl App {
    pub fn new(cli: &Cli) -> Result<Self> {
        let prefs_path = cli.prefs.clone().unwrap_or_else(default_path);
        let store: Arc<dyn PreferenceStore> = Arc::new(JsonPreferenceStore::open(&prefs_path));
        let speaker: Arc<dyn Speaker> = match cli.speech {
            Speech::Console => Arc::new(ConsoleSpeaker),
            Speech::Log => Arc::new(LogSpeaker),
        };
        let generator = match cli.seed {
            Some(seed) => RandomSequenceGenerator::seeded(seed),
            None => RandomSequenceGenerator::new(),
        };
        let engine = GameEngine::with_parts(store, speaker, Box::new(generator), TokioTimer);

        if let Some(level) = cli.n_back {
            engine.save_n_back_level(level)?;
        }
        if let Some(size) = cli.grid_size {
            engine.save_grid_size(size)?;
        }
        if let Some(events) = cli.events {
            engine.save_num_events(events)?;
        }
        if let Some(interval) = cli.interval_ms {
            engine.save_event_interval(interval)?;
        }
        engine.set_game_type(cli.mode.into())?;
        info!(path = ?prefs_path, "preferences loaded");

        Ok(Self {
            engine,
            results_path: cli.results.clone(),
            results: Vec::new(),
            autostart: cli.autostart,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        println!("=== N-BACK TRAINER ===");
        println!("{}", render::describe_status(&self.engine.snapshot()));
        println!("{HELP}\n");

        let mut snapshots = self.engine.subscribe();
        let printer = tokio::spawn(async move {
            let mut last = Some(*snapshots.borrow_and_update());
            while snapshots.changed().await.is_ok() {
                let snap = *snapshots.borrow_and_update();
                if let Some(text) = render::describe_change(last.as_ref(), &snap) {
                    println!("{text}");
                }
                last = Some(snap);
            }
        });

        if self.autostart {
            self.engine.start_game();
        }

        let mut summaries = self.engine.summaries();
        let mut lines = spawn_stdin_reader();
        loop {
            tokio::select! {
                line = lines.recv() => {
                    let Some(line) = line else {
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match Command::parse(&line) {
                        Ok(Command::Quit) => break,
                        Ok(command) => self.dispatch(command),
                        Err(e) => println!("{e}  ({HELP})"),
                    }
                }
                summary = summaries.recv() => match summary {
                    Ok(summary) => {
                        println!("{}", render::describe_summary(&summary));
                        self.results.push(summary);
                    }
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "session summaries dropped"),
                    Err(RecvError::Closed) => break,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        self.engine.end_game();
        if let Some(path) = &self.results_path {
            write_results(path, &self.results)?;
            println!("Results saved to {}", path.display());
        }
        drop(self.engine);
        let _ = printer.await;
        println!("Bye.");
        Ok(())
    }

    fn dispatch(&mut self, command: Command) {
        match command {
            Command::Start => self.engine.start_game(),
            Command::End => self.engine.end_game(),
            Command::Match(modality) => {
                let outcome = self.engine.check_match(modality);
                if let MatchOutcome::Ignored(reason) = outcome {
                    debug!(?modality, ?reason, "guess ignored");
                }
            }
            Command::SetMode(game_type) => {
                if let Err(e) = self.engine.set_game_type(game_type) {
                    println!("{e}");
                }
            }
            Command::Status => println!("{}", render::describe_status(&self.engine.snapshot())),
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
    }
}

/// Blocking stdin reads live on their own thread so they never hold up
/// runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn write_results(path: &Path, results: &[SessionSummary]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create result file {}", path.display()))?;
    serde_json::to_writer_pretty(file, results).context("failed to write results")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn cli_overrides_are_saved() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = dir.path().join("prefs.json");
        let cli = Cli::parse_from([
            "nback",
            "--prefs",
            prefs.to_str().unwrap(),
            "--n-back",
            "2",
            "--grid-size",
            "4",
            "--mode",
            "audio",
        ]);
        let app = App::new(&cli).unwrap();
        let snap = app.engine.snapshot();
        assert_eq!(snap.config.n_back, 2);
        assert_eq!(snap.config.grid_size, 4);
        assert_eq!(snap.game_type, nback_core::GameType::Audio);

        let stored = JsonPreferenceStore::open(&prefs).read();
        assert_eq!(stored.n_back_level, 2);
        assert_eq!(stored.grid_size, 4);
    }

    #[tokio::test]
    async fn invalid_override_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = dir.path().join("prefs.json");
        let cli = Cli::parse_from([
            "nback",
            "--prefs",
            prefs.to_str().unwrap(),
            "--grid-size",
            "1",
        ]);
        assert!(App::new(&cli).is_err());
    }

    #[test]
    fn results_are_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        write_results(&path, &[]).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body.trim(), "[]");
    }
}
