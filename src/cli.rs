use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use nback_core::GameType;

#[derive(Debug, Parser)]
#[command(name = "nback", version, about = "Dual n-back trainer for the terminal")]
pub struct Cli {
    /// Which stream(s) to play.
    #[arg(long, value_enum, default_value_t = Mode::Visual)]
    pub mode: Mode,

    /// Preferences file. Defaults to ~/.nback/preferences.json.
    #[arg(long, env = "NBACK_PREFS")]
    pub prefs: Option<PathBuf>,

    /// Distance back a stimulus must match. Saved for later runs.
    #[arg(long)]
    pub n_back: Option<u32>,

    /// Grid edge length; visual stimuli pick one of grid² cells. Saved.
    #[arg(long)]
    pub grid_size: Option<u32>,

    /// Stimuli per session. Saved.
    #[arg(long)]
    pub events: Option<u32>,

    /// Milliseconds between stimuli. Saved.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Seed for reproducible sequences.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write finished session summaries here as JSON on exit.
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// How audio stimuli are voiced.
    #[arg(long, value_enum, default_value_t = Speech::Console)]
    pub speech: Speech,

    /// Start a session immediately.
    #[arg(long)]
    pub autostart: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Audio,
    Visual,
    AudioVisual,
}

impl From<Mode> for GameType {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Audio => GameType::Audio,
            Mode::Visual => GameType::Visual,
            Mode::AudioVisual => GameType::AudioVisual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Speech {
    /// Print the letter on stdout.
    Console,
    /// Only log the letter.
    Log,
}
