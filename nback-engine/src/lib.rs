pub mod config;
pub mod engine;
pub mod errors;
pub mod record;
pub mod sequence;
pub mod speech;
pub mod state;

pub use config::GameConfig;
pub use engine::GameEngine;
pub use errors::{EngineError, Result};
pub use record::{GuessRecord, SessionSummary};
pub use sequence::{RandomSequenceGenerator, SequenceGenerator, SequenceRequest};
pub use speech::{LogSpeaker, Speaker};
pub use state::{GameSnapshot, IgnoreReason, MatchOutcome, SessionState, TickOutcome};
