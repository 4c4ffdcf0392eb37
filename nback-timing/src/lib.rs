pub mod timer;

pub use timer::{SleepOutcome, TickStats, TickStatsSummary, Timer, TokioTimer, cancellable_sleep};
