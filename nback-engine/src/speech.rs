use tracing::info;

/// Speech output for audio stimuli. Fire-and-forget.
pub trait Speaker: Send + Sync {
    fn speak(&self, letter: char);
}

/// Speaker that only logs the letter. Useful headless.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn speak(&self, letter: char) {
        info!(%letter, "speak");
    }
}
