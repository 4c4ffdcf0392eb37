#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("a session is running; end it first")]
    SessionRunning,

    #[error("invalid {setting}: {value} (minimum {min})")]
    InvalidSetting {
        setting: &'static str,
        value: u64,
        min: u64,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
