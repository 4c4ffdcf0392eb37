pub mod modality;
pub mod phase;
pub mod round;
pub mod stimulus;

pub use modality::{GameType, Modality};
pub use phase::SessionPhase;
pub use round::{GuessFeedback, RoundState};
pub use stimulus::{SPEAKABLE_LETTERS, StimulusError, stimulus_letter};
