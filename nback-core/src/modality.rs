use serde::{Deserialize, Serialize};

/// One stimulus stream.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Audio,
    Visual,
}

impl Modality {
    pub fn label(&self) -> &'static str {
        match self {
            Modality::Audio => "audio",
            Modality::Visual => "visual",
        }
    }
}

/// Selects which stream(s) run in the next session.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Audio,
    #[default]
    Visual,
    AudioVisual,
}

impl GameType {
    /// Active modalities in tick order. Audio is always advanced before visual.
    pub fn modalities(&self) -> &'static [Modality] {
        match self {
            GameType::Audio => &[Modality::Audio],
            GameType::Visual => &[Modality::Visual],
            GameType::AudioVisual => &[Modality::Audio, Modality::Visual],
        }
    }

    pub fn has(&self, modality: Modality) -> bool {
        self.modalities().contains(&modality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_ticks_before_visual() {
        assert_eq!(
            GameType::AudioVisual.modalities(),
            &[Modality::Audio, Modality::Visual]
        );
    }

    #[test]
    fn single_stream_types() {
        assert!(GameType::Audio.has(Modality::Audio));
        assert!(!GameType::Audio.has(Modality::Visual));
        assert!(GameType::Visual.has(Modality::Visual));
        assert!(!GameType::Visual.has(Modality::Audio));
    }

    #[test]
    fn default_is_visual() {
        assert_eq!(GameType::default(), GameType::Visual);
    }
}
