/// Number of letters the speech collaborator can pronounce.
pub const SPEAKABLE_LETTERS: u32 = 26;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StimulusError {
    #[error("stimulus {0} has no letter (expected 1..={SPEAKABLE_LETTERS})")]
    OutOfRange(u32),
}

/// Maps an audio stimulus to the letter spoken for it: 1 is `A`, 26 is `Z`.
pub fn stimulus_letter(value: u32) -> Result<char, StimulusError> {
    if !(1..=SPEAKABLE_LETTERS).contains(&value) {
        return Err(StimulusError::OutOfRange(value));
    }
    // in range, so the cast cannot truncate
    Ok(char::from(b'A' + (value - 1) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_cover_the_alphabet() {
        assert_eq!(stimulus_letter(1), Ok('A'));
        assert_eq!(stimulus_letter(9), Ok('I'));
        assert_eq!(stimulus_letter(26), Ok('Z'));
    }

    #[test]
    fn out_of_range_is_an_error() {
        assert_eq!(stimulus_letter(0), Err(StimulusError::OutOfRange(0)));
        assert_eq!(stimulus_letter(27), Err(StimulusError::OutOfRange(27)));
    }
}
