//! N-back stimulus sequences.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Shape of a sequence to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceRequest {
    pub num_events: u32,
    /// Values are drawn from `1..=alphabet_size`.
    pub alphabet_size: u32,
    /// Percentage of positions `i >= n` where `seq[i] == seq[i - n]`.
    pub match_percent: u32,
    pub n: u32,
}

impl SequenceRequest {
    /// Number of matching positions a generator should plant.
    pub fn target_matches(&self) -> usize {
        let eligible = self.num_events.saturating_sub(self.n) as usize;
        let share = f64::from(self.match_percent.min(100)) / 100.0;
        ((eligible as f64 * share).round() as usize).min(eligible)
    }
}

/// Produces the stimulus sequence for one modality of a session.
pub trait SequenceGenerator: Send {
    /// Returns exactly `num_events` values in `1..=alphabet_size`.
    fn generate(&mut self, request: &SequenceRequest) -> Vec<u32>;
}

/// Random sequences with an exact number of planted n-back matches.
///
/// Positions that are not planted matches never repeat their n-back
/// predecessor, so the realised density is the requested one.
#[derive(Debug, Clone)]
pub struct RandomSequenceGenerator {
    rng: StdRng,
}

impl RandomSequenceGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn random_value(&mut self, alphabet: u32, disallow: Option<u32>) -> u32 {
        match disallow {
            Some(skip) if alphabet > 1 && (1..=alphabet).contains(&skip) => {
                let v = self.rng.random_range(1..alphabet);
                if v >= skip { v + 1 } else { v }
            }
            _ => self.rng.random_range(1..=alphabet),
        }
    }
}

impl Default for RandomSequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceGenerator for RandomSequenceGenerator {
    fn generate(&mut self, request: &SequenceRequest) -> Vec<u32> {
        let len = request.num_events as usize;
        let n = request.n as usize;
        let alphabet = request.alphabet_size.max(1);

        let mut targets: Vec<usize> = (n..len).collect();
        targets.shuffle(&mut self.rng);
        targets.truncate(request.target_matches());
        targets.sort_unstable();

        let mut seq = Vec::with_capacity(len);
        for i in 0..len {
            let value = if i < n {
                self.random_value(alphabet, None)
            } else if targets.binary_search(&i).is_ok() {
                seq[i - n]
            } else {
                self.random_value(alphabet, Some(seq[i - n]))
            };
            seq.push(value);
        }
        seq
    }
}

/// Count of positions `i >= n` with `seq[i] == seq[i - n]`.
pub fn count_matches(seq: &[u32], n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    seq.iter().skip(n).zip(seq).filter(|(a, b)| a == b).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request(num_events: u32, alphabet_size: u32, match_percent: u32, n: u32) -> SequenceRequest {
        SequenceRequest {
            num_events,
            alphabet_size,
            match_percent,
            n,
        }
    }

    #[test]
    fn target_count_rounds_eligible_positions() {
        assert_eq!(request(10, 9, 35, 1).target_matches(), 3);
        assert_eq!(request(20, 9, 25, 2).target_matches(), 5);
        assert_eq!(request(3, 9, 50, 5).target_matches(), 0);
        assert_eq!(request(10, 9, 250, 1).target_matches(), 9);
    }

    #[test]
    fn seeded_generators_repeat() {
        let req = request(30, 25, 35, 2);
        let a = RandomSequenceGenerator::seeded(7).generate(&req);
        let b = RandomSequenceGenerator::seeded(7).generate(&req);
        assert_eq!(a, b);
    }

    #[test]
    fn single_symbol_alphabet_matches_everywhere() {
        let seq = RandomSequenceGenerator::seeded(1).generate(&request(6, 1, 0, 1));
        assert_eq!(seq, vec![1; 6]);
    }

    #[test]
    fn count_matches_on_known_sequence() {
        assert_eq!(count_matches(&[1, 2, 1, 3, 1], 2), 2);
        assert_eq!(count_matches(&[1, 1, 1], 1), 2);
        assert_eq!(count_matches(&[1, 2], 3), 0);
    }

    proptest! {
        #[test]
        fn shape_and_density_hold(
            num_events in 1u32..80,
            alphabet_size in 2u32..40,
            match_percent in 0u32..=100,
            n in 1u32..5,
            seed in any::<u64>(),
        ) {
            let req = request(num_events, alphabet_size, match_percent, n);
            let seq = RandomSequenceGenerator::seeded(seed).generate(&req);

            prop_assert_eq!(seq.len(), num_events as usize);
            prop_assert!(seq.iter().all(|v| (1..=alphabet_size).contains(v)));
            prop_assert_eq!(count_matches(&seq, n as usize), req.target_matches());
        }
    }
}
