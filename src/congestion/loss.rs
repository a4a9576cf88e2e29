//! Loss sources.
//!
//! [`RandomLoss`] is what a running simulation uses; [`NeverLose`] and
//! [`ScriptedLoss`] make controller behaviour reproducible.

use std::collections::VecDeque;

use crate::core::LossSource;

#[cfg(feature = "random")]
pub use random::RandomLoss;

#[cfg(feature = "random")]
mod random {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::core::LossSource;

    /// Loss decided by a uniform draw in `[0, 1)` from an owned RNG.
    #[derive(Debug, Clone)]
    pub struct RandomLoss<R = StdRng> {
        rng: R,
    }

    impl RandomLoss<StdRng> {
        /// Create a loss source seeded from OS entropy.
        pub fn new() -> Self {
            Self {
                rng: StdRng::from_entropy(),
            }
        }

        /// Create a reproducible loss source.
        pub fn seeded(seed: u64) -> Self {
            Self {
                rng: StdRng::seed_from_u64(seed),
            }
        }
    }

    impl Default for RandomLoss<StdRng> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<R: Rng> RandomLoss<R> {
        /// Wrap an existing RNG.
        pub fn from_rng(rng: R) -> Self {
            Self { rng }
        }
    }

    impl<R: Rng> LossSource for RandomLoss<R> {
        fn is_lost(&mut self, probability: f64) -> bool {
            self.rng.r#gen::<f64>() < probability
        }
    }
}

/// Never loses anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverLose;

impl LossSource for NeverLose {
    fn is_lost(&mut self, _probability: f64) -> bool {
        false
    }
}

/// Replays a fixed list of loss decisions, then stops losing.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLoss {
    script: VecDeque<bool>,
}

impl ScriptedLoss {
    /// Create a script; `true` entries are losses.
    pub fn new(script: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Decisions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl LossSource for ScriptedLoss {
    fn is_lost(&mut self, _probability: f64) -> bool {
        self.script.pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_lose() {
        let mut loss = NeverLose;
        assert!(!loss.is_lost(1.0));
    }

    #[test]
    fn test_scripted_then_exhausted() {
        let mut loss = ScriptedLoss::new([true, false, true]);
        assert!(loss.is_lost(0.0));
        assert!(!loss.is_lost(0.0));
        assert!(loss.is_lost(0.0));
        assert_eq!(loss.remaining(), 0);
        assert!(!loss.is_lost(1.0));
    }

    #[test]
    fn test_boxed_source() {
        let mut loss: Box<dyn LossSource> = Box::new(ScriptedLoss::new([true]));
        assert!(loss.is_lost(0.5));
        assert!(!loss.is_lost(0.5));
    }

    #[cfg(feature = "random")]
    #[test]
    fn test_random_extremes() {
        let mut loss = RandomLoss::seeded(7);
        for _ in 0..100 {
            assert!(!loss.is_lost(0.0));
            assert!(loss.is_lost(1.0));
        }
    }

    #[cfg(feature = "random")]
    #[test]
    fn test_random_seeded_is_reproducible() {
        let mut a = RandomLoss::seeded(42);
        let mut b = RandomLoss::seeded(42);
        let draws_a: Vec<bool> = (0..64).map(|_| a.is_lost(0.3)).collect();
        let draws_b: Vec<bool> = (0..64).map(|_| b.is_lost(0.3)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[cfg(feature = "random")]
    #[test]
    fn test_random_from_rng_matches_seeded() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let mut wrapped = RandomLoss::from_rng(StdRng::seed_from_u64(5));
        let mut seeded = RandomLoss::seeded(5);
        for _ in 0..32 {
            assert_eq!(wrapped.is_lost(0.5), seeded.is_lost(0.5));
        }
    }

    #[cfg(feature = "random")]
    #[test]
    fn test_random_rate_is_plausible() {
        let mut loss = RandomLoss::seeded(1);
        let lost = (0..10_000).filter(|_| loss.is_lost(0.1)).count();
        assert!((700..1300).contains(&lost), "lost {lost} of 10000");
    }
}
