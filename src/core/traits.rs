//! Injectable collaborators of the controller.
//!
//! Randomness and time are owned by each controller instance through these
//! traits, so tests can swap in deterministic stubs and independent
//! connections never share hidden state.

use std::time::Instant;

/// Source of simulated transmission loss.
///
/// Implementations decide, for a probability in `[0, 1]`, whether a single
/// transmission is lost.
///
/// # Example
///
/// ```
/// use tahoe_cc::core::LossSource;
///
/// /// Loses every other transmission.
/// struct Alternating(bool);
///
/// impl LossSource for Alternating {
///     fn is_lost(&mut self, _probability: f64) -> bool {
///         self.0 = !self.0;
///         self.0
///     }
/// }
///
/// let mut loss = Alternating(false);
/// assert!(loss.is_lost(0.5));
/// assert!(!loss.is_lost(0.5));
/// ```
pub trait LossSource {
    /// Decide whether the next transmission is lost.
    fn is_lost(&mut self, probability: f64) -> bool;
}

impl<L: LossSource + ?Sized> LossSource for Box<L> {
    fn is_lost(&mut self, probability: f64) -> bool {
        (**self).is_lost(probability)
    }
}

/// Monotonic time source.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> Instant;
}
