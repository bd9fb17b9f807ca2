//! Randomness for simulator ticks.
//!
//! Simulators draw through the [`RandomSource`] trait so tests can force
//! deterministic outcomes (always-trip, never-trip) without patching any
//! global state.

/// Source of the simulators' randomized behavior.
///
/// Only `next_u32` is required; the derived draws can be overridden by test
/// doubles to pin an outcome.
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// Uniform draw in `[lo, hi]` inclusive.
    fn range(&mut self, lo: u16, hi: u16) -> u16 {
        debug_assert!(lo <= hi, "range bounds inverted: {lo} > {hi}");
        let span = u32::from(hi - lo) + 1;
        lo + (self.next_u32() % span) as u16
    }

    /// Fair coin flip.
    fn coin_flip(&mut self) -> bool {
        self.next_u32() & 1 == 1
    }

    /// True with probability `weight / total`.
    fn weighted(&mut self, weight: u32, total: u32) -> bool {
        debug_assert!(total > 0 && weight <= total);
        self.next_u32() % total < weight
    }
}

/// Default pseudo-random source: a linear congruential generator with the
/// Numerical Recipes constants. Deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Clock-derived seed for production runs.
    #[must_use]
    pub fn entropy_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(0x1234_5678_9ABC_DEF0)
            | 1
    }
}

impl RandomSource for SimRng {
    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        // Discard the weakest low bits of the LCG state
        (self.state >> 16) as u32
    }
}
