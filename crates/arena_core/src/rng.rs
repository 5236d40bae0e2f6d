//! Seeded pseudo-random number generation.
//!
//! Everything random in the simulation (map layout, AI rolls) is drawn
//! from a [`SeededPrng`], so a stored seed replays an entire run. The
//! generator is SplitMix64: the state is a pure function of the seed and
//! the call count, with no global or thread-local state.

use serde::{Deserialize, Serialize};

/// SplitMix64 increment (golden-ratio gamma).
const GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic pseudo-random number generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeededPrng {
    /// The seed this stream started from.
    seed: u64,
    /// Current counter state.
    state: u64,
}

impl SeededPrng {
    /// Create a generator from an explicit seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed, state: seed }
    }

    /// Create a generator seeded from the system clock.
    ///
    /// The chosen seed is retrievable via [`seed()`](Self::seed) so the
    /// run can still be replayed after the fact.
    #[must_use]
    pub fn from_entropy() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5DEE_CE66_D);
        Self::new(nanos ^ nanos.rotate_left(29))
    }

    /// The seed this generator was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Next raw 64-bit value (SplitMix64 output function).
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Next value in `[0, 1)`.
    ///
    /// The top 32 bits of the raw output become the fractional part,
    /// which is exact in I32F32.
    pub fn next_unit(&mut self) -> crate::math::Fixed {
        crate::math::Fixed::from_bits((self.next_u64() >> 32) as i64)
    }

    /// Next integer in `[min, max_exclusive)`.
    ///
    /// A degenerate range (`max_exclusive <= min`) returns `min`.
    pub fn next_int(&mut self, min: i32, max_exclusive: i32) -> i32 {
        let span = max_exclusive as i64 - min as i64;
        if span <= 0 {
            return min;
        }
        (min as i64 + (self.next_u64() % span as u64) as i64) as i32
    }

    /// Next fixed-point value in `[min, max)`.
    ///
    /// A degenerate range (`max <= min`) returns `min`.
    pub fn next_range(
        &mut self,
        min: crate::math::Fixed,
        max: crate::math::Fixed,
    ) -> crate::math::Fixed {
        if max <= min {
            return min;
        }
        min + self.next_unit() * (max - min)
    }

    /// Choose a random element from a slice.
    ///
    /// Returns `None` only for an empty slice.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.next_int(0, items.len() as i32) as usize;
        items.get(index)
    }
}
