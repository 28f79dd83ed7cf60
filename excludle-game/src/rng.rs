//! Seeded generator used for every shuffle in the daily puzzle.
//!
//! Mulberry32: a 32-bit state advanced by a fixed increment and mixed on each
//! draw. Integer-only, so the sequence for a seed is identical on every target.

use rand::RngCore;

use crate::constants::MULBERRY_INCREMENT;

const TWO_POW_32: f64 = 4_294_967_296.0;

/// Deterministic pseudo-random source keyed by a 32-bit seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Advance the state once and return the mixed 32-bit output.
    pub const fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// Uniform index in `0..bound`. `bound` must be non-zero.
    pub fn next_index(&mut self, bound: usize) -> usize {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let index = (self.next_f64() * bound as f64).floor() as usize;
        index.min(bound.saturating_sub(1))
    }
}

impl Iterator for Mulberry32 {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_f64())
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        Self::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(Self::next_u32(self));
        let high = u64::from(Self::next_u32(self));
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = Self::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Fisher-Yates shuffle from the last index down, drawing one value per swap.
pub fn shuffle_with_rng<T>(items: &mut [T], rng: &mut Mulberry32) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}
