//! Simulated players. Each policy picks a card for the active row.

use excludle_game::Row;
use excludle_game::constants::CARDS_PER_ROW;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Always taps the imposter.
    Perfect,
    /// Never taps the imposter while an untried decoy remains.
    Decoy,
    /// Any card on any row, including invalid taps.
    Random,
}

impl PolicyKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "perfect",
            Self::Decoy => "decoy",
            Self::Random => "random",
        }
    }
}

/// A tap the policy wants to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tap {
    pub row: usize,
    pub card: usize,
}

pub struct PlayerPolicy {
    kind: PolicyKind,
    rng: ChaCha20Rng,
}

impl PlayerPolicy {
    pub fn new(kind: PolicyKind, seed: u64) -> Self {
        Self {
            kind,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub const fn kind(&self) -> PolicyKind {
        self.kind
    }

    /// Next tap given the rows and the active row, `None` if nothing sensible remains.
    pub fn next_tap(&mut self, rows: &[Row], active: Option<usize>) -> Option<Tap> {
        match self.kind {
            PolicyKind::Perfect => {
                let row = active?;
                let card = rows.get(row)?.imposter_index()?;
                Some(Tap { row, card })
            }
            PolicyKind::Decoy => {
                let row = active?;
                let target = rows.get(row)?;
                let imposter = target.imposter_index()?;
                let mut untried: Vec<usize> = (0..CARDS_PER_ROW)
                    .filter(|&i| i != imposter && !target.is_wrong_guess(i))
                    .collect();
                untried.shuffle(&mut self.rng);
                untried.first().map(|&card| Tap { row, card })
            }
            PolicyKind::Random => {
                let row_bound = rows.len().max(1) + 1;
                let row = if self.rng.gen_bool(0.8) {
                    active.unwrap_or(0)
                } else {
                    self.rng.gen_range(0..row_bound)
                };
                let card = self.rng.gen_range(0..=CARDS_PER_ROW);
                Some(Tap { row, card })
            }
        }
    }
}
