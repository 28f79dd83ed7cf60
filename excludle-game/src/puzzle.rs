//! Daily puzzle construction: which word bank entries appear, and in what card order.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{CARDS_PER_ROW, ROWS_PER_GAME, SELECTION_SALT};
use crate::day::GameNumber;
use crate::rng::{Mulberry32, shuffle_with_rng};
use crate::word_bank::{WordBank, WordBankEntry};

/// Card indices guessed wrong in a row, in the order they were guessed.
pub type WrongIndices = SmallVec<[usize; CARDS_PER_ROW]>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub text: String,
    pub is_imposter: bool,
}

impl Card {
    fn correct(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_imposter: false,
        }
    }

    fn imposter(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_imposter: true,
        }
    }
}

/// One category row: five cards, exactly one of them the imposter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub category: String,
    pub cards: [Card; CARDS_PER_ROW],
    #[serde(default)]
    pub solved: bool,
    #[serde(default)]
    pub selected_index: Option<usize>,
    #[serde(default)]
    pub wrong_indices: WrongIndices,
}

impl Row {
    /// Cards in word bank order: the four correct words, then the imposter.
    #[must_use]
    pub fn unshuffled(entry: &WordBankEntry) -> Self {
        let [w1, w2, w3, w4] = entry.correct_words();
        Self {
            category: entry.category.clone(),
            cards: [
                Card::correct(w1),
                Card::correct(w2),
                Card::correct(w3),
                Card::correct(w4),
                Card::imposter(&entry.imposter),
            ],
            solved: false,
            selected_index: None,
            wrong_indices: WrongIndices::new(),
        }
    }

    #[must_use]
    pub fn shuffled(entry: &WordBankEntry, rng: &mut Mulberry32) -> Self {
        let mut row = Self::unshuffled(entry);
        shuffle_with_rng(&mut row.cards, rng);
        row
    }

    /// Position of the imposter card, if the row has exactly one.
    #[must_use]
    pub fn imposter_index(&self) -> Option<usize> {
        let mut found = self.cards.iter().enumerate().filter(|(_, c)| c.is_imposter);
        match (found.next(), found.next()) {
            (Some((index, _)), None) => Some(index),
            _ => None,
        }
    }

    #[must_use]
    pub fn imposter_word(&self) -> Option<&str> {
        self.cards
            .iter()
            .find(|c| c.is_imposter)
            .map(|c| c.text.as_str())
    }

    #[must_use]
    pub fn is_wrong_guess(&self, card_index: usize) -> bool {
        self.wrong_indices.contains(&card_index)
    }

    /// Clicks spent on this row: the wrong guesses plus the solving click.
    #[must_use]
    pub fn clicks(&self) -> usize {
        self.wrong_indices.len() + usize::from(self.solved)
    }
}

/// Chooses which word bank entries make up a day's puzzle.
pub trait SelectionStrategy {
    /// Word bank indices for `game`, in row order. Never longer than `rows`.
    fn select(&self, game: GameNumber, bank_len: usize, rows: usize) -> Vec<usize>;
}

/// First `rows` entries, used whenever a strategy would run past the bank.
#[must_use]
pub fn fallback_indices(bank_len: usize, rows: usize) -> Vec<usize> {
    (0..rows.min(bank_len)).collect()
}

/// Day N takes entries `[(N-1)*rows, N*rows)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequentialSlice;

impl SelectionStrategy for SequentialSlice {
    fn select(&self, game: GameNumber, bank_len: usize, rows: usize) -> Vec<usize> {
        let start = usize::try_from(game.offset())
            .ok()
            .and_then(|offset| offset.checked_mul(rows));
        match start.and_then(|s| s.checked_add(rows).map(|end| (s, end))) {
            Some((start, end)) if end <= bank_len => (start..end).collect(),
            _ => fallback_indices(bank_len, rows),
        }
    }
}

/// Shuffle the whole bank with a game-seeded generator and take the head.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeededShuffle;

impl SelectionStrategy for SeededShuffle {
    fn select(&self, game: GameNumber, bank_len: usize, rows: usize) -> Vec<usize> {
        if bank_len < rows {
            return fallback_indices(bank_len, rows);
        }
        let mut rng = Mulberry32::new(game.seed() ^ SELECTION_SALT);
        let mut indices: Vec<usize> = (0..bank_len).collect();
        shuffle_with_rng(&mut indices, &mut rng);
        indices.truncate(rows);
        indices
    }
}

/// Serializable choice between the built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Sequential,
    SeededShuffle,
}

impl SelectionMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::SeededShuffle => "seeded_shuffle",
        }
    }
}

impl std::str::FromStr for SelectionMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(Self::Sequential),
            "seeded_shuffle" | "seeded-shuffle" => Ok(Self::SeededShuffle),
            _ => Err(()),
        }
    }
}

impl SelectionStrategy for SelectionMode {
    fn select(&self, game: GameNumber, bank_len: usize, rows: usize) -> Vec<usize> {
        match self {
            Self::Sequential => SequentialSlice.select(game, bank_len, rows),
            Self::SeededShuffle => SeededShuffle.select(game, bank_len, rows),
        }
    }
}

/// Builds the rows for a game number from a fixed word bank.
#[derive(Debug, Clone)]
pub struct PuzzleBuilder<S = SelectionMode> {
    bank: WordBank,
    rows_per_game: usize,
    selection: S,
}

impl PuzzleBuilder<SelectionMode> {
    #[must_use]
    pub fn new(bank: WordBank) -> Self {
        Self::with_strategy(bank, SelectionMode::default())
    }
}

impl<S: SelectionStrategy> PuzzleBuilder<S> {
    #[must_use]
    pub fn with_strategy(bank: WordBank, selection: S) -> Self {
        Self {
            bank,
            rows_per_game: ROWS_PER_GAME,
            selection,
        }
    }

    #[must_use]
    pub fn rows_per_game(mut self, rows: usize) -> Self {
        self.rows_per_game = rows;
        self
    }

    #[must_use]
    pub const fn bank(&self) -> &WordBank {
        &self.bank
    }

    #[must_use]
    pub const fn selection(&self) -> &S {
        &self.selection
    }

    /// Rows for `game`. Card order comes from a generator seeded by the game
    /// number and shared across rows in order, so the same game number always
    /// yields the same puzzle.
    #[must_use]
    pub fn build(&self, game: GameNumber) -> Vec<Row> {
        let indices = self
            .selection
            .select(game, self.bank.len(), self.rows_per_game);
        let mut rng = Mulberry32::new(game.seed());
        let rows: Vec<Row> = indices
            .into_iter()
            .filter_map(|index| self.bank.get(index))
            .map(|entry| Row::shuffled(entry, &mut rng))
            .collect();
        log::debug!("built game #{game} with {} rows", rows.len());
        rows
    }
}
