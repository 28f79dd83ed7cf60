use serde::{Deserialize, Serialize};

const EMBEDDED_WORD_BANK: &str = include_str!("../assets/word_bank.json");

/// One hidden category: four words that belong and one imposter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBankEntry {
    pub category: String,
    pub word1: String,
    pub word2: String,
    pub word3: String,
    pub word4: String,
    pub imposter: String,
}

impl WordBankEntry {
    #[must_use]
    pub fn new(category: &str, correct: [&str; 4], imposter: &str) -> Self {
        Self {
            category: category.to_string(),
            word1: correct[0].to_string(),
            word2: correct[1].to_string(),
            word3: correct[2].to_string(),
            word4: correct[3].to_string(),
            imposter: imposter.to_string(),
        }
    }

    #[must_use]
    pub fn correct_words(&self) -> [&str; 4] {
        [&self.word1, &self.word2, &self.word3, &self.word4]
    }

    fn check(&self) -> Result<(), &'static str> {
        if self.category.trim().is_empty() {
            return Err("empty category");
        }
        let correct = self.correct_words();
        if correct.iter().any(|w| w.trim().is_empty()) || self.imposter.trim().is_empty() {
            return Err("empty word");
        }
        if correct
            .iter()
            .any(|w| w.trim().eq_ignore_ascii_case(self.imposter.trim()))
        {
            return Err("imposter repeats a correct word");
        }
        for (i, a) in correct.iter().enumerate() {
            if correct[i + 1..]
                .iter()
                .any(|b| a.trim().eq_ignore_ascii_case(b.trim()))
            {
                return Err("duplicate correct word");
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WordBankError {
    #[error("word bank JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("word bank entry {index} ({category:?}) is invalid: {reason}")]
    Invalid {
        index: usize,
        category: String,
        reason: &'static str,
    },
}

/// Ordered word bank. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WordBank {
    pub games: Vec<WordBankEntry>,
}

impl WordBank {
    /// Create an empty word bank (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self { games: Vec::new() }
    }

    #[must_use]
    pub fn from_entries(games: Vec<WordBankEntry>) -> Self {
        Self { games }
    }

    /// Load a word bank from a JSON string shaped `{"games": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into word bank entries.
    pub fn from_json(json: &str) -> Result<Self, WordBankError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The dataset compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset fails to parse.
    pub fn embedded() -> Result<Self, WordBankError> {
        Self::from_json(EMBEDDED_WORD_BANK)
    }

    /// Check every entry for blank or duplicated words.
    ///
    /// # Errors
    ///
    /// Returns the first offending entry.
    pub fn validate(&self) -> Result<(), WordBankError> {
        for (index, entry) in self.games.iter().enumerate() {
            entry.check().map_err(|reason| WordBankError::Invalid {
                index,
                category: entry.category.clone(),
                reason,
            })?;
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&WordBankEntry> {
        self.games.get(index)
    }

    /// Number of distinct days the bank covers at `rows_per_game` rows a day.
    #[must_use]
    pub fn days_available(&self, rows_per_game: usize) -> usize {
        if rows_per_game == 0 {
            return 0;
        }
        self.games.len() / rows_per_game
    }
}
