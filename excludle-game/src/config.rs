use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::SnapshotStorage;
use crate::cache::{CacheMode, PersistenceCache, RetentionPolicy};
use crate::constants::{MAX_MISTAKES, ROWS_PER_GAME, TIMEZONE};
use crate::day::DayResolver;
use crate::puzzle::{PuzzleBuilder, SelectionMode};
use crate::word_bank::WordBank;

/// Name under which loaders look up the game configuration.
pub const GAME_CONFIG_NAME: &str = "game";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown timezone {name:?}: {reason}")]
    Timezone { name: String, reason: String },
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Deployment settings. Every field defaults to the live game's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub launch_date: NaiveDate,
    pub timezone: String,
    pub rows_per_game: usize,
    pub max_mistakes: u8,
    pub selection: SelectionMode,
    pub cache: CacheMode,
    pub retention: RetentionPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            launch_date: DayResolver::default().launch_date(),
            timezone: TIMEZONE.to_string(),
            rows_per_game: ROWS_PER_GAME,
            max_mistakes: MAX_MISTAKES,
            selection: SelectionMode::default(),
            cache: CacheMode::default(),
            retention: RetentionPolicy::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON, an unknown timezone, or zero rows/mistakes.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns the first setting that cannot produce a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows_per_game == 0 {
            return Err(ConfigError::Invalid("rows_per_game must be at least 1"));
        }
        if self.max_mistakes == 0 {
            return Err(ConfigError::Invalid("max_mistakes must be at least 1"));
        }
        if matches!(self.retention, RetentionPolicy::Recent { count: 0 }) {
            return Err(ConfigError::Invalid("retention count must be at least 1"));
        }
        self.timezone().map(|_| ())
    }

    /// # Errors
    ///
    /// Returns an error if `timezone` is not an IANA zone name.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| ConfigError::Timezone {
                name: self.timezone.clone(),
                reason: err.to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns an error if `timezone` is not an IANA zone name.
    pub fn day_resolver(&self) -> Result<DayResolver, ConfigError> {
        Ok(DayResolver::new(self.launch_date, self.timezone()?))
    }

    #[must_use]
    pub fn puzzle_builder(&self, bank: WordBank) -> PuzzleBuilder {
        PuzzleBuilder::with_strategy(bank, self.selection).rows_per_game(self.rows_per_game)
    }

    #[must_use]
    pub fn persistence_cache<S: SnapshotStorage>(&self, storage: S) -> PersistenceCache<S> {
        PersistenceCache::new(storage)
            .with_mode(self.cache)
            .with_retention(self.retention)
            .with_max_mistakes(self.max_mistakes)
    }
}
