//! Per-game snapshot cache with resume-on-start semantics.
//!
//! Faults never reach the player: write failures are logged and dropped,
//! unreadable or corrupt entries load as absent.

use serde::{Deserialize, Serialize};

use crate::SnapshotStorage;
use crate::constants::{
    LOG_CACHE_CORRUPT, LOG_CACHE_EVICT, LOG_CACHE_READ_FAILED, LOG_CACHE_WRITE_FAILED,
    MAX_MISTAKES, STORAGE_KEY_PREFIX,
};
use crate::day::GameNumber;
use crate::puzzle::Row;
use crate::result::{ResultSummary, result_summary};
use crate::session::GameState;

/// Storage key for a game number.
#[must_use]
pub fn storage_key(game: GameNumber) -> String {
    format!("{STORAGE_KEY_PREFIX}{game}")
}

/// Game number encoded in a storage key, if the key belongs to this cache.
#[must_use]
pub fn parse_storage_key(key: &str) -> Option<GameNumber> {
    let raw: u32 = key.strip_prefix(STORAGE_KEY_PREFIX)?.parse().ok()?;
    (raw > 0).then(|| GameNumber::new(raw))
}

const fn default_mistakes_left() -> u8 {
    MAX_MISTAKES
}

/// Serialized session state plus derived display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedSnapshot {
    pub rows: Vec<Row>,
    #[serde(default = "default_mistakes_left")]
    pub mistakes_left: u8,
    #[serde(default)]
    pub current_category: String,
    #[serde(default)]
    pub category_row_index: Option<usize>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub finished_all_rows: bool,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_clicks: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_perfect: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup_details: Option<String>,
}

impl CachedSnapshot {
    /// Copy the live state; nothing is shared with the session afterwards.
    #[must_use]
    pub fn capture(
        state: &GameState,
        current_category: Option<&str>,
        category_row_index: Option<usize>,
    ) -> Self {
        let summary = result_summary(state);
        let (total_clicks, is_perfect) = match &summary {
            Some(ResultSummary::Won {
                total_clicks,
                perfect,
                ..
            }) => (Some(*total_clicks), Some(*perfect)),
            _ => (None, None),
        };
        Self {
            rows: state.rows.clone(),
            mistakes_left: state.mistakes_left,
            current_category: current_category.unwrap_or_default().to_string(),
            category_row_index,
            completed: state.finished_all_rows,
            finished_all_rows: state.finished_all_rows,
            game_over: state.game_over,
            total_clicks,
            is_perfect,
            popup_details: summary.as_ref().map(ResultSummary::details_text),
        }
    }

    /// Rebuild a live state from the snapshot.
    #[must_use]
    pub fn to_state(&self) -> GameState {
        GameState {
            rows: self.rows.clone(),
            mistakes_left: self.mistakes_left,
            game_over: self.game_over,
            finished_all_rows: self.finished_all_rows || self.completed,
        }
    }

    #[must_use]
    pub fn current_category(&self) -> Option<&str> {
        (!self.current_category.is_empty()).then_some(self.current_category.as_str())
    }
}

/// Whether the cache reads and writes at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    #[default]
    Enabled,
    Disabled,
}

/// How many per-day entries survive a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "keep", rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// One entry per day played, never evicted.
    #[default]
    All,
    /// Keep the current game and the `count - 1` before it.
    Recent { count: u32 },
}

impl RetentionPolicy {
    /// Oldest game number that must be kept when `current` is live.
    #[must_use]
    pub const fn oldest_kept(self, current: GameNumber) -> Option<GameNumber> {
        match self {
            Self::All => None,
            Self::Recent { count } => {
                let back = if count == 0 { 0 } else { count - 1 };
                Some(GameNumber::new(current.get().saturating_sub(back)))
            }
        }
    }
}

/// Snapshot cache keyed by game number over any [`SnapshotStorage`].
#[derive(Debug, Clone)]
pub struct PersistenceCache<S> {
    storage: S,
    mode: CacheMode,
    retention: RetentionPolicy,
    max_mistakes: u8,
}

impl<S: SnapshotStorage> PersistenceCache<S> {
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            mode: CacheMode::Enabled,
            retention: RetentionPolicy::All,
            max_mistakes: MAX_MISTAKES,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: CacheMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// Upper bound used when validating loaded snapshots.
    #[must_use]
    pub fn with_max_mistakes(mut self, max_mistakes: u8) -> Self {
        self.max_mistakes = max_mistakes;
        self
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub const fn mode(&self) -> CacheMode {
        self.mode
    }

    #[must_use]
    pub const fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// Overwrite the entry for `game`. Returns whether the write landed;
    /// failures are logged and otherwise ignored.
    pub fn save(&self, game: GameNumber, snapshot: &CachedSnapshot) -> bool {
        if self.mode == CacheMode::Disabled {
            return false;
        }
        let key = storage_key(game);
        let written = serde_json::to_string(snapshot)
            .map_err(|err| err.to_string())
            .and_then(|json| {
                self.storage
                    .set_item(&key, &json)
                    .map_err(|err| err.to_string())
            });
        match written {
            Ok(()) => {
                self.evict(game);
                true
            }
            Err(err) => {
                log::error!("{LOG_CACHE_WRITE_FAILED}: {key}: {err}");
                false
            }
        }
    }

    /// Snapshot for `game`, or `None` when absent, unreadable, or corrupt.
    #[must_use]
    pub fn load(&self, game: GameNumber) -> Option<CachedSnapshot> {
        if self.mode == CacheMode::Disabled {
            return None;
        }
        let key = storage_key(game);
        let raw = match self.storage.get_item(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                log::error!("{LOG_CACHE_READ_FAILED}: {key}: {err}");
                return None;
            }
        };
        let snapshot = match self.decode(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("{LOG_CACHE_CORRUPT}: {key}: {err}");
                return None;
            }
        };
        let state = snapshot.to_state();
        if let Err(violation) = state.check_invariants(self.max_mistakes) {
            log::warn!("{LOG_CACHE_CORRUPT}: {key}: {violation}");
            return None;
        }
        // Derived fields are recomputed so the result matches the resumed session.
        Some(CachedSnapshot::capture(
            &state,
            snapshot.current_category(),
            snapshot.category_row_index,
        ))
    }

    /// Parse a stored value. A snapshot without `mistakesLeft` gets the
    /// budget minus the wrong guesses it records.
    fn decode(&self, raw: &str) -> Result<CachedSnapshot, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let has_mistakes = value.get("mistakesLeft").is_some();
        let mut snapshot: CachedSnapshot = serde_json::from_value(value)?;
        if !has_mistakes {
            let wrong = snapshot.to_state().total_wrong_guesses();
            let wrong = u8::try_from(wrong).unwrap_or(u8::MAX);
            snapshot.mistakes_left = self.max_mistakes.saturating_sub(wrong);
        }
        Ok(snapshot)
    }

    /// Remove the entry for `game`. Returns whether the removal succeeded.
    pub fn remove(&self, game: GameNumber) -> bool {
        if self.mode == CacheMode::Disabled {
            return false;
        }
        let key = storage_key(game);
        match self.storage.remove_item(&key) {
            Ok(()) => true,
            Err(err) => {
                log::error!("{LOG_CACHE_WRITE_FAILED}: {key}: {err}");
                false
            }
        }
    }

    /// Game numbers with an entry in storage, ascending.
    #[must_use]
    pub fn cached_games(&self) -> Vec<GameNumber> {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(err) => {
                log::error!("{LOG_CACHE_READ_FAILED}: listing keys: {err}");
                return Vec::new();
            }
        };
        let mut games: Vec<GameNumber> =
            keys.iter().filter_map(|key| parse_storage_key(key)).collect();
        games.sort_unstable();
        games
    }

    /// Remove entries older than `oldest`. Returns how many were removed.
    pub fn evict_before(&self, oldest: GameNumber) -> usize {
        let stale: Vec<GameNumber> = self
            .cached_games()
            .into_iter()
            .filter(|game| *game < oldest)
            .collect();
        let removed = stale.into_iter().filter(|game| self.remove(*game)).count();
        if removed > 0 {
            log::debug!("{LOG_CACHE_EVICT}: removed {removed} entries before #{oldest}");
        }
        removed
    }

    /// Apply the retention policy with `current` as the live game.
    pub fn evict(&self, current: GameNumber) -> usize {
        self.retention
            .oldest_kept(current)
            .map_or(0, |oldest| self.evict_before(oldest))
    }
}
