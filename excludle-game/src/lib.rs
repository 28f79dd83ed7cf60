//! Excludle Game Engine
//!
//! Platform-agnostic core logic for Excludle, a daily "odd one out" puzzle.
//! Every player sees the same four rows on the same calendar day; progress is
//! cached per day so a reload resumes where the player left off.
//! This crate has no UI or platform-specific dependencies.

pub mod cache;
pub mod config;
pub mod constants;
pub mod day;
pub mod loader;
pub mod puzzle;
pub mod result;
pub mod rng;
pub mod session;
pub mod storage;
pub mod word_bank;

use chrono::{DateTime, TimeZone};
use serde::de::DeserializeOwned;

// Re-export commonly used types
pub use cache::{CacheMode, CachedSnapshot, PersistenceCache, RetentionPolicy, storage_key};
pub use config::{ConfigError, GAME_CONFIG_NAME, GameConfig};
pub use day::{DayResolver, GameNumber};
pub use loader::{DirectoryLoader, EmbeddedLoader, LoaderError};
pub use puzzle::{
    Card, PuzzleBuilder, Row, SeededShuffle, SelectionMode, SelectionStrategy, SequentialSlice,
};
pub use result::{Ending, ResultSummary, result_summary};
pub use rng::{Mulberry32, shuffle_with_rng};
pub use session::{
    GameSession, GameState, GuessOutcome, InvariantViolation, RejectReason, SessionPhase,
};
pub use storage::{FileStorage, MemoryStorage, StorageError};
pub use word_bank::{WordBank, WordBankEntry, WordBankError};

/// Trait for abstracting where the word bank and configuration come from.
/// Platform-specific implementations should provide this
pub trait WordBankLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the ordered word bank
    ///
    /// # Errors
    ///
    /// Returns an error if the word bank cannot be read or parsed.
    fn load_word_bank(&self) -> Result<WordBank, Self::Error>;

    /// Load a named configuration document, `None` if the source has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration exists but cannot be read or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<Option<T>, Self::Error>
    where
        T: DeserializeOwned;
}

/// String key/value store for cached snapshots, shaped like browser local storage.
/// Platform-specific implementations should provide this
pub trait SnapshotStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Remove `key`; removing a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), Self::Error>;

    /// Every key currently stored
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be listed.
    fn keys(&self) -> Result<Vec<String>, Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError<E> {
    #[error("loader error: {0}")]
    Loader(#[source] E),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    WordBank(#[from] WordBankError),
}

/// Main game engine: wires the day resolver, puzzle builder, and cache together
pub struct GameEngine<L, S>
where
    L: WordBankLoader,
    S: SnapshotStorage,
{
    loader: L,
    storage: S,
    config: GameConfig,
    resolver: DayResolver,
    builder: PuzzleBuilder,
}

impl<L, S> GameEngine<L, S>
where
    L: WordBankLoader,
    S: SnapshotStorage + Clone,
{
    /// Create an engine using the loader's `game` config, or defaults if it has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the word bank or configuration cannot be loaded or is invalid.
    pub fn new(loader: L, storage: S) -> Result<Self, EngineError<L::Error>> {
        let config = loader
            .load_config::<GameConfig>(GAME_CONFIG_NAME)
            .map_err(EngineError::Loader)?
            .unwrap_or_default();
        Self::with_config(loader, storage, config)
    }

    /// Create an engine with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the word bank cannot be loaded or the configuration is invalid.
    pub fn with_config(
        loader: L,
        storage: S,
        config: GameConfig,
    ) -> Result<Self, EngineError<L::Error>> {
        config.validate()?;
        let bank = loader.load_word_bank().map_err(EngineError::Loader)?;
        bank.validate()?;
        let resolver = config.day_resolver()?;
        let builder = config.puzzle_builder(bank);
        log::debug!(
            "engine ready: {} entries, {} days, selection {}",
            builder.bank().len(),
            builder.bank().days_available(config.rows_per_game),
            config.selection.as_str()
        );
        Ok(Self {
            loader,
            storage,
            config,
            resolver,
            builder,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn resolver(&self) -> &DayResolver {
        &self.resolver
    }

    #[must_use]
    pub const fn builder(&self) -> &PuzzleBuilder {
        &self.builder
    }

    #[must_use]
    pub const fn loader(&self) -> &L {
        &self.loader
    }

    /// Game number live right now.
    #[must_use]
    pub fn today(&self) -> GameNumber {
        self.resolver.today()
    }

    #[must_use]
    pub fn game_number_at<Z: TimeZone>(&self, instant: &DateTime<Z>) -> GameNumber {
        self.resolver.game_number_at(instant)
    }

    /// Fresh rows for `game`, bypassing the cache.
    #[must_use]
    pub fn build_puzzle(&self, game: GameNumber) -> Vec<Row> {
        self.builder.build(game)
    }

    /// Cache over a handle to this engine's storage.
    #[must_use]
    pub fn cache(&self) -> PersistenceCache<S> {
        self.config.persistence_cache(self.storage.clone())
    }

    /// Resume or build the session for `game`.
    #[must_use]
    pub fn start_session(&self, game: GameNumber) -> GameSession<S> {
        GameSession::start(game, &self.builder, self.cache(), self.config.max_mistakes)
    }

    /// Resume or build today's session.
    #[must_use]
    pub fn start_today(&self) -> GameSession<S> {
        self.start_session(self.today())
    }

    /// Cached snapshot for `game`, if a usable one exists.
    #[must_use]
    pub fn load_snapshot(&self, game: GameNumber) -> Option<CachedSnapshot> {
        self.cache().load(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::convert::Infallible;

    #[derive(Clone)]
    struct FixtureLoader {
        config: Option<&'static str>,
    }

    impl WordBankLoader for FixtureLoader {
        type Error = Infallible;

        fn load_word_bank(&self) -> Result<WordBank, Self::Error> {
            let entries = (0..12)
                .map(|i| {
                    WordBankEntry::new(
                        &format!("Category {i}"),
                        ["red", "green", "blue", "yellow"],
                        &format!("odd {i}"),
                    )
                })
                .collect();
            Ok(WordBank::from_entries(entries))
        }

        fn load_config<T>(&self, _config_name: &str) -> Result<Option<T>, Self::Error>
        where
            T: DeserializeOwned,
        {
            Ok(self
                .config
                .map(|json| serde_json::from_str(json).unwrap()))
        }
    }

    fn engine(config: Option<&'static str>) -> GameEngine<FixtureLoader, MemoryStorage> {
        GameEngine::new(FixtureLoader { config }, MemoryStorage::default()).unwrap()
    }

    #[test]
    fn engine_starts_and_resumes_sessions() {
        let engine = engine(None);
        let game = GameNumber::new(2);
        let mut session = engine.start_session(game);
        assert_eq!(session.rows()[0].category, "Category 4");
        let card = session.rows()[0].imposter_index().unwrap();
        assert!(session.submit_guess(0, card).is_accepted());

        let resumed = engine.start_session(game);
        assert!(resumed.was_resumed());
        assert_eq!(resumed.state(), session.state());
        assert_eq!(engine.load_snapshot(game), Some(session.snapshot()));
        assert!(engine.load_snapshot(GameNumber::new(3)).is_none());
    }

    #[test]
    fn loader_config_overrides_defaults() {
        let engine = engine(Some(r#"{"max_mistakes": 1, "cache": "disabled"}"#));
        assert_eq!(engine.config().max_mistakes, 1);
        let mut session = engine.start_session(GameNumber::FIRST);
        let imposter = session.rows()[0].imposter_index().unwrap();
        let wrong = (imposter + 1) % constants::CARDS_PER_ROW;
        assert!(matches!(
            session.submit_guess(0, wrong),
            GuessOutcome::Lost(_)
        ));
        assert!(engine.load_snapshot(GameNumber::FIRST).is_none());
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let result = GameEngine::new(
            FixtureLoader {
                config: Some(r#"{"timezone": "Nowhere/Special"}"#),
            },
            MemoryStorage::default(),
        );
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn instants_resolve_through_the_configured_calendar() {
        let engine = engine(None);
        let second_day = Utc.with_ymd_and_hms(2025, 12, 13, 17, 0, 0).unwrap();
        assert_eq!(engine.game_number_at(&second_day), GameNumber::new(2));
        assert!(engine.today() >= GameNumber::FIRST);
        assert_eq!(
            engine.build_puzzle(GameNumber::new(3)),
            engine.start_session(GameNumber::new(3)).rows()
        );
    }
}
