//! Fixed rules and identifiers for the daily puzzle.
//!
//! These values define the deployed game. Changing any of them changes which
//! puzzle every player sees on a given day, so they live in code rather than
//! in external JSON assets.

// Rules --------------------------------------------------------------------
/// Number of category rows in every daily puzzle.
pub const ROWS_PER_GAME: usize = 4;
/// Wrong guesses allowed across the whole game.
pub const MAX_MISTAKES: u8 = 3;
/// Four correct words plus one imposter.
pub const CARDS_PER_ROW: usize = 5;

// Calendar -----------------------------------------------------------------
/// Civil date of game #1, as `(year, month, day)`.
pub const LAUNCH_DATE: (i32, u32, u32) = (2025, 12, 12);
/// Timezone whose midnight rolls the game number over.
pub const TIMEZONE: &str = "America/New_York";

// Generator ----------------------------------------------------------------
pub(crate) const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;
pub(crate) const SELECTION_SALT: u32 = 0x9E37_79B9;

// Storage ------------------------------------------------------------------
/// Prefix of every cached snapshot key; the game number follows it.
pub const STORAGE_KEY_PREFIX: &str = "excludle_game_";
pub(crate) const FILE_STORAGE_EXTENSION: &str = "json";

// Messages -----------------------------------------------------------------
pub(crate) const MSG_ROW_SOLVED: &str = "Nice! Move on to the next row.";
pub(crate) const MSG_WRONG_GUESS: &str = "Nope. Try a different option in this row.";
pub(crate) const MSG_LOST: &str = "Game Over! Try again tomorrow.";
pub(crate) const HEADLINE_WON: &str = "You found all the imposters!";
pub(crate) const HEADLINE_LOST: &str = "Game over";

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_CACHE_WRITE_FAILED: &str = "cache.write-failed";
pub(crate) const LOG_CACHE_READ_FAILED: &str = "cache.read-failed";
pub(crate) const LOG_CACHE_CORRUPT: &str = "cache.corrupt";
pub(crate) const LOG_CACHE_EVICT: &str = "cache.evict";
pub(crate) const LOG_SESSION_RESUMED: &str = "session.resumed";
pub(crate) const LOG_SESSION_BUILT: &str = "session.built";
pub(crate) const LOG_GUESS_REJECTED: &str = "guess.rejected";
