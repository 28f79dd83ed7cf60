//! Calendar mapping from "now" to the daily game number.
use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::LAUNCH_DATE;

const DEFAULT_LAUNCH: NaiveDate =
    match NaiveDate::from_ymd_opt(LAUNCH_DATE.0, LAUNCH_DATE.1, LAUNCH_DATE.2) {
        Some(date) => date,
        None => panic!("launch date constant is not a calendar date"),
    };

/// 1-based daily puzzle number. Game #1 is the launch day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameNumber(u32);

impl GameNumber {
    pub const FIRST: Self = Self(1);

    /// Wrap a raw number, clamping zero up to game #1.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 { Self::FIRST } else { Self(value) }
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Seed for the generator; one seed per game number.
    #[must_use]
    pub const fn seed(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Zero-based day offset from launch.
    #[must_use]
    pub const fn offset(self) -> u32 {
        self.0.saturating_sub(1)
    }
}

impl Default for GameNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for GameNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<GameNumber> for u32 {
    fn from(value: GameNumber) -> Self {
        value.0
    }
}

/// Resolves instants to game numbers in a fixed civil timezone.
///
/// The executing machine's local timezone never participates, so every
/// client agrees on the game for a given UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayResolver {
    launch_date: NaiveDate,
    timezone: Tz,
}

impl Default for DayResolver {
    fn default() -> Self {
        Self::new(DEFAULT_LAUNCH, chrono_tz::America::New_York)
    }
}

impl DayResolver {
    #[must_use]
    pub const fn new(launch_date: NaiveDate, timezone: Tz) -> Self {
        Self {
            launch_date,
            timezone,
        }
    }

    #[must_use]
    pub const fn launch_date(&self) -> NaiveDate {
        self.launch_date
    }

    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Game number for a civil date already expressed in the target timezone.
    /// Dates before launch clamp to game #1.
    #[must_use]
    pub fn game_number_for_date(&self, date: NaiveDate) -> GameNumber {
        let diff = date.signed_duration_since(self.launch_date).num_days();
        if diff < 0 {
            return GameNumber::FIRST;
        }
        let offset = u32::try_from(diff).unwrap_or(u32::MAX - 1);
        GameNumber::new(offset.saturating_add(1))
    }

    /// Civil date in the target timezone for an instant.
    #[must_use]
    pub fn civil_date_at<Z: TimeZone>(&self, instant: &DateTime<Z>) -> NaiveDate {
        instant.with_timezone(&self.timezone).date_naive()
    }

    #[must_use]
    pub fn game_number_at<Z: TimeZone>(&self, instant: &DateTime<Z>) -> GameNumber {
        self.game_number_for_date(self.civil_date_at(instant))
    }

    /// Game number for the current wall-clock instant.
    #[must_use]
    pub fn today(&self) -> GameNumber {
        self.game_number_at(&Utc::now())
    }

    /// Civil date on which `game` is the live puzzle.
    #[must_use]
    pub fn launch_date_for(&self, game: GameNumber) -> Option<NaiveDate> {
        self.launch_date
            .checked_add_days(Days::new(u64::from(game.offset())))
    }
}
