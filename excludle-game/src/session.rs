//! Session state machine for one day's puzzle.
//!
//! `GameSession` exclusively owns the live [`GameState`]. The only mutating
//! entry points are [`GameSession::submit_guess`] and [`GameSession::restart`];
//! every accepted call writes exactly one snapshot to the cache.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::SnapshotStorage;
use crate::cache::{CachedSnapshot, PersistenceCache};
use crate::constants::{
    CARDS_PER_ROW, LOG_GUESS_REJECTED, LOG_SESSION_BUILT, LOG_SESSION_RESUMED, MSG_ROW_SOLVED,
    MSG_WRONG_GUESS,
};
use crate::day::GameNumber;
use crate::puzzle::{PuzzleBuilder, Row, SelectionStrategy};
use crate::result::{ResultSummary, result_summary};

/// Rows, remaining mistakes, and the two terminal flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub rows: Vec<Row>,
    pub mistakes_left: u8,
    pub game_over: bool,
    pub finished_all_rows: bool,
}

/// A broken structural rule, reported when validating restored state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    NoRows,
    ImposterCount { row: usize },
    SelectionMismatch { row: usize },
    WrongIndex { row: usize, index: usize },
    UnsolvedBeforeSolved { row: usize },
    MistakesOutOfRange { mistakes_left: u8, max: u8 },
    OutOfMistakesButPlaying,
    BothTerminalFlags,
    FinishedWithUnsolvedRows,
    SolvedButNotFinished,
    GameOverWithMistakesLeft { mistakes_left: u8 },
    MistakeCountMismatch { wrong_guesses: usize, mistakes_left: u8, max: u8 },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRows => write!(f, "no rows"),
            Self::ImposterCount { row } => write!(f, "row {row} needs exactly one imposter"),
            Self::SelectionMismatch { row } => {
                write!(f, "row {row} selection disagrees with its solved flag")
            }
            Self::WrongIndex { row, index } => {
                write!(f, "row {row} lists invalid wrong guess {index}")
            }
            Self::UnsolvedBeforeSolved { row } => {
                write!(f, "row {row} is solved after an unsolved row")
            }
            Self::MistakesOutOfRange { mistakes_left, max } => {
                write!(f, "mistakes left {mistakes_left} exceeds {max}")
            }
            Self::OutOfMistakesButPlaying => write!(f, "no mistakes left but game not over"),
            Self::BothTerminalFlags => write!(f, "both won and lost"),
            Self::FinishedWithUnsolvedRows => write!(f, "finished with unsolved rows"),
            Self::SolvedButNotFinished => write!(f, "every row solved but game not finished"),
            Self::GameOverWithMistakesLeft { mistakes_left } => {
                write!(f, "game over with {mistakes_left} mistakes left")
            }
            Self::MistakeCountMismatch {
                wrong_guesses,
                mistakes_left,
                max,
            } => write!(
                f,
                "{wrong_guesses} wrong guesses do not match {mistakes_left} of {max} mistakes left"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}

impl GameState {
    /// Fresh state: nothing solved, full mistake budget.
    #[must_use]
    pub const fn new(rows: Vec<Row>, max_mistakes: u8) -> Self {
        Self {
            rows,
            mistakes_left: max_mistakes,
            game_over: false,
            finished_all_rows: false,
        }
    }

    /// Index of the first unsolved row.
    #[must_use]
    pub fn active_row_index(&self) -> Option<usize> {
        self.rows.iter().position(|row| !row.solved)
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.game_over || self.finished_all_rows
    }

    #[must_use]
    pub fn solved_count(&self) -> usize {
        self.rows.iter().filter(|row| row.solved).count()
    }

    /// One click per solved row plus one per wrong guess anywhere.
    #[must_use]
    pub fn total_clicks(&self) -> usize {
        self.rows.iter().map(Row::clicks).sum()
    }

    #[must_use]
    pub fn total_wrong_guesses(&self) -> usize {
        self.rows.iter().map(|row| row.wrong_indices.len()).sum()
    }

    /// Check every structural rule a reachable state satisfies.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn check_invariants(&self, max_mistakes: u8) -> Result<(), InvariantViolation> {
        if self.rows.is_empty() {
            return Err(InvariantViolation::NoRows);
        }
        let mut seen_unsolved = false;
        for (row_index, row) in self.rows.iter().enumerate() {
            let imposter = row
                .imposter_index()
                .ok_or(InvariantViolation::ImposterCount { row: row_index })?;
            let expected = row.solved.then_some(imposter);
            if row.selected_index != expected {
                return Err(InvariantViolation::SelectionMismatch { row: row_index });
            }
            for (position, &index) in row.wrong_indices.iter().enumerate() {
                let invalid = index >= CARDS_PER_ROW
                    || index == imposter
                    || row.wrong_indices[..position].contains(&index);
                if invalid {
                    return Err(InvariantViolation::WrongIndex {
                        row: row_index,
                        index,
                    });
                }
            }
            if row.solved && seen_unsolved {
                return Err(InvariantViolation::UnsolvedBeforeSolved { row: row_index });
            }
            seen_unsolved |= !row.solved;
        }
        if self.mistakes_left > max_mistakes {
            return Err(InvariantViolation::MistakesOutOfRange {
                mistakes_left: self.mistakes_left,
                max: max_mistakes,
            });
        }
        if self.mistakes_left == 0 && !self.game_over {
            return Err(InvariantViolation::OutOfMistakesButPlaying);
        }
        if self.game_over && self.finished_all_rows {
            return Err(InvariantViolation::BothTerminalFlags);
        }
        if self.finished_all_rows && seen_unsolved {
            return Err(InvariantViolation::FinishedWithUnsolvedRows);
        }
        if !seen_unsolved && !self.finished_all_rows {
            return Err(InvariantViolation::SolvedButNotFinished);
        }
        if self.game_over && self.mistakes_left != 0 {
            return Err(InvariantViolation::GameOverWithMistakesLeft {
                mistakes_left: self.mistakes_left,
            });
        }
        let wrong_guesses = self.total_wrong_guesses();
        let spent = usize::from(max_mistakes - self.mistakes_left);
        if wrong_guesses != spent {
            return Err(InvariantViolation::MistakeCountMismatch {
                wrong_guesses,
                mistakes_left: self.mistakes_left,
                max: max_mistakes,
            });
        }
        Ok(())
    }
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for a guess on this row.
    Active(usize),
    Won,
    Lost,
    /// Puzzle with no rows; nothing to play.
    Empty,
}

impl SessionPhase {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Why a guess was ignored. Diagnostics only; the state is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Terminal,
    NotActiveRow,
    RowSolved,
    AlreadyGuessed,
    CardOutOfRange,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Terminal => "game already finished",
            Self::NotActiveRow => "row is not active",
            Self::RowSolved => "row already solved",
            Self::AlreadyGuessed => "card already guessed",
            Self::CardOutOfRange => "card index out of range",
        };
        f.write_str(text)
    }
}

/// Result of one `submit_guess` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    Rejected(RejectReason),
    /// Imposter found; the next row is now active.
    Correct { row: usize },
    /// Not the imposter; the row stays active.
    Wrong { row: usize, mistakes_left: u8 },
    Won(ResultSummary),
    Lost(ResultSummary),
}

impl GuessOutcome {
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    /// Footer message for the outcome, `None` for rejections.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Rejected(_) => None,
            Self::Correct { .. } => Some(MSG_ROW_SOLVED.to_string()),
            Self::Wrong { .. } => Some(MSG_WRONG_GUESS.to_string()),
            Self::Won(summary) | Self::Lost(summary) => Some(summary.status_message()),
        }
    }
}

/// One player's session on one game number.
#[derive(Debug, Clone)]
pub struct GameSession<S> {
    game: GameNumber,
    state: GameState,
    current_category: Option<String>,
    category_row_index: Option<usize>,
    max_mistakes: u8,
    resumed: bool,
    cache: PersistenceCache<S>,
}

impl<S: SnapshotStorage> GameSession<S> {
    /// Resume `game` from the cache, or build it fresh when nothing usable
    /// is stored. A fresh build is not written until the first accepted guess.
    #[must_use]
    pub fn start<P: SelectionStrategy>(
        game: GameNumber,
        builder: &PuzzleBuilder<P>,
        cache: PersistenceCache<S>,
        max_mistakes: u8,
    ) -> Self {
        let max_mistakes = max_mistakes.max(1);
        let cache = cache.with_max_mistakes(max_mistakes);
        if let Some(snapshot) = cache.load(game) {
            log::debug!("{LOG_SESSION_RESUMED}: game #{game}");
            return Self {
                game,
                state: snapshot.to_state(),
                current_category: snapshot.current_category().map(str::to_string),
                category_row_index: snapshot.category_row_index,
                max_mistakes,
                resumed: true,
                cache,
            };
        }
        log::debug!("{LOG_SESSION_BUILT}: game #{game}");
        Self {
            game,
            state: GameState::new(builder.build(game), max_mistakes),
            current_category: None,
            category_row_index: None,
            max_mistakes,
            resumed: false,
            cache,
        }
    }

    /// Apply a card tap. Invalid taps are no-ops.
    pub fn submit_guess(&mut self, row_index: usize, card_index: usize) -> GuessOutcome {
        let outcome = self.apply_guess(row_index, card_index);
        match &outcome {
            GuessOutcome::Rejected(reason) => {
                log::trace!(
                    "{LOG_GUESS_REJECTED}: game #{} row {row_index} card {card_index}: {reason}",
                    self.game
                );
            }
            _ => self.persist(),
        }
        outcome
    }

    fn apply_guess(&mut self, row_index: usize, card_index: usize) -> GuessOutcome {
        if self.state.is_terminal() {
            return GuessOutcome::Rejected(RejectReason::Terminal);
        }
        if self.state.rows.get(row_index).is_some_and(|row| row.solved) {
            return GuessOutcome::Rejected(RejectReason::RowSolved);
        }
        let Some(active) = self.state.active_row_index() else {
            return GuessOutcome::Rejected(RejectReason::NotActiveRow);
        };
        if row_index != active {
            return GuessOutcome::Rejected(RejectReason::NotActiveRow);
        }
        let row = &mut self.state.rows[active];
        let Some(card) = row.cards.get(card_index) else {
            return GuessOutcome::Rejected(RejectReason::CardOutOfRange);
        };
        if row.is_wrong_guess(card_index) {
            return GuessOutcome::Rejected(RejectReason::AlreadyGuessed);
        }

        if card.is_imposter {
            row.solved = true;
            row.selected_index = Some(card_index);
            self.current_category = Some(row.category.clone());
            self.category_row_index = Some(active);
            if self.state.rows.iter().all(|r| r.solved) {
                self.state.finished_all_rows = true;
                return self.terminal_outcome();
            }
            return GuessOutcome::Correct { row: active };
        }

        row.wrong_indices.push(card_index);
        let category = row.category.clone();
        self.state.mistakes_left = self.state.mistakes_left.saturating_sub(1);
        if self.state.mistakes_left == 0 {
            self.state.game_over = true;
            self.current_category = Some(category);
            self.category_row_index = Some(active);
            return self.terminal_outcome();
        }
        GuessOutcome::Wrong {
            row: active,
            mistakes_left: self.state.mistakes_left,
        }
    }

    fn terminal_outcome(&self) -> GuessOutcome {
        match result_summary(&self.state) {
            Some(summary @ ResultSummary::Won { .. }) => GuessOutcome::Won(summary),
            Some(summary @ ResultSummary::Lost { .. }) => GuessOutcome::Lost(summary),
            None => GuessOutcome::Rejected(RejectReason::Terminal),
        }
    }

    /// Throw away progress and rebuild today's puzzle from scratch.
    pub fn restart<P: SelectionStrategy>(&mut self, builder: &PuzzleBuilder<P>) {
        self.state = GameState::new(builder.build(self.game), self.max_mistakes);
        self.current_category = None;
        self.category_row_index = None;
        self.resumed = false;
        self.persist();
    }

    fn persist(&self) {
        self.cache.save(self.game, &self.snapshot());
    }

    /// Detached copy of the current state and display fields.
    #[must_use]
    pub fn snapshot(&self) -> CachedSnapshot {
        CachedSnapshot::capture(
            &self.state,
            self.current_category.as_deref(),
            self.category_row_index,
        )
    }

    #[must_use]
    pub const fn game_number(&self) -> GameNumber {
        self.game
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.state.rows
    }

    #[must_use]
    pub fn active_row_index(&self) -> Option<usize> {
        self.state.active_row_index()
    }

    #[must_use]
    pub const fn mistakes_left(&self) -> u8 {
        self.state.mistakes_left
    }

    #[must_use]
    pub const fn max_mistakes(&self) -> u8 {
        self.max_mistakes
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.state.finished_all_rows {
            SessionPhase::Won
        } else if self.state.game_over {
            SessionPhase::Lost
        } else {
            self.state
                .active_row_index()
                .map_or(SessionPhase::Empty, SessionPhase::Active)
        }
    }

    #[must_use]
    pub fn summary(&self) -> Option<ResultSummary> {
        result_summary(&self.state)
    }

    /// Category of the last solved row, or of the losing row after a loss.
    #[must_use]
    pub fn current_category(&self) -> Option<&str> {
        self.current_category.as_deref()
    }

    #[must_use]
    pub const fn category_row_index(&self) -> Option<usize> {
        self.category_row_index
    }

    /// Whether the session was restored from a cached snapshot.
    #[must_use]
    pub const fn was_resumed(&self) -> bool {
        self.resumed
    }

    #[must_use]
    pub const fn cache(&self) -> &PersistenceCache<S> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_MISTAKES;
    use crate::storage::MemoryStorage;
    use crate::word_bank::{WordBank, WordBankEntry};

    fn builder() -> PuzzleBuilder {
        let entries = (0..8)
            .map(|i| {
                WordBankEntry::new(
                    &format!("Category {i}"),
                    ["one", "two", "three", "four"],
                    &format!("odd {i}"),
                )
            })
            .collect();
        PuzzleBuilder::new(WordBank::from_entries(entries))
    }

    fn session(storage: &MemoryStorage) -> GameSession<MemoryStorage> {
        GameSession::start(
            GameNumber::new(1),
            &builder(),
            PersistenceCache::new(storage.clone()),
            MAX_MISTAKES,
        )
    }

    fn imposter(session: &GameSession<MemoryStorage>, row: usize) -> usize {
        session.rows()[row].imposter_index().unwrap()
    }

    fn decoy(session: &GameSession<MemoryStorage>, row: usize, skip: usize) -> usize {
        let imposter = imposter(session, row);
        (0..CARDS_PER_ROW)
            .filter(|&i| i != imposter)
            .nth(skip)
            .unwrap()
    }

    #[test]
    fn fresh_session_starts_on_row_zero_without_writing() {
        let storage = MemoryStorage::new();
        let session = session(&storage);
        assert_eq!(session.phase(), SessionPhase::Active(0));
        assert_eq!(session.mistakes_left(), MAX_MISTAKES);
        assert!(!session.was_resumed());
        assert!(storage.is_empty());
    }

    #[test]
    fn correct_guess_advances_row_and_records_category() {
        let storage = MemoryStorage::new();
        let mut session = session(&storage);
        let card = imposter(&session, 0);
        assert_eq!(session.submit_guess(0, card), GuessOutcome::Correct { row: 0 });
        assert_eq!(session.phase(), SessionPhase::Active(1));
        assert_eq!(session.rows()[0].selected_index, Some(card));
        assert_eq!(session.current_category(), Some("Category 0"));
        assert_eq!(session.category_row_index(), Some(0));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn wrong_guess_costs_a_mistake_and_keeps_row() {
        let storage = MemoryStorage::new();
        let mut session = session(&storage);
        let card = decoy(&session, 0, 0);
        let outcome = session.submit_guess(0, card);
        assert_eq!(
            outcome,
            GuessOutcome::Wrong {
                row: 0,
                mistakes_left: 2
            }
        );
        assert_eq!(
            outcome.message().as_deref(),
            Some("Nope. Try a different option in this row.")
        );
        assert_eq!(session.phase(), SessionPhase::Active(0));
        assert_eq!(session.rows()[0].wrong_indices.as_slice(), &[card]);
        assert!(session.current_category().is_none());
    }

    #[test]
    fn rejected_guesses_change_nothing_and_write_nothing() {
        let storage = MemoryStorage::new();
        let mut session = session(&storage);
        let wrong = decoy(&session, 0, 1);
        session.submit_guess(0, wrong);
        let before = session.state().clone();
        let writes = storage.raw("excludle_game_1");

        assert_eq!(
            session.submit_guess(1, 0),
            GuessOutcome::Rejected(RejectReason::NotActiveRow)
        );
        assert_eq!(
            session.submit_guess(0, wrong),
            GuessOutcome::Rejected(RejectReason::AlreadyGuessed)
        );
        assert_eq!(
            session.submit_guess(0, CARDS_PER_ROW),
            GuessOutcome::Rejected(RejectReason::CardOutOfRange)
        );
        assert_eq!(session.state(), &before);
        assert_eq!(storage.raw("excludle_game_1"), writes);
    }

    #[test]
    fn three_wrong_guesses_lose_the_game() {
        let storage = MemoryStorage::new();
        let mut session = session(&storage);
        let mut seen = Vec::new();
        for skip in 0..3 {
            let card = decoy(&session, 0, skip);
            seen.push(session.submit_guess(0, card));
        }
        assert_eq!(session.mistakes_left(), 0);
        assert_eq!(session.phase(), SessionPhase::Lost);
        match seen.last().unwrap() {
            GuessOutcome::Lost(ResultSummary::Lost {
                rows_solved,
                category,
                imposter,
                ..
            }) => {
                assert_eq!(*rows_solved, 0);
                assert_eq!(category, "Category 0");
                assert_eq!(imposter, "odd 0");
            }
            other => panic!("expected loss, got {other:?}"),
        }
        assert_eq!(session.current_category(), Some("Category 0"));
    }

    #[test]
    fn terminal_state_is_frozen() {
        let storage = MemoryStorage::new();
        let mut session = session(&storage);
        for skip in 0..3 {
            let card = decoy(&session, 0, skip);
            session.submit_guess(0, card);
        }
        let frozen = session.state().clone();
        let stored = storage.raw("excludle_game_1");
        for card in 0..CARDS_PER_ROW {
            assert_eq!(
                session.submit_guess(0, card),
                GuessOutcome::Rejected(RejectReason::Terminal)
            );
        }
        assert_eq!(session.state(), &frozen);
        assert_eq!(storage.raw("excludle_game_1"), stored);
    }

    #[test]
    fn perfect_game_counts_one_click_per_row() {
        let storage = MemoryStorage::new();
        let mut session = session(&storage);
        let mut last = None;
        for row in 0..4 {
            let card = imposter(&session, row);
            last = Some(session.submit_guess(row, card));
        }
        assert_eq!(session.phase(), SessionPhase::Won);
        assert!(session.active_row_index().is_none());
        match last.unwrap() {
            GuessOutcome::Won(summary) => {
                assert!(summary.is_perfect());
                assert_eq!(summary.detail_lines()[1], "Total clicks: 4");
            }
            other => panic!("expected win, got {other:?}"),
        }
        let snapshot = session.snapshot();
        assert!(snapshot.completed);
        assert_eq!(snapshot.total_clicks, Some(4));
        assert_eq!(snapshot.is_perfect, Some(true));
    }

    #[test]
    fn resumed_session_continues_where_it_left_off() {
        let storage = MemoryStorage::new();
        let mut first = session(&storage);
        let card = imposter(&first, 0);
        first.submit_guess(0, card);
        let wrong = decoy(&first, 1, 0);
        first.submit_guess(1, wrong);

        let second = session(&storage);
        assert!(second.was_resumed());
        assert_eq!(second.state(), first.state());
        assert_eq!(second.phase(), SessionPhase::Active(1));
        assert_eq!(second.current_category(), Some("Category 0"));
    }

    #[test]
    fn new_game_number_ignores_yesterdays_snapshot() {
        let storage = MemoryStorage::new();
        let mut first = session(&storage);
        let card = imposter(&first, 0);
        first.submit_guess(0, card);

        let tomorrow = GameSession::start(
            GameNumber::new(2),
            &builder(),
            PersistenceCache::new(storage.clone()),
            MAX_MISTAKES,
        );
        assert!(!tomorrow.was_resumed());
        assert_eq!(tomorrow.phase(), SessionPhase::Active(0));
        assert_eq!(tomorrow.rows()[0].category, "Category 4");
    }

    #[test]
    fn restart_rebuilds_and_overwrites_cache() {
        let storage = MemoryStorage::new();
        let mut session = session(&storage);
        let card = decoy(&session, 0, 0);
        session.submit_guess(0, card);
        session.restart(&builder());
        assert_eq!(session.mistakes_left(), MAX_MISTAKES);
        assert!(session.rows().iter().all(|r| r.wrong_indices.is_empty()));

        let resumed = GameSession::start(
            GameNumber::new(1),
            &builder(),
            PersistenceCache::new(storage),
            MAX_MISTAKES,
        );
        assert_eq!(resumed.mistakes_left(), MAX_MISTAKES);
    }

    #[test]
    fn custom_mistake_budget_resumes() {
        let storage = MemoryStorage::new();
        let start = || {
            GameSession::start(
                GameNumber::new(1),
                &builder(),
                PersistenceCache::new(storage.clone()),
                5,
            )
        };
        let mut first = start();
        let card = decoy(&first, 0, 0);
        first.submit_guess(0, card);
        assert_eq!(first.mistakes_left(), 4);

        let second = start();
        assert!(second.was_resumed());
        assert_eq!(second.mistakes_left(), 4);
        assert_eq!(second.state(), first.state());
    }

    #[test]
    fn tapping_a_solved_row_reports_it() {
        let storage = MemoryStorage::new();
        let mut session = session(&storage);
        let card = imposter(&session, 0);
        session.submit_guess(0, card);
        let before = session.state().clone();
        assert_eq!(
            session.submit_guess(0, card),
            GuessOutcome::Rejected(RejectReason::RowSolved)
        );
        assert_eq!(
            session.submit_guess(2, 0),
            GuessOutcome::Rejected(RejectReason::NotActiveRow)
        );
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn invariant_checker_catches_unreachable_flags() {
        let session = session(&MemoryStorage::new());
        let mut state = session.state().clone();
        for row in &mut state.rows {
            row.solved = true;
            row.selected_index = row.imposter_index();
        }
        assert_eq!(
            state.check_invariants(MAX_MISTAKES),
            Err(InvariantViolation::SolvedButNotFinished)
        );
        state.finished_all_rows = true;
        assert_eq!(state.check_invariants(MAX_MISTAKES), Ok(()));

        let imposter = state.rows[0].imposter_index();
        let wrong = (0..CARDS_PER_ROW).find(|&i| Some(i) != imposter).unwrap();
        state.rows[0].wrong_indices.push(wrong);
        assert_eq!(
            state.check_invariants(MAX_MISTAKES),
            Err(InvariantViolation::MistakeCountMismatch {
                wrong_guesses: 1,
                mistakes_left: 3,
                max: 3
            })
        );
    }

    #[test]
    fn empty_puzzle_is_inert() {
        let storage = MemoryStorage::new();
        let mut session = GameSession::start(
            GameNumber::new(1),
            &PuzzleBuilder::new(WordBank::empty()),
            PersistenceCache::new(storage.clone()),
            MAX_MISTAKES,
        );
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(!session.is_terminal());
        assert_eq!(
            session.submit_guess(0, 0),
            GuessOutcome::Rejected(RejectReason::NotActiveRow)
        );
        assert!(storage.is_empty());
    }

    #[test]
    fn invariant_checker_catches_out_of_order_rows() {
        let session = session(&MemoryStorage::new());
        let mut state = session.state().clone();
        assert_eq!(state.check_invariants(MAX_MISTAKES), Ok(()));
        let imposter = state.rows[1].imposter_index().unwrap();
        state.rows[1].solved = true;
        state.rows[1].selected_index = Some(imposter);
        assert_eq!(
            state.check_invariants(MAX_MISTAKES),
            Err(InvariantViolation::UnsolvedBeforeSolved { row: 1 })
        );
    }
}
