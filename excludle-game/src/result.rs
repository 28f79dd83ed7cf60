//! End game result calculation
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{HEADLINE_LOST, HEADLINE_WON, MSG_LOST};
use crate::session::GameState;

/// Possible game ending types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ending {
    /// Every row solved before the mistake budget ran out
    Victory,
    /// Mistake budget exhausted
    Defeat,
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Victory => write!(f, "victory"),
            Self::Defeat => write!(f, "defeat"),
        }
    }
}

/// Structured outcome of a finished game, for display on the result screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ending", rename_all = "lowercase")]
pub enum ResultSummary {
    Won {
        rows_cleared: usize,
        total_rows: usize,
        total_clicks: usize,
        mistakes_remaining: u8,
        perfect: bool,
    },
    Lost {
        rows_solved: usize,
        total_rows: usize,
        category: String,
        /// Only ever revealed on a loss.
        imposter: String,
    },
}

impl ResultSummary {
    #[must_use]
    pub const fn ending(&self) -> Ending {
        match self {
            Self::Won { .. } => Ending::Victory,
            Self::Lost { .. } => Ending::Defeat,
        }
    }

    #[must_use]
    pub const fn is_perfect(&self) -> bool {
        matches!(self, Self::Won { perfect: true, .. })
    }

    #[must_use]
    pub const fn headline(&self) -> &'static str {
        match self {
            Self::Won { .. } => HEADLINE_WON,
            Self::Lost { .. } => HEADLINE_LOST,
        }
    }

    /// Footer status line shown once the game is over.
    #[must_use]
    pub fn status_message(&self) -> String {
        match self {
            Self::Won { total_rows, .. } => format!("You solved all {total_rows} rows!"),
            Self::Lost { .. } => MSG_LOST.to_string(),
        }
    }

    #[must_use]
    pub fn detail_lines(&self) -> Vec<String> {
        match self {
            Self::Won {
                rows_cleared,
                total_rows,
                total_clicks,
                mistakes_remaining,
                perfect,
            } => {
                let mut lines = vec![
                    format!("Rows cleared: {rows_cleared}/{total_rows}"),
                    format!("Total clicks: {total_clicks}"),
                    format!("Mistakes remaining: {mistakes_remaining}"),
                ];
                if *perfect {
                    lines.push("Perfect Game!".to_string());
                }
                lines
            }
            Self::Lost {
                rows_solved,
                total_rows,
                category,
                imposter,
            } => vec![
                format!("You solved {rows_solved} of {total_rows} rows."),
                format!("Category: {category}"),
                format!("Odd One Out: {imposter}"),
            ],
        }
    }

    /// Detail lines as one block of text; losses separate paragraphs with a blank line.
    #[must_use]
    pub fn details_text(&self) -> String {
        let separator = match self {
            Self::Won { .. } => "\n",
            Self::Lost { .. } => "\n\n",
        };
        self.detail_lines().join(separator)
    }
}

/// Summary for a terminal state, `None` while the game is still in play.
#[must_use]
pub fn result_summary(state: &GameState) -> Option<ResultSummary> {
    let total_rows = state.rows.len();
    if state.finished_all_rows {
        let total_clicks = state.total_clicks();
        return Some(ResultSummary::Won {
            rows_cleared: state.solved_count(),
            total_rows,
            total_clicks,
            mistakes_remaining: state.mistakes_left,
            perfect: total_clicks == total_rows,
        });
    }
    if state.game_over {
        let losing = state.rows.iter().find(|row| !row.solved);
        return Some(ResultSummary::Lost {
            rows_solved: state.solved_count(),
            total_rows,
            category: losing.map(|row| row.category.clone()).unwrap_or_default(),
            imposter: losing
                .and_then(|row| row.imposter_word())
                .unwrap_or_default()
                .to_string(),
        });
    }
    None
}
