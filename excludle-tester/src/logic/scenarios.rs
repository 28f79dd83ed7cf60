//! Named logic scenarios run against the real word bank.

use anyhow::{Context, Result, bail, ensure};
use excludle_game::constants::{CARDS_PER_ROW, MAX_MISTAKES, ROWS_PER_GAME};
use excludle_game::{
    DayResolver, EmbeddedLoader, GameConfig, GameEngine, GameNumber, GameSession, GuessOutcome,
    MemoryStorage, RejectReason, ResultSummary, SelectionMode, SessionPhase, storage_key,
};

use super::policy::{PlayerPolicy, PolicyKind};

pub type Engine = GameEngine<EmbeddedLoader, MemoryStorage>;
pub type Session = GameSession<MemoryStorage>;

/// Upper bound on taps for open-ended policies.
const MAX_TAPS: usize = 60;

/// Inputs for one scenario iteration.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioCtx {
    pub game: GameNumber,
    pub iteration: usize,
    pub selection: SelectionMode,
}

impl ScenarioCtx {
    /// Seed for simulated players, unique per game and iteration.
    pub fn seed(&self) -> u64 {
        let iteration = u64::try_from(self.iteration).unwrap_or(u64::MAX) & 0xFFFF_FFFF;
        (u64::from(self.game.get()) << 32) | iteration
    }

    pub fn engine(&self, storage: MemoryStorage) -> Result<Engine> {
        let config = GameConfig {
            selection: self.selection,
            ..GameConfig::default()
        };
        GameEngine::with_config(EmbeddedLoader, storage, config)
            .context("failed to build game engine")
    }
}

pub struct Scenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub run: fn(&ScenarioCtx) -> Result<()>,
}

static SCENARIOS: [Scenario; 8] = [
    Scenario {
        key: "determinism",
        name: "Deterministic Puzzle Build",
        description: "Two builds of the same game number are identical",
        run: determinism,
    },
    Scenario {
        key: "calendar",
        name: "Calendar Mapping",
        description: "Game numbers and civil dates map onto each other",
        run: calendar,
    },
    Scenario {
        key: "perfect-run",
        name: "Perfect Run",
        description: "Imposter first try on every row wins a perfect game",
        run: perfect_run,
    },
    Scenario {
        key: "mistake-exhaustion",
        name: "Mistake Exhaustion",
        description: "Three misses on the first row lose with nothing solved",
        run: mistake_exhaustion,
    },
    Scenario {
        key: "late-loss",
        name: "Late Loss",
        description: "Solving some rows then missing out reports the losing row",
        run: late_loss,
    },
    Scenario {
        key: "resume",
        name: "Resume From Cache",
        description: "A reload resumes the same day and starts the next day fresh",
        run: resume,
    },
    Scenario {
        key: "terminal-freeze",
        name: "Terminal Freeze",
        description: "No tap changes a finished game or its cached snapshot",
        run: terminal_freeze,
    },
    Scenario {
        key: "random-play",
        name: "Random Play Invariants",
        description: "Seeded random taps never break a session invariant",
        run: random_play,
    },
];

pub fn catalog() -> &'static [Scenario] {
    &SCENARIOS
}

pub fn get_scenario(key: &str) -> Option<&'static Scenario> {
    catalog()
        .iter()
        .find(|scenario| scenario.key.eq_ignore_ascii_case(key))
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog()
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

/// Play `policy` until it runs out of taps, checking invariants after each one.
fn drive(
    session: &mut Session,
    policy: &mut PlayerPolicy,
    max_taps: usize,
) -> Result<Vec<GuessOutcome>> {
    let mut outcomes = Vec::new();
    let mut last_active = session.active_row_index().unwrap_or(0);
    for _ in 0..max_taps {
        if session.is_terminal() && policy.kind() != PolicyKind::Random {
            break;
        }
        let Some(tap) = policy.next_tap(session.rows(), session.active_row_index()) else {
            break;
        };
        let before = session.state().clone();
        let outcome = session.submit_guess(tap.row, tap.card);

        let state = session.state();
        state
            .check_invariants(session.max_mistakes())
            .with_context(|| format!("after tap {tap:?} ({outcome:?})"))?;
        if !outcome.is_accepted() {
            ensure!(state == &before, "rejected tap {tap:?} changed the state");
        } else {
            let cached = session.cache().load(session.game_number());
            ensure!(
                cached.as_ref() == Some(&session.snapshot()),
                "cache out of sync after tap {tap:?}"
            );
        }
        if let Some(active) = session.active_row_index() {
            ensure!(
                active >= last_active,
                "active row went back from {last_active} to {active}"
            );
            last_active = active;
        }
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn final_summary(session: &Session) -> Result<ResultSummary> {
    session
        .summary()
        .with_context(|| format!("game #{} did not finish", session.game_number()))
}

fn determinism(ctx: &ScenarioCtx) -> Result<()> {
    let first = ctx.engine(MemoryStorage::new())?.build_puzzle(ctx.game);
    let second = ctx.engine(MemoryStorage::new())?.build_puzzle(ctx.game);
    ensure!(first == second, "two builds of game #{} differ", ctx.game);
    ensure!(
        first.len() == ROWS_PER_GAME,
        "game #{} has {} rows",
        ctx.game,
        first.len()
    );
    for row in &first {
        ensure!(
            row.imposter_index().is_some(),
            "row {:?} needs exactly one imposter",
            row.category
        );
    }
    Ok(())
}

fn calendar(ctx: &ScenarioCtx) -> Result<()> {
    let resolver = DayResolver::default();
    let date = resolver
        .launch_date_for(ctx.game)
        .context("game number has no calendar date")?;
    ensure!(
        resolver.game_number_for_date(date) == ctx.game,
        "{date} does not map back to game #{}",
        ctx.game
    );
    let noon = date
        .and_hms_opt(12, 0, 0)
        .context("noon is not a valid time")?
        .and_utc();
    ensure!(
        resolver.game_number_at(&noon) == ctx.game,
        "noon UTC on {date} resolves to the wrong game"
    );
    let previous = date.pred_opt().context("no day before launch")?;
    let expected = GameNumber::new(ctx.game.get().saturating_sub(1));
    ensure!(
        resolver.game_number_for_date(previous) == expected,
        "{previous} should be game #{expected}"
    );
    Ok(())
}

fn perfect_run(ctx: &ScenarioCtx) -> Result<()> {
    let engine = ctx.engine(MemoryStorage::new())?;
    let mut session = engine.start_session(ctx.game);
    let mut policy = PlayerPolicy::new(PolicyKind::Perfect, ctx.seed());
    drive(&mut session, &mut policy, MAX_TAPS)?;
    ensure!(session.phase() == SessionPhase::Won, "perfect play did not win");
    match final_summary(&session)? {
        ResultSummary::Won {
            total_clicks,
            perfect,
            mistakes_remaining,
            ..
        } => {
            ensure!(total_clicks == ROWS_PER_GAME, "total clicks {total_clicks}");
            ensure!(perfect, "perfect flag missing");
            ensure!(mistakes_remaining == MAX_MISTAKES, "lost a mistake");
        }
        other => bail!("expected a win, got {other:?}"),
    }
    Ok(())
}

fn mistake_exhaustion(ctx: &ScenarioCtx) -> Result<()> {
    let engine = ctx.engine(MemoryStorage::new())?;
    let mut session = engine.start_session(ctx.game);
    let mut policy = PlayerPolicy::new(PolicyKind::Decoy, ctx.seed());
    let outcomes = drive(&mut session, &mut policy, MAX_TAPS)?;
    ensure!(
        outcomes.len() == usize::from(MAX_MISTAKES),
        "took {} taps to lose",
        outcomes.len()
    );
    ensure!(session.mistakes_left() == 0, "mistakes left after loss");
    let first_row = &session.rows()[0];
    match final_summary(&session)? {
        ResultSummary::Lost {
            rows_solved,
            imposter,
            category,
            ..
        } => {
            ensure!(rows_solved == 0, "rows solved {rows_solved}");
            ensure!(category == first_row.category, "losing category {category}");
            ensure!(
                Some(imposter.as_str()) == first_row.imposter_word(),
                "revealed imposter {imposter}"
            );
        }
        other => bail!("expected a loss, got {other:?}"),
    }
    Ok(())
}

fn late_loss(ctx: &ScenarioCtx) -> Result<()> {
    let solved_first = ctx.iteration % ROWS_PER_GAME;
    let engine = ctx.engine(MemoryStorage::new())?;
    let mut session = engine.start_session(ctx.game);
    let mut perfect = PlayerPolicy::new(PolicyKind::Perfect, ctx.seed());
    drive(&mut session, &mut perfect, solved_first)?;
    let mut decoy = PlayerPolicy::new(PolicyKind::Decoy, ctx.seed());
    drive(&mut session, &mut decoy, MAX_TAPS)?;

    let losing_row = &session.rows()[solved_first];
    match final_summary(&session)? {
        ResultSummary::Lost {
            rows_solved,
            category,
            ..
        } => {
            ensure!(rows_solved == solved_first, "rows solved {rows_solved}");
            ensure!(category == losing_row.category, "losing category {category}");
        }
        other => bail!("expected a loss, got {other:?}"),
    }
    ensure!(
        session.current_category() == Some(losing_row.category.as_str()),
        "display category not updated on loss"
    );
    Ok(())
}

fn resume(ctx: &ScenarioCtx) -> Result<()> {
    let storage = MemoryStorage::new();
    let engine = ctx.engine(storage.clone())?;
    let mut session = engine.start_session(ctx.game);
    let mut policy = PlayerPolicy::new(PolicyKind::Random, ctx.seed());
    let outcomes = drive(&mut session, &mut policy, ctx.iteration % 6 + 1)?;
    let any_accepted = outcomes.iter().any(GuessOutcome::is_accepted);

    let reloaded = ctx.engine(storage)?;
    let resumed = reloaded.start_session(ctx.game);
    ensure!(
        resumed.was_resumed() == any_accepted,
        "resumed {} after {} accepted taps",
        resumed.was_resumed(),
        outcomes.iter().filter(|o| o.is_accepted()).count()
    );
    ensure!(resumed.state() == session.state(), "resumed state differs");
    ensure!(
        resumed.current_category() == session.current_category(),
        "resumed display category differs"
    );

    let tomorrow = reloaded.start_session(ctx.game.next());
    ensure!(!tomorrow.was_resumed(), "next day reused a snapshot");
    ensure!(
        tomorrow.phase() == SessionPhase::Active(0),
        "next day did not start fresh"
    );
    Ok(())
}

fn terminal_freeze(ctx: &ScenarioCtx) -> Result<()> {
    let storage = MemoryStorage::new();
    let engine = ctx.engine(storage.clone())?;
    let mut session = engine.start_session(ctx.game);
    let kind = if ctx.iteration % 2 == 0 {
        PolicyKind::Decoy
    } else {
        PolicyKind::Perfect
    };
    let mut policy = PlayerPolicy::new(kind, ctx.seed());
    drive(&mut session, &mut policy, MAX_TAPS)?;
    ensure!(session.is_terminal(), "{} policy did not finish", kind.label());

    let frozen = session.state().clone();
    let key = storage_key(ctx.game);
    let stored = storage.raw(&key);
    ensure!(stored.is_some(), "finished game was never cached");
    for row in 0..=ROWS_PER_GAME {
        for card in 0..=CARDS_PER_ROW {
            let outcome = session.submit_guess(row, card);
            ensure!(
                outcome == GuessOutcome::Rejected(RejectReason::Terminal),
                "tap ({row}, {card}) on a finished game gave {outcome:?}"
            );
        }
    }
    ensure!(session.state() == &frozen, "finished state changed");
    ensure!(storage.raw(&key) == stored, "finished snapshot rewritten");
    Ok(())
}

fn random_play(ctx: &ScenarioCtx) -> Result<()> {
    let engine = ctx.engine(MemoryStorage::new())?;
    let mut session = engine.start_session(ctx.game);
    let mut policy = PlayerPolicy::new(PolicyKind::Random, ctx.seed());
    drive(&mut session, &mut policy, MAX_TAPS)?;
    ensure!(
        session.is_terminal() == session.summary().is_some(),
        "summary presence disagrees with terminal flags"
    );
    Ok(())
}
