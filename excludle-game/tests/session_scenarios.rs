use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rand::Rng;

use excludle_game::constants::{CARDS_PER_ROW, MAX_MISTAKES, ROWS_PER_GAME};
use excludle_game::{
    CachedSnapshot, DayResolver, EmbeddedLoader, FileStorage, GameEngine, GameNumber,
    GameSession, GuessOutcome, MemoryStorage, Mulberry32, RejectReason, ResultSummary,
    SessionPhase, SnapshotStorage, storage_key,
};

fn engine() -> GameEngine<EmbeddedLoader, MemoryStorage> {
    GameEngine::new(EmbeddedLoader, MemoryStorage::new()).unwrap()
}

fn imposter<S: SnapshotStorage>(session: &GameSession<S>, row: usize) -> usize {
    session.rows()[row].imposter_index().unwrap()
}

fn decoys<S: SnapshotStorage>(session: &GameSession<S>, row: usize) -> Vec<usize> {
    let imposter = imposter(session, row);
    (0..CARDS_PER_ROW).filter(|&i| i != imposter).collect()
}

#[test]
fn perfect_run_on_game_one() {
    let engine = engine();
    let mut session = engine.start_session(GameNumber::FIRST);
    let expected = [0, 4, 0, 2];
    let mut outcomes = Vec::new();
    for (row, card) in expected.into_iter().enumerate() {
        assert_eq!(session.phase(), SessionPhase::Active(row));
        outcomes.push(session.submit_guess(row, card));
    }
    assert_eq!(
        outcomes[..3],
        [
            GuessOutcome::Correct { row: 0 },
            GuessOutcome::Correct { row: 1 },
            GuessOutcome::Correct { row: 2 },
        ]
    );
    assert_eq!(
        outcomes[0].message().as_deref(),
        Some("Nice! Move on to the next row.")
    );
    let GuessOutcome::Won(summary) = &outcomes[3] else {
        panic!("expected a win, got {:?}", outcomes[3]);
    };
    assert_eq!(
        summary,
        &ResultSummary::Won {
            rows_cleared: 4,
            total_rows: 4,
            total_clicks: 4,
            mistakes_remaining: MAX_MISTAKES,
            perfect: true,
        }
    );
    assert_eq!(summary.headline(), "You found all the imposters!");
    assert_eq!(
        outcomes[3].message().as_deref(),
        Some("You solved all 4 rows!")
    );
    assert_eq!(session.phase(), SessionPhase::Won);
    assert_eq!(session.current_category(), Some("Things that are pickled"));
    assert_eq!(session.category_row_index(), Some(3));
}

#[test]
fn three_misses_on_the_first_row_lose() {
    let engine = engine();
    let mut session = engine.start_session(GameNumber::FIRST);
    let misses = decoys(&session, 0);
    let mut budget = Vec::new();
    for &card in &misses[..2] {
        session.submit_guess(0, card);
        budget.push(session.mistakes_left());
    }
    assert_eq!(budget, [2, 1]);
    let GuessOutcome::Lost(summary) = session.submit_guess(0, misses[2]) else {
        panic!("third miss should lose");
    };
    assert_eq!(session.mistakes_left(), 0);
    assert_eq!(
        summary,
        ResultSummary::Lost {
            rows_solved: 0,
            total_rows: 4,
            category: "High _____".to_string(),
            imposter: "Banana".to_string(),
        }
    );
    assert_eq!(
        summary.details_text(),
        "You solved 0 of 4 rows.\n\nCategory: High _____\n\nOdd One Out: Banana"
    );
}

#[test]
fn late_loss_reports_the_losing_row() {
    let engine = engine();
    let mut session = engine.start_session(GameNumber::FIRST);
    let card = imposter(&session, 0);
    session.submit_guess(0, card);
    let misses = decoys(&session, 1);
    let mut last = None;
    for &card in &misses[..3] {
        last = Some(session.submit_guess(1, card));
    }
    match last.unwrap() {
        GuessOutcome::Lost(ResultSummary::Lost {
            rows_solved,
            category,
            imposter,
            ..
        }) => {
            assert_eq!(rows_solved, 1);
            assert_eq!(category, "Types of races");
            assert_eq!(imposter, "Dolphin");
        }
        other => panic!("expected loss, got {other:?}"),
    }
    assert_eq!(session.current_category(), Some("Types of races"));
    assert_eq!(session.category_row_index(), Some(1));
}

#[test]
fn mistakes_carry_across_rows() {
    let engine = engine();
    let mut session = engine.start_session(GameNumber::new(2));
    let miss = decoys(&session, 0)[0];
    session.submit_guess(0, miss);
    let card = imposter(&session, 0);
    session.submit_guess(0, card);
    let miss = decoys(&session, 1)[3];
    session.submit_guess(1, miss);
    assert_eq!(session.mistakes_left(), 1);
    for row in 1..ROWS_PER_GAME {
        let card = imposter(&session, row);
        session.submit_guess(row, card);
    }
    let summary = session.summary().unwrap();
    assert!(!summary.is_perfect());
    assert_eq!(
        summary.detail_lines(),
        ["Rows cleared: 4/4", "Total clicks: 6", "Mistakes remaining: 1"]
    );
}

#[test]
fn terminal_sessions_reject_every_guess() {
    let engine = engine();
    let storage_probe = engine.cache();
    let mut session = engine.start_session(GameNumber::FIRST);
    for &card in &decoys(&session, 0)[..3] {
        session.submit_guess(0, card);
    }
    let frozen = session.state().clone();
    let stored = storage_probe
        .storage()
        .get_item(&storage_key(GameNumber::FIRST))
        .unwrap();
    for row in 0..ROWS_PER_GAME + 1 {
        for card in 0..CARDS_PER_ROW + 1 {
            assert_eq!(
                session.submit_guess(row, card),
                GuessOutcome::Rejected(RejectReason::Terminal)
            );
        }
    }
    assert_eq!(session.state(), &frozen);
    assert_eq!(
        storage_probe
            .storage()
            .get_item(&storage_key(GameNumber::FIRST))
            .unwrap(),
        stored
    );
}

#[test]
fn random_play_keeps_every_invariant() {
    let engine = engine();
    for seed in 0..200_u32 {
        let mut rng = Mulberry32::new(seed);
        let game = GameNumber::new(rng.gen_range(1..=25));
        let cache = engine.cache();
        cache.remove(game);
        let mut session = engine.start_session(game);
        let mut last_active = 0;
        for _ in 0..40 {
            let row = rng.gen_range(0..ROWS_PER_GAME);
            let card = rng.gen_range(0..CARDS_PER_ROW);
            let before = session.state().clone();
            let outcome = session.submit_guess(row, card);

            let state = session.state();
            assert!(state.mistakes_left <= MAX_MISTAKES);
            assert!(state.mistakes_left > 0 || state.game_over);
            state.check_invariants(MAX_MISTAKES).unwrap();
            if before.is_terminal() {
                assert_eq!(state, &before);
            }
            if !outcome.is_accepted() {
                assert_eq!(state, &before);
            } else {
                assert_eq!(cache.load(game), Some(session.snapshot()));
            }
            if let Some(active) = session.active_row_index() {
                assert!(active >= last_active, "active row went backwards");
                last_active = active;
            }
        }
    }
}

#[test]
fn reload_resumes_mid_game_from_disk() {
    let dir = std::env::temp_dir().join(format!(
        "excludle-resume-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ));
    let game = GameNumber::new(5);
    let first = GameEngine::new(EmbeddedLoader, FileStorage::new(&dir)).unwrap();
    let mut session = first.start_session(game);
    let card = imposter(&session, 0);
    session.submit_guess(0, card);
    let miss = decoys(&session, 1)[0];
    session.submit_guess(1, miss);

    let reloaded = GameEngine::new(EmbeddedLoader, FileStorage::new(&dir)).unwrap();
    let resumed = reloaded.start_session(game);
    assert!(resumed.was_resumed());
    assert_eq!(resumed.state(), session.state());
    assert_eq!(resumed.phase(), SessionPhase::Active(1));
    assert_eq!(resumed.mistakes_left(), 2);
    assert_eq!(resumed.current_category(), session.current_category());

    let tomorrow = reloaded.start_session(game.next());
    assert!(!tomorrow.was_resumed());
    assert_eq!(tomorrow.mistakes_left(), MAX_MISTAKES);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn snapshot_json_uses_local_storage_layout() {
    let engine = engine();
    let mut session = engine.start_session(GameNumber::FIRST);
    let miss = decoys(&session, 0)[0];
    session.submit_guess(0, miss);

    let raw = engine
        .cache()
        .storage()
        .get_item("excludle_game_1")
        .unwrap()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["mistakesLeft"], 2);
    assert_eq!(value["gameOver"], false);
    assert_eq!(value["finishedAllRows"], false);
    assert_eq!(value["rows"][0]["wrongIndices"], serde_json::json!([miss]));
    assert_eq!(value["rows"][0]["cards"][0]["text"], "Banana");
    assert_eq!(value["rows"][0]["cards"][0]["isImposter"], true);
    assert!(value.get("popupDetails").is_none());

    let snapshot: CachedSnapshot = serde_json::from_str(&raw).unwrap();
    assert_eq!(snapshot, session.snapshot());
}

#[test]
fn legacy_snapshot_without_optional_fields_resumes() {
    let engine = engine();
    let mut rows = engine.build_puzzle(GameNumber::new(3));
    let imposter = rows[0].imposter_index().unwrap();
    rows[0]
        .wrong_indices
        .extend((0..CARDS_PER_ROW).filter(|&i| i != imposter).take(2));
    let rows = serde_json::to_value(rows).unwrap();
    let legacy = serde_json::json!({
        "rows": rows,
        "mistakesLeft": 1,
        "gameOver": false,
        "finishedAllRows": false
    });
    engine
        .cache()
        .storage()
        .set_item("excludle_game_3", &legacy.to_string())
        .unwrap();
    let session = engine.start_session(GameNumber::new(3));
    assert!(session.was_resumed());
    assert_eq!(session.mistakes_left(), 1);
    assert_eq!(session.rows()[0].wrong_indices.len(), 2);
    assert!(session.current_category().is_none());
}

#[test]
fn corrupt_snapshot_falls_back_to_a_fresh_build() {
    let engine = engine();
    engine
        .cache()
        .storage()
        .set_item("excludle_game_4", "{\"rows\": 7}")
        .unwrap();
    let session = engine.start_session(GameNumber::new(4));
    assert!(!session.was_resumed());
    assert_eq!(session.rows(), engine.build_puzzle(GameNumber::new(4)));
}

#[test]
fn day_mapping_is_monotonic_and_anchored() {
    let resolver = DayResolver::default();
    let launch = NaiveDate::from_ymd_opt(2025, 12, 12).unwrap();
    assert_eq!(resolver.game_number_for_date(launch), GameNumber::FIRST);
    assert_eq!(
        resolver.game_number_for_date(launch - Duration::days(400)),
        GameNumber::FIRST
    );
    let mut previous = resolver.game_number_for_date(launch);
    for offset in 1..500 {
        let current = resolver.game_number_for_date(launch + Duration::days(offset));
        assert_eq!(current.get(), previous.get() + 1);
        previous = current;
    }

    // 04:59 UTC is still the previous evening in New York.
    let late_evening = Utc.with_ymd_and_hms(2025, 12, 13, 4, 59, 0).unwrap();
    let next_morning = Utc.with_ymd_and_hms(2025, 12, 13, 5, 0, 0).unwrap();
    assert_eq!(resolver.game_number_at(&late_evening), GameNumber::new(1));
    assert_eq!(resolver.game_number_at(&next_morning), GameNumber::new(2));
}
