use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use excludle_game::{DayResolver, GameNumber};
use std::collections::HashSet;

/// Largest range a single `a..b` token may expand to.
const MAX_RANGE_LEN: u32 = 10_000;

/// Resolve CLI game tokens into game numbers.
///
/// Accepts literal game numbers, ranges (`3..7` is exclusive, `3..=7` inclusive),
/// ISO dates (`2026-01-12`), and the keyword `today`. Duplicates are dropped
/// keeping first occurrence; an empty list resolves to game #1.
pub fn resolve_game_inputs(tokens: &[String], resolver: &DayResolver) -> Result<Vec<GameNumber>> {
    let mut pending: Vec<GameNumber> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("today") {
            pending.push(resolver.today());
            continue;
        }

        if let Some((start, end)) = parse_range(token)? {
            pending.extend((start..=end).map(GameNumber::new));
            continue;
        }

        if let Ok(value) = token.parse::<u32>() {
            if value == 0 {
                bail!("Game numbers start at 1: {token}");
            }
            pending.push(GameNumber::new(value));
            continue;
        }

        if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
            pending.push(resolver.game_number_for_date(date));
            continue;
        }

        bail!("Unrecognized game token: {token}");
    }

    let mut seen = HashSet::new();
    pending.retain(|game| seen.insert(*game));

    if pending.is_empty() {
        pending.push(GameNumber::FIRST);
    }

    Ok(pending)
}

/// Inclusive bounds of a range token, `None` if the token is not a range.
fn parse_range(token: &str) -> Result<Option<(u32, u32)>> {
    let Some((start, rest)) = token.split_once("..") else {
        return Ok(None);
    };
    let (end, inclusive) = rest
        .strip_prefix('=')
        .map_or((rest, false), |end| (end, true));
    let start: u32 = start
        .trim()
        .parse()
        .with_context(|| format!("invalid range start in {token}"))?;
    let end: u32 = end
        .trim()
        .parse()
        .with_context(|| format!("invalid range end in {token}"))?;
    let end = if inclusive { end } else { end.saturating_sub(1) };
    if start == 0 || end < start {
        bail!("Empty or zero-based game range: {token}");
    }
    if end - start >= MAX_RANGE_LEN {
        bail!("Game range too large: {token}");
    }
    Ok(Some((start, end)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    fn numbers(games: &[GameNumber]) -> Vec<u32> {
        games.iter().map(|game| game.get()).collect()
    }

    #[test]
    fn resolves_numbers_ranges_and_dates() {
        let resolver = DayResolver::default();
        let games =
            resolve_game_inputs(&tokens(&["4", "1..3", "2026-01-12", "5..=6"]), &resolver)
                .unwrap();
        assert_eq!(numbers(&games), vec![4, 1, 2, 32, 5, 6]);
    }

    #[test]
    fn dedupes_and_defaults() {
        let resolver = DayResolver::default();
        let games = resolve_game_inputs(&tokens(&["2", "2", "1..=2"]), &resolver).unwrap();
        assert_eq!(numbers(&games), vec![2, 1]);
        let games = resolve_game_inputs(&[], &resolver).unwrap();
        assert_eq!(numbers(&games), vec![1]);
    }

    #[test]
    fn today_resolves_through_the_calendar() {
        let resolver = DayResolver::default();
        let games = resolve_game_inputs(&tokens(&["today"]), &resolver).unwrap();
        assert_eq!(games.len(), 1);
        assert!(games[0] >= GameNumber::FIRST);
    }

    #[test]
    fn rejects_garbage() {
        let resolver = DayResolver::default();
        assert!(resolve_game_inputs(&tokens(&["0"]), &resolver).is_err());
        assert!(resolve_game_inputs(&tokens(&["5..5"]), &resolver).is_err());
        assert!(resolve_game_inputs(&tokens(&["banana"]), &resolver).is_err());
        assert!(resolve_game_inputs(&tokens(&["1..=999999"]), &resolver).is_err());
    }
}
