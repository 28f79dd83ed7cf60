use colored::Colorize;
use excludle_game::{GameNumber, SelectionMode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::scenarios::{Scenario, ScenarioCtx};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub game: u32,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

pub struct LogicTester {
    verbose: bool,
    selection: SelectionMode,
}

impl LogicTester {
    pub const fn new(verbose: bool, selection: SelectionMode) -> Self {
        Self { verbose, selection }
    }

    pub fn run_scenario(
        &self,
        scenario: &Scenario,
        games: &[GameNumber],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &game in games {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (game #{game}, selection {})",
                    scenario.name.bright_white(),
                    self.selection.as_str()
                );
            }
            results.push(self.run_single_scenario(scenario, game, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &Scenario,
        game: GameNumber,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut durations = Vec::new();

        for iteration in 0..iterations {
            let ctx = ScenarioCtx {
                game,
                iteration,
                selection: self.selection,
            };
            let start_time = Instant::now();
            match (scenario.run)(&ctx) {
                Ok(()) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    durations.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{iterations} passed ({duration:?})",
                            iteration + 1
                        );
                    }
                }
                Err(err) => {
                    let message = format!(
                        "Iteration {} (game #{game}, seed {}): {err:#}",
                        iteration + 1,
                        ctx.seed()
                    );
                    if self.verbose {
                        println!("  ❌ {}", message.red());
                    }
                    log::debug!("{} failed: {message}", scenario.key);
                    failures.push(message);
                }
            }
        }

        let average_duration = if durations.is_empty() {
            Duration::ZERO
        } else {
            durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.to_string(),
            game: game.get(),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        u64::try_from(duration.as_micros())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_micros(u64::deserialize(deserializer)?))
    }
}
