pub mod games;
pub mod policy;
pub mod reports;
pub mod scenarios;
pub mod tester;

pub use games::resolve_game_inputs;
pub use scenarios::{get_scenario, list_scenarios};
pub use tester::*;
