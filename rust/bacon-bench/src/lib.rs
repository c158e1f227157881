//! Shared fixtures for the criterion benches.

use bacon_core::GameRules;
use bacon_oracle::Precomputed;

/// Full-size ruleset: goal 100, ten six-sided dice, both special rules.
pub fn full_rules() -> GameRules {
    GameRules::default()
}

/// Smaller board for benches that run many evaluations per iteration.
pub fn small_rules() -> GameRules {
    GameRules {
        goal: 40,
        max_rolls: 6,
        ..GameRules::default()
    }
}

pub fn precomputed(rules: GameRules) -> Precomputed {
    match Precomputed::new(rules) {
        Ok(pre) => pre,
        Err(e) => panic!("bench rules are invalid: {e}"),
    }
}
