//! bacon-core: Hog rules, dice, game simulation, policies, policy tables, and configuration.

pub mod config;
pub mod dice;
pub mod game;
pub mod policy;
pub mod rules;
pub mod table;

pub use config::{Config, ConfigError, LearnConfig, SamplingConfig, TournamentConfig};
pub use dice::{roll_dice, take_turn, Dice, FairDice, ScriptedDice};
pub use game::{play, FinalScores, Start};
pub use policy::{
    default_policy, Announced, ConstantPolicy, Policy, RandomPolicy, ScriptedPolicy, SwapPolicy,
};
pub use rules::{free_bacon, GameRules, RulesError, MAX_TABLE_ROLLS};
pub use table::{CellDiff, PolicyTable, TableError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod rules_tests;
