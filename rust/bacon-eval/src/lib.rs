//! bacon-eval: exact and sampled win rates, round-robin tournaments, and policy improvement.

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use thiserror::Error;

pub mod evaluator;
pub mod learn;
pub mod roster;
pub mod sampling;
pub mod tournament;

pub use evaluator::{Evaluator, PlaysAs, WinRateMemo};
pub use learn::{
    next_focus, Improver, LearnOptions, LearnProgress, LearnReport, LearnRound,
};
pub use roster::{builtin_names, builtin_policy, Roster};
pub use sampling::sampled_win_rate;
pub use tournament::{
    rank, round_robin, Standing, TournamentOptions, TournamentProgress, TournamentReport,
};

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("sample count must be positive")]
    NoSamples,
    #[error("duplicate policy name: {0}")]
    DuplicateName(String),
    #[error("unknown policy: {0}")]
    UnknownPolicy(String),
    #[error("focus ({0}, {1}) is outside the board")]
    BadFocus(u32, u32),
    #[error(transparent)]
    Table(#[from] bacon_core::TableError),
    #[error(transparent)]
    Oracle(#[from] bacon_oracle::OracleError),
}

#[cfg(test)]
mod learn_tests;
#[cfg(test)]
mod roster_tests;
#[cfg(test)]
mod sampling_tests;
#[cfg(test)]
mod tournament_tests;
