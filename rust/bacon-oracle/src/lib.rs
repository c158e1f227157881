//! bacon-oracle: precomputed outcome/phase tables and the optimal-policy solver for Hog.
//!
//! Build a [`Precomputed`] once per rule set, then hand it by reference to the [`Solver`]
//! and to the evaluators in `bacon-eval`.

use thiserror::Error;

use bacon_core::{RulesError, TableError};

pub mod context;
pub mod outcomes;
pub mod phase;
pub mod solver;

pub use context::Precomputed;
pub use outcomes::OutcomeTable;
pub use phase::PhaseTable;
pub use solver::{OptimalPolicy, Solver};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum OracleError {
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error("outcome counts for {rolls} dice sum to {counted}, expected {expected}")]
    InconsistentOutcomes {
        rolls: u32,
        counted: u64,
        expected: u64,
    },
    #[error("solver revisited ({score}, {oppo_score}, armed={bonus_armed}) while solving it")]
    CycleDetected {
        score: u32,
        oppo_score: u32,
        bonus_armed: bool,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Solve the optimal policy for `rules` from scratch.
pub fn solve(rules: bacon_core::GameRules) -> Result<OptimalPolicy, OracleError> {
    let pre = Precomputed::new(rules)?;
    Solver::new(&pre).solve()
}
