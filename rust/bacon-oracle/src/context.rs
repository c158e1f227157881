//! Immutable precomputed context shared by the solver and the evaluators.

use bacon_core::GameRules;

use crate::outcomes::OutcomeTable;
use crate::phase::PhaseTable;
use crate::OracleError;

/// Rules plus every table derived from them. Build once, then share by reference (it is
/// `Sync`). A different rule set, including a flipped toggle, needs a new context.
#[derive(Debug, Clone)]
pub struct Precomputed {
    rules: GameRules,
    outcomes: OutcomeTable,
    phases: PhaseTable,
}

impl Precomputed {
    pub fn new(rules: GameRules) -> Result<Self, OracleError> {
        let outcomes = OutcomeTable::new(&rules)?;
        let phases = PhaseTable::new(&rules, &outcomes);
        Ok(Self {
            rules,
            outcomes,
            phases,
        })
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn outcomes(&self) -> &OutcomeTable {
        &self.outcomes
    }

    pub fn phases(&self) -> &PhaseTable {
        &self.phases
    }
}
