//! Backward-induction solver for the optimal roll count at every score pair.
//!
//! State: `(score, oppo_score, armed)` where `armed` means Time Trot may still fire on the
//! mover's next turn. The value of rolling `r` dice is the outcome-weighted average of:
//! - 1.0 if the mover reaches the goal,
//! - 0.0 if a swap pushes the opponent to the goal,
//! - otherwise `1 - W(opponent)`, blended when armed with `W(mover, disarmed)` by the phase
//!   probability that this turn triggers Time Trot.

use bacon_core::{free_bacon, Policy, PolicyTable};

use crate::context::Precomputed;
use crate::OracleError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Unsolved,
    Solving,
    Solved { win: f64, rolls: u32 },
}

/// Memoized solver. Owns its value table; borrows the shared precomputed context.
pub struct Solver<'a> {
    pre: &'a Precomputed,
    cells: Vec<Cell>,
}

impl<'a> Solver<'a> {
    pub fn new(pre: &'a Precomputed) -> Self {
        Self {
            pre,
            cells: vec![Cell::Unsolved; pre.rules().cells() * 2],
        }
    }

    #[inline]
    fn index(&self, score: u32, oppo_score: u32, armed: bool) -> usize {
        let g = self.pre.rules().goal as usize;
        ((score as usize) * g + oppo_score as usize) * 2 + armed as usize
    }

    /// Best `(win probability, roll count)` for the mover. Ties go to the fewest dice.
    pub fn best_move(
        &mut self,
        score: u32,
        oppo_score: u32,
        armed: bool,
    ) -> Result<(f64, u32), OracleError> {
        let rules = *self.pre.rules();
        debug_assert!(score < rules.goal && oppo_score < rules.goal);

        let idx = self.index(score, oppo_score, armed);
        match self.cells[idx] {
            Cell::Solved { win, rolls } => return Ok((win, rolls)),
            Cell::Solving => {
                return Err(OracleError::CycleDetected {
                    score,
                    oppo_score,
                    bonus_armed: armed,
                })
            }
            Cell::Unsolved => {}
        }
        self.cells[idx] = Cell::Solving;

        let pre = self.pre;
        let mut best = (0.0f64, 0u32);
        for r in 0..=rules.max_rolls {
            let win = if r == 0 {
                self.after_turn(score, oppo_score, free_bacon(oppo_score), 0, armed)?
            } else {
                let mut acc = 0.0f64;
                let mut counted = 0u64;
                for (gain, count) in pre.outcomes().outcomes(r) {
                    acc += self.after_turn(score, oppo_score, gain, r, armed)? * count as f64;
                    counted += count;
                }
                acc / counted as f64
            };
            if win > best.0 {
                best = (win, r);
            }
        }

        self.cells[idx] = Cell::Solved {
            win: best.0,
            rolls: best.1,
        };
        Ok(best)
    }

    /// Mover's win probability once `gain` points from `rolls` dice have been scored.
    fn after_turn(
        &mut self,
        score: u32,
        oppo_score: u32,
        gain: u32,
        rolls: u32,
        armed: bool,
    ) -> Result<f64, OracleError> {
        let rules = *self.pre.rules();
        let (ns, no) = rules.apply_swap(score + gain, oppo_score);
        if ns >= rules.goal {
            return Ok(1.0);
        }
        if no >= rules.goal {
            return Ok(0.0);
        }

        let pass = 1.0 - self.best_move(no, ns, rules.time_trot)?.0;
        if !armed {
            return Ok(pass);
        }
        let p = if rolls < rules.trot_modulus {
            self.pre.phases().prob(rolls, score, oppo_score)
        } else {
            0.0
        };
        let again = self.best_move(ns, no, false)?.0;
        Ok(pass * (1.0 - p) + again * p)
    }

    /// Solve every score pair with Time Trot armed (when enabled).
    pub fn solve(mut self) -> Result<OptimalPolicy, OracleError> {
        let rules = *self.pre.rules();
        let mut table = PolicyTable::new(&rules);
        let mut win_rates = Vec::with_capacity(rules.cells());
        for score in 0..rules.goal {
            for oppo_score in 0..rules.goal {
                let (win, rolls) = self.best_move(score, oppo_score, rules.time_trot)?;
                table.set(score, oppo_score, rolls)?;
                win_rates.push(win);
            }
        }
        Ok(OptimalPolicy { table, win_rates })
    }
}

/// Solver output: the roll table and the solver's own win estimate at each cell.
#[derive(Debug, Clone)]
pub struct OptimalPolicy {
    table: PolicyTable,
    win_rates: Vec<f64>,
}

impl OptimalPolicy {
    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    pub fn into_table(self) -> PolicyTable {
        self.table
    }

    pub fn win_rate(&self, score: u32, oppo_score: u32) -> f64 {
        let g = self.table.goal() as usize;
        self.win_rates[score as usize * g + oppo_score as usize]
    }
}

impl Policy for OptimalPolicy {
    #[inline]
    fn choose(&self, score: u32, oppo_score: u32) -> u32 {
        self.table.get(score, oppo_score)
    }
}
