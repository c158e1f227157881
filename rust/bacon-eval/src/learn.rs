//! Coordinate-ascent improvement of a policy table against a fixed opponent.
//!
//! Each round tries every roll count at the focus cell, keeps the one with the best averaged
//! win rate (ties keep the current value), then moves the focus along a fixed traversal that
//! covers every score pair.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use bacon_core::{Policy, PolicyTable};
use bacon_oracle::Precomputed;

use crate::evaluator::Evaluator;
use crate::EvalError;

/// Next focus cell. Mirrored pairs are visited back to back; otherwise the cursor walks down
/// its diagonal and wraps to the top of the next diagonal, ending at `(goal-1, goal-1)`.
pub fn next_focus(focus: (u32, u32), goal: u32) -> (u32, u32) {
    let (a, b) = focus;
    if a < b {
        return (b, a);
    }
    let (lo, hi) = (b, a);
    if lo > 0 {
        return (lo - 1, hi - 1);
    }
    // walked off the diagonal: its difference is `hi`
    let diff = hi;
    if diff + 2 > goal {
        (goal - 1, goal - 1)
    } else {
        (goal - diff - 2, goal - 1)
    }
}

/// Snapshot passed to [`LearnProgress`] after every round.
#[derive(Debug, Clone, Copy)]
pub struct LearnRound {
    /// 1-based.
    pub round: u64,
    pub rounds: u64,
    pub focus: (u32, u32),
    pub rolls: u32,
    /// Averaged win rate of the table after this round.
    pub win_rate: f64,
}

pub trait LearnProgress {
    fn on_round(&mut self, round: &LearnRound);
    fn on_checkpoint(&mut self, _round: u64) {
        // Optional; default is no-op.
    }
}

#[derive(Debug, Clone)]
pub struct LearnOptions {
    pub rounds: u64,
    /// Defaults to `(goal-1, goal-1)`.
    pub focus: Option<(u32, u32)>,
    /// Save the table every N rounds and at the end, when a path is set.
    pub checkpoint_interval: u64,
    pub checkpoint: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearnReport {
    pub rounds_completed: u64,
    pub initial_win_rate: f64,
    pub final_win_rate: f64,
    pub next_focus: (u32, u32),
    pub interrupted: bool,
}

pub struct Improver<'a> {
    eval: Evaluator<'a>,
}

impl<'a> Improver<'a> {
    pub fn new(pre: &'a Precomputed) -> Self {
        Self {
            eval: Evaluator::new(pre),
        }
    }

    pub fn learn(
        &mut self,
        table: &mut PolicyTable,
        opponent: &dyn Policy,
        opts: &LearnOptions,
        interrupt: &AtomicBool,
        mut progress: Option<&mut dyn LearnProgress>,
    ) -> Result<LearnReport, EvalError> {
        let rules = *self.eval.rules();
        let goal = rules.goal;
        if table.goal() != goal {
            return Err(EvalError::Table(bacon_core::TableError::GoalMismatch {
                left: table.goal(),
                right: goal,
            }));
        }
        let mut focus = opts.focus.unwrap_or((goal - 1, goal - 1));
        if focus.0 >= goal || focus.1 >= goal {
            return Err(EvalError::BadFocus(focus.0, focus.1));
        }
        let interval = opts.checkpoint_interval.max(1);

        let initial = self.eval.averaged(&*table, opponent);
        let mut current = initial;
        let mut done = 0u64;

        while done < opts.rounds {
            if interrupt.load(Ordering::SeqCst) {
                break;
            }

            let (s, o) = focus;
            let rn = table.get(s, o);
            let mut best = self.eval.averaged(&*table, opponent);
            let mut best_rolls = rn;
            for r in 0..=rules.max_rolls.min(table.max_rolls()) {
                if r == rn {
                    continue;
                }
                table.set(s, o, r)?;
                let wr = self.eval.averaged(&*table, opponent);
                if wr > best {
                    best = wr;
                    best_rolls = r;
                }
            }
            table.set(s, o, best_rolls)?;
            current = best;
            done += 1;

            if let Some(p) = progress.as_deref_mut() {
                p.on_round(&LearnRound {
                    round: done,
                    rounds: opts.rounds,
                    focus,
                    rolls: best_rolls,
                    win_rate: best,
                });
            }
            focus = next_focus(focus, goal);

            if done % interval == 0 {
                if let Some(path) = &opts.checkpoint {
                    table.save(path)?;
                    if let Some(p) = progress.as_deref_mut() {
                        p.on_checkpoint(done);
                    }
                }
            }
        }

        if let Some(path) = &opts.checkpoint {
            table.save(path)?;
        }

        Ok(LearnReport {
            rounds_completed: done,
            initial_win_rate: initial,
            final_win_rate: current,
            next_focus: focus,
            interrupted: done < opts.rounds,
        })
    }
}
