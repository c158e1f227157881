//! Time Trot phase estimate: for each score pair, how likely the mover is on each
//! `turn % trot_modulus` value.
//!
//! Forward DP over `2 * goal` turns starting from `(0, 0)` on turn 0. Each live state spreads
//! its mass over Free Bacon (weight 0.1) and every dice sum (weight `avg_prob(s)`); states where
//! either score reaches the goal are absorbed. This is only a heuristic input to the solver.

use bacon_core::{free_bacon, GameRules};

use crate::outcomes::OutcomeTable;

/// Weight of the Free Bacon transition.
pub const FREE_BACON_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct PhaseTable {
    goal: u32,
    modulus: u32,
    /// `[phase][score][oppo_score]`
    probs: Vec<f64>,
}

impl PhaseTable {
    pub fn new(rules: &GameRules, outcomes: &OutcomeTable) -> Self {
        let g = rules.goal as usize;
        let m = rules.trot_modulus as usize;
        let horizon = 2 * rules.goal;
        let max_sum = outcomes.max_sum();

        let mut cur = vec![0.0f64; g * g];
        cur[0] = 1.0;
        let mut accum = vec![0.0f64; m * g * g];

        for turn in 0..=horizon {
            let phase = (turn % rules.trot_modulus) as usize;
            let slab = &mut accum[phase * g * g..(phase + 1) * g * g];
            for (a, &c) in slab.iter_mut().zip(&cur) {
                *a += c;
            }
            if turn == horizon {
                break;
            }

            let mut next = vec![0.0f64; g * g];
            for score in 0..rules.goal {
                for oppo in 0..rules.goal {
                    let mass = cur[score as usize * g + oppo as usize];
                    if mass == 0.0 {
                        continue;
                    }

                    let bacon = free_bacon(oppo);
                    spread(rules, &mut next, score + bacon, oppo, FREE_BACON_WEIGHT * mass);

                    for s in 1..=max_sum {
                        if score + s >= rules.goal {
                            break;
                        }
                        spread(rules, &mut next, score + s, oppo, outcomes.avg_prob(s) * mass);
                    }
                }
            }
            cur = next;
        }

        // normalize per score pair; unreachable pairs get a uniform distribution
        for cell in 0..g * g {
            let sum: f64 = (0..m).map(|p| accum[p * g * g + cell]).sum();
            for p in 0..m {
                let v = &mut accum[p * g * g + cell];
                *v = if sum == 0.0 { 1.0 / m as f64 } else { *v / sum };
            }
        }

        Self {
            goal: rules.goal,
            modulus: rules.trot_modulus,
            probs: accum,
        }
    }

    pub fn modulus(&self) -> u32 {
        self.modulus
    }

    /// Probability that the mover at `(score, oppo_score)` is on `phase`.
    #[inline]
    pub fn prob(&self, phase: u32, score: u32, oppo_score: u32) -> f64 {
        debug_assert!(phase < self.modulus);
        let g = self.goal as usize;
        self.probs[(phase as usize * g + score as usize) * g + oppo_score as usize]
    }
}

/// Add `mass` to the state reached after the mover lands on `score`: swap if due, drop if
/// terminal, and store from the next mover's perspective.
#[inline]
fn spread(rules: &GameRules, next: &mut [f64], score: u32, oppo: u32, mass: f64) {
    let (score, oppo) = rules.apply_swap(score, oppo);
    if score >= rules.goal || oppo >= rules.goal {
        return;
    }
    let g = rules.goal as usize;
    next[oppo as usize * g + score as usize] += mass;
}
