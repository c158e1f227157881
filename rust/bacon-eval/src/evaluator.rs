//! Exact win probability of one concrete policy against another.
//!
//! Unlike the solver, the state carries whose policy is moving, the Time Trot phase and
//! whether Time Trot is armed, because the roll count comes from the mover's policy rather
//! than a search. Values are memoized per evaluator; the memo is cleared before every
//! top-level call and never shared between threads.

use bacon_core::{free_bacon, GameRules, Policy, Start};
use bacon_oracle::Precomputed;

const UNSET: f64 = -1.0;

/// Which seat the evaluated policy takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaysAs {
    /// Mean of moving first and moving second.
    #[default]
    Averaged,
    First,
    Second,
}

/// Dense memo over `(score, oppo_score, who, turn, armed)`.
pub struct WinRateMemo {
    goal: usize,
    modulus: usize,
    values: Vec<f64>,
}

impl WinRateMemo {
    pub fn new(rules: &GameRules) -> Self {
        let goal = rules.goal as usize;
        let modulus = rules.trot_modulus as usize;
        Self {
            goal,
            modulus,
            values: vec![UNSET; goal * goal * 2 * modulus * 2],
        }
    }

    pub fn clear(&mut self) {
        self.values.fill(UNSET);
    }

    #[inline]
    fn index(&self, st: &State) -> usize {
        debug_assert!((st.score as usize) < self.goal && (st.oppo as usize) < self.goal);
        ((((st.score as usize) * self.goal + st.oppo as usize) * 2 + st.who) * self.modulus
            + st.turn as usize)
            * 2
            + st.armed as usize
    }
}

#[derive(Debug, Clone, Copy)]
struct State {
    score: u32,
    oppo: u32,
    who: usize,
    turn: u32,
    armed: bool,
}

/// One evaluation context: borrowed precomputed tables plus an owned memo.
pub struct Evaluator<'a> {
    pre: &'a Precomputed,
    memo: WinRateMemo,
}

impl<'a> Evaluator<'a> {
    pub fn new(pre: &'a Precomputed) -> Self {
        Self {
            pre,
            memo: WinRateMemo::new(pre.rules()),
        }
    }

    pub fn rules(&self) -> &GameRules {
        self.pre.rules()
    }

    /// Probability that `policy` beats `oppo` from `start` (given from `policy`'s side).
    pub fn win_rate(
        &mut self,
        policy: &dyn Policy,
        oppo: &dyn Policy,
        plays_as: PlaysAs,
        start: Start,
    ) -> f64 {
        let mut total = 0.0;
        let mut sides = 0.0;

        if plays_as != PlaysAs::Second {
            self.memo.clear();
            total += self.top_level([policy, oppo], start.score, start.oppo_score, start.turn);
            sides += 1.0;
        }
        if plays_as != PlaysAs::First {
            self.memo.clear();
            total += 1.0 - self.top_level([oppo, policy], start.oppo_score, start.score, start.turn);
            sides += 1.0;
        }
        total / sides
    }

    /// Averaged win rate from the opening position.
    pub fn averaged(&mut self, policy: &dyn Policy, oppo: &dyn Policy) -> f64 {
        self.win_rate(policy, oppo, PlaysAs::Averaged, Start::default())
    }

    fn top_level(&mut self, movers: [&dyn Policy; 2], score: u32, oppo: u32, turn: u32) -> f64 {
        let rules = *self.pre.rules();
        let turn = if rules.time_trot {
            turn % rules.trot_modulus
        } else {
            0
        };
        self.step(
            movers,
            State {
                score,
                oppo,
                who: 0,
                turn,
                armed: rules.time_trot,
            },
        )
    }

    /// Win probability of `movers[st.who]`, who is about to move.
    fn step(&mut self, movers: [&dyn Policy; 2], st: State) -> f64 {
        let idx = self.memo.index(&st);
        let cached = self.memo.values[idx];
        if cached != UNSET {
            return cached;
        }

        let pre = self.pre;
        let rules = *pre.rules();
        let rolls = movers[st.who].choose(st.score, st.oppo);
        debug_assert!(rolls <= rules.max_rolls, "policy chose {rolls} dice");
        let rolls = rolls.min(rules.max_rolls);

        let win = if rolls == 0 {
            self.after_turn(movers, st, free_bacon(st.oppo), 0)
        } else {
            let mut acc = 0.0f64;
            let mut counted = 0u64;
            for (gain, count) in pre.outcomes().outcomes(rolls) {
                acc += self.after_turn(movers, st, gain, rolls) * count as f64;
                counted += count;
            }
            acc / counted as f64
        };

        self.memo.values[idx] = win;
        win
    }

    fn after_turn(&mut self, movers: [&dyn Policy; 2], st: State, gain: u32, rolls: u32) -> f64 {
        let rules = *self.pre.rules();
        let (ns, no) = rules.apply_swap(st.score + gain, st.oppo);
        if ns >= rules.goal {
            return 1.0;
        }
        if no >= rules.goal {
            return 0.0;
        }

        if rules.time_trot && st.armed && st.turn == rolls {
            // extra turn, and Time Trot cannot fire again right away
            return self.step(
                movers,
                State {
                    score: ns,
                    oppo: no,
                    who: st.who,
                    turn: (st.turn + 1) % rules.trot_modulus,
                    armed: false,
                },
            );
        }

        let turn = if rules.time_trot {
            (st.turn + 1) % rules.trot_modulus
        } else {
            0
        };
        1.0 - self.step(
            movers,
            State {
                score: no,
                oppo: ns,
                who: 1 - st.who,
                turn,
                armed: rules.time_trot,
            },
        )
    }
}
