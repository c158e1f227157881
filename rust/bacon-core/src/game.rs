//! Full-game simulation: the single place that advances scores by the rules.

use crate::dice::{take_turn, Dice};
use crate::policy::Policy;
use crate::rules::GameRules;

/// Starting position, seen from player 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Start {
    pub score: u32,
    pub oppo_score: u32,
    /// Turn counter used by Time Trot.
    pub turn: u32,
}

impl Start {
    pub fn new(score: u32, oppo_score: u32, turn: u32) -> Self {
        Self {
            score,
            oppo_score,
            turn,
        }
    }

    /// Same position seen from the other seat.
    pub fn mirrored(self) -> Self {
        Self {
            score: self.oppo_score,
            oppo_score: self.score,
            turn: self.turn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalScores {
    pub score0: u32,
    pub score1: u32,
}

impl FinalScores {
    /// Seat of the winner (0 or 1).
    pub fn winner(&self) -> u8 {
        if self.score0 > self.score1 {
            0
        } else {
            1
        }
    }
}

/// Play one game to completion. Player 0 moves first.
///
/// After every turn Swine Swap is applied to the pair of scores; a Time Trot turn keeps the
/// mover on roll unless the previous turn was itself a Time Trot turn.
pub fn play(
    p0: &dyn Policy,
    p1: &dyn Policy,
    start: Start,
    rules: &GameRules,
    dice: &mut dyn Dice,
) -> FinalScores {
    let mut scores = [start.score, start.oppo_score];
    let mut player = 0usize;
    let mut turn = start.turn;
    let mut last_trot = false;

    while scores[0] < rules.goal && scores[1] < rules.goal {
        let other = 1 - player;
        let policy = if player == 0 { p0 } else { p1 };
        let rolls = policy.choose(scores[player], scores[other]);
        debug_assert!(rolls <= rules.max_rolls, "policy chose {rolls} dice");
        scores[player] += take_turn(rolls, scores[other], dice);

        let (a, b) = rules.apply_swap(scores[0], scores[1]);
        scores = [a, b];

        if rules.is_time_trot(turn, rolls) && !last_trot {
            last_trot = true;
        } else {
            player = other;
            last_trot = false;
        }
        turn += 1;
    }

    FinalScores {
        score0: scores[0],
        score1: scores[1],
    }
}
