//! Hog rule constants and the deterministic scoring rules.
//!
//! A [`GameRules`] value is immutable once a computation starts. Every table built from it
//! (outcome counts, phase probabilities, value tables, evaluation memos) embeds the toggles,
//! so switching a rule means building those tables again from a new `GameRules`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest roll count a dense policy table can store (`u8` cells).
pub const MAX_TABLE_ROLLS: u32 = u8::MAX as u32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("dice_sides must be >= 2 (got {0})")]
    TooFewSides(u32),
    #[error("max_rolls must be in 1..=255 (got {got})")]
    BadMaxRolls { got: u32 },
    #[error("goal must be >= 2 (got {0})")]
    GoalTooSmall(u32),
    #[error("trot_modulus must be >= 1")]
    ZeroTrotModulus,
    #[error("{sides}^{rolls} outcome permutations do not fit in 64 bits")]
    OutcomeOverflow { sides: u32, rolls: u32 },
}

/// Rule set for one game of Hog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameRules {
    /// Faces per die.
    #[serde(default = "default_dice_sides")]
    pub dice_sides: u32,
    /// Most dice a player may roll in one turn.
    #[serde(default = "default_max_rolls")]
    pub max_rolls: u32,
    /// First score to reach this wins.
    #[serde(default = "default_goal")]
    pub goal: u32,
    /// Period of the Time Trot cycle.
    #[serde(default = "default_trot_modulus")]
    pub trot_modulus: u32,
    /// Swine Swap: exchange scores when one is a multiple of the other.
    #[serde(default = "default_enabled")]
    pub swine_swap: bool,
    /// Time Trot: extra turn when `turn % trot_modulus == rolls`.
    #[serde(default = "default_enabled")]
    pub time_trot: bool,
}

fn default_dice_sides() -> u32 {
    6
}

fn default_max_rolls() -> u32 {
    10
}

fn default_goal() -> u32 {
    100
}

fn default_trot_modulus() -> u32 {
    5
}

fn default_enabled() -> bool {
    true
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            dice_sides: default_dice_sides(),
            max_rolls: default_max_rolls(),
            goal: default_goal(),
            trot_modulus: default_trot_modulus(),
            swine_swap: true,
            time_trot: true,
        }
    }
}

impl GameRules {
    /// Default dice with a custom goal and roll cap; both toggles off.
    pub fn plain(goal: u32, dice_sides: u32, max_rolls: u32) -> Self {
        Self {
            dice_sides,
            max_rolls,
            goal,
            swine_swap: false,
            time_trot: false,
            ..Self::default()
        }
    }

    pub fn with_toggles(mut self, swine_swap: bool, time_trot: bool) -> Self {
        self.swine_swap = swine_swap;
        self.time_trot = time_trot;
        self
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if self.dice_sides < 2 {
            return Err(RulesError::TooFewSides(self.dice_sides));
        }
        if self.max_rolls == 0 || self.max_rolls > MAX_TABLE_ROLLS {
            return Err(RulesError::BadMaxRolls {
                got: self.max_rolls,
            });
        }
        if self.goal < 2 {
            return Err(RulesError::GoalTooSmall(self.goal));
        }
        if self.trot_modulus == 0 {
            return Err(RulesError::ZeroTrotModulus);
        }
        if (self.dice_sides as u64).checked_pow(self.max_rolls).is_none() {
            return Err(RulesError::OutcomeOverflow {
                sides: self.dice_sides,
                rolls: self.max_rolls,
            });
        }
        Ok(())
    }

    /// Largest sum reachable in one turn.
    pub fn max_turn_sum(&self) -> u32 {
        self.dice_sides * self.max_rolls
    }

    /// Number of cells in a dense `goal x goal` table.
    pub fn cells(&self) -> usize {
        (self.goal as usize) * (self.goal as usize)
    }

    /// Swine Swap predicate for the pair of scores after a turn.
    pub fn is_swap(&self, score: u32, oppo_score: u32) -> bool {
        if !self.swine_swap || score <= 1 || oppo_score <= 1 {
            return false;
        }
        score % oppo_score == 0 || oppo_score % score == 0
    }

    /// Returns the (mover, opponent) pair after Swine Swap has been applied.
    #[inline]
    pub fn apply_swap(&self, score: u32, oppo_score: u32) -> (u32, u32) {
        if self.is_swap(score, oppo_score) {
            (oppo_score, score)
        } else {
            (score, oppo_score)
        }
    }

    /// Time Trot predicate: rolling `rolls` dice on turn `turn` grants another turn.
    pub fn is_time_trot(&self, turn: u32, rolls: u32) -> bool {
        self.time_trot && turn % self.trot_modulus == rolls
    }

    /// Stable identifier for logs and manifests.
    pub fn ruleset_id(&self) -> String {
        format!(
            "hog_g{}_d{}x{}_t{}_swap{}_trot{}",
            self.goal,
            self.max_rolls,
            self.dice_sides,
            self.trot_modulus,
            self.swine_swap as u8,
            self.time_trot as u8
        )
    }
}

/// Free Bacon: one more than the largest decimal digit of the opponent's score.
pub fn free_bacon(oppo_score: u32) -> u32 {
    let mut max_digit = 0;
    let mut s = oppo_score;
    while s > 0 {
        max_digit = max_digit.max(s % 10);
        s /= 10;
    }
    max_digit + 1
}
