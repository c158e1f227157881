//! Policy capability and the small built-in variants.
//!
//! A policy maps `(score, oppo_score)` (from the mover's perspective) to a roll count.
//! Implementations must be pure in those two arguments: the evaluator memoizes on score
//! pairs and would silently return wrong numbers for a stateful policy.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::dice::mix_seed;
use crate::rules::{free_bacon, GameRules};

pub trait Policy: Send + Sync {
    fn choose(&self, score: u32, oppo_score: u32) -> u32;
}

impl<P: Policy + ?Sized> Policy for &P {
    fn choose(&self, score: u32, oppo_score: u32) -> u32 {
        (**self).choose(score, oppo_score)
    }
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn choose(&self, score: u32, oppo_score: u32) -> u32 {
        (**self).choose(score, oppo_score)
    }
}

impl<P: Policy + ?Sized> Policy for Arc<P> {
    fn choose(&self, score: u32, oppo_score: u32) -> u32 {
        (**self).choose(score, oppo_score)
    }
}

/// Rolls the same number of dice every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantPolicy(pub u32);

impl Policy for ConstantPolicy {
    fn choose(&self, _score: u32, _oppo_score: u32) -> u32 {
        self.0
    }
}

/// Default opponent: always roll four.
pub fn default_policy() -> ConstantPolicy {
    ConstantPolicy(4)
}

/// Uniform roll count in `0..=max_rolls`, derived by hashing the seed and score pair.
#[derive(Debug, Clone, Copy)]
pub struct RandomPolicy {
    max_rolls: u32,
    seed: u64,
}

impl RandomPolicy {
    pub fn new(max_rolls: u32, seed: u64) -> Self {
        Self { max_rolls, seed }
    }
}

impl Policy for RandomPolicy {
    fn choose(&self, score: u32, oppo_score: u32) -> u32 {
        let h = mix_seed(self.seed, score as u64, oppo_score as u64);
        (h % (self.max_rolls as u64 + 1)) as u32
    }
}

/// Baseline heuristic: take Free Bacon when it triggers a swap that helps, or when it gains
/// at least `margin` points; otherwise roll `num_rolls`.
#[derive(Debug, Clone, Copy)]
pub struct SwapPolicy {
    rules: GameRules,
    margin: u32,
    num_rolls: u32,
}

impl SwapPolicy {
    /// `num_rolls` is capped at `rules.max_rolls`.
    pub fn new(rules: GameRules, margin: u32, num_rolls: u32) -> Self {
        Self {
            rules,
            margin,
            num_rolls: num_rolls.min(rules.max_rolls),
        }
    }

    pub fn with_defaults(rules: GameRules) -> Self {
        Self::new(rules, 8, 4)
    }
}

impl Policy for SwapPolicy {
    fn choose(&self, score: u32, oppo_score: u32) -> u32 {
        let bacon = free_bacon(oppo_score);
        if self.rules.is_swap(score + bacon, oppo_score) {
            if oppo_score > score {
                0
            } else {
                self.num_rolls
            }
        } else if bacon >= self.margin {
            0
        } else {
            self.num_rolls
        }
    }
}

/// Cycles through a fixed list of roll counts, ignoring the scores.
///
/// Not pure: only meant for driving `play` in tests, never the memoized evaluator.
#[derive(Debug)]
pub struct ScriptedPolicy {
    rolls: Vec<u32>,
    next: AtomicUsize,
}

impl ScriptedPolicy {
    pub fn new(rolls: impl Into<Vec<u32>>) -> Self {
        let rolls = rolls.into();
        assert!(!rolls.is_empty(), "scripted policy needs at least one roll");
        Self {
            rolls,
            next: AtomicUsize::new(0),
        }
    }

    /// Number of decisions made so far.
    pub fn calls(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }
}

impl Policy for ScriptedPolicy {
    fn choose(&self, _score: u32, _oppo_score: u32) -> u32 {
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        self.rolls[i % self.rolls.len()]
    }
}

/// Decorator that narrates every decision of `inner` to a writer.
///
/// Scores are printed in seat order (player 0 first) regardless of which seat moves.
pub struct Announced<P, W> {
    inner: P,
    player: u8,
    out: Mutex<W>,
}

impl<P: Policy, W: Write + Send> Announced<P, W> {
    pub fn new(inner: P, player: u8, out: W) -> Self {
        Self {
            inner,
            player: player.min(1),
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> (P, W) {
        let out = self.out.into_inner().unwrap_or_else(PoisonError::into_inner);
        (self.inner, out)
    }
}

impl<P: Policy, W: Write + Send> Policy for Announced<P, W> {
    fn choose(&self, score: u32, oppo_score: u32) -> u32 {
        let (s0, s1) = if self.player == 0 {
            (score, oppo_score)
        } else {
            (oppo_score, score)
        };
        let rolls = self.inner.choose(score, oppo_score);
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        // Write errors are ignored.
        let _ = writeln!(out, "Current score: {s0}-{s1}");
        let _ = writeln!(out, "Player {} rolled: {rolls}", self.player);
        rolls
    }
}
