//! Dice streams used by game simulation.
//!
//! `FairDice` is the production stream (seeded ChaCha8, reproducible per seed).
//! `ScriptedDice` cycles through a fixed list of faces and exists so tests can pin
//! every roll of a game.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

/// SplitMix64 step (fast, deterministic).
pub fn splitmix64_next(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Stable mix of a seed with two small keys. Avoids std Hash/RandomState.
pub fn mix_seed(seed: u64, a: u64, b: u64) -> u64 {
    let mut x = seed;
    x ^= a.wrapping_mul(0xD6E8FEB86659FD93);
    x ^= b.wrapping_mul(0xA5A35625E4F7C1AD);
    let mut s = x;
    splitmix64_next(&mut s)
}

/// A source of die faces in `1..=sides`.
pub trait Dice {
    fn roll(&mut self) -> u32;
}

/// Fair die backed by a small seeded PRNG.
pub struct FairDice {
    sides: u32,
    rng: ChaCha8Rng,
}

impl FairDice {
    pub fn new(sides: u32, seed: u64) -> Self {
        assert!(sides >= 1, "a die needs at least one side");
        Self {
            sides,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn sides(&self) -> u32 {
        self.sides
    }
}

impl Dice for FairDice {
    fn roll(&mut self) -> u32 {
        self.rng.gen_range(1..=self.sides)
    }
}

/// Deterministic die that cycles through `faces`.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    faces: Vec<u32>,
    index: usize,
}

impl ScriptedDice {
    pub fn new(faces: impl Into<Vec<u32>>) -> Self {
        let faces = faces.into();
        assert!(!faces.is_empty(), "scripted dice need at least one face");
        Self { faces, index: 0 }
    }

    /// Number of faces consumed so far (not wrapped).
    pub fn consumed(&self) -> usize {
        self.index
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> u32 {
        let v = self.faces[self.index % self.faces.len()];
        self.index += 1;
        v
    }
}

/// Roll up to `num_rolls` dice. A face of 1 ends the roll immediately with a score of 1
/// (Pig Out); otherwise the faces are summed.
pub fn roll_dice(num_rolls: u32, dice: &mut dyn Dice) -> u32 {
    let mut sum = 0;
    for _ in 0..num_rolls {
        let face = dice.roll();
        if face == 1 {
            return 1;
        }
        sum += face;
    }
    sum
}

/// Points gained in one turn: Free Bacon on zero rolls, otherwise the dice.
pub fn take_turn(num_rolls: u32, oppo_score: u32, dice: &mut dyn Dice) -> u32 {
    if num_rolls == 0 {
        crate::rules::free_bacon(oppo_score)
    } else {
        roll_dice(num_rolls, dice)
    }
}
