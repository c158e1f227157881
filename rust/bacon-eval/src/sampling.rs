//! Monte-Carlo win rate by playing full games.

use rayon::prelude::*;

use bacon_core::dice::splitmix64_next;
use bacon_core::{play, FairDice, GameRules, Policy, Start};

use crate::evaluator::PlaysAs;
use crate::EvalError;

/// Fraction of `samples` games won by `policy`. Each game gets its own dice stream derived
/// from `seed` and the game index, so the result is reproducible regardless of thread count.
///
/// Averaged mode plays `ceil(samples / 2)` games in the first seat and the rest in the second.
pub fn sampled_win_rate(
    rules: &GameRules,
    policy: &dyn Policy,
    oppo: &dyn Policy,
    plays_as: PlaysAs,
    start: Start,
    samples: u64,
    seed: u64,
) -> Result<f64, EvalError> {
    if samples == 0 {
        return Err(EvalError::NoSamples);
    }
    let first_seat_games = match plays_as {
        PlaysAs::First => samples,
        PlaysAs::Second => 0,
        PlaysAs::Averaged => samples.div_ceil(2),
    };

    let wins = (0..samples)
        .into_par_iter()
        .filter(|&i| {
            let mut state = seed ^ i;
            let mut dice = FairDice::new(rules.dice_sides, splitmix64_next(&mut state));
            if i < first_seat_games {
                play(policy, oppo, start, rules, &mut dice).winner() == 0
            } else {
                play(oppo, policy, start.mirrored(), rules, &mut dice).winner() == 1
            }
        })
        .count();

    Ok(wins as f64 / samples as f64)
}
