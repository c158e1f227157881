use bacon_core::{ConstantPolicy, GameRules, RandomPolicy, Start};

use crate::evaluator::PlaysAs;
use crate::sampling::sampled_win_rate;
use crate::EvalError;

#[test]
fn zero_samples_is_an_error() {
    let rules = GameRules::plain(10, 6, 2);
    let p = ConstantPolicy(1);
    let err = sampled_win_rate(&rules, &p, &p, PlaysAs::First, Start::default(), 0, 7);
    assert!(matches!(err, Err(EvalError::NoSamples)));
}

#[test]
fn deterministic_games_count_exactly() {
    let rules = GameRules::plain(3, 6, 2);
    let zero = ConstantPolicy(0);
    let start = Start::default();
    let first = sampled_win_rate(&rules, &zero, &zero, PlaysAs::First, start, 10, 1).unwrap();
    let second = sampled_win_rate(&rules, &zero, &zero, PlaysAs::Second, start, 10, 1).unwrap();
    assert_eq!(first, 1.0);
    assert_eq!(second, 0.0);
    // 6 of 11 games in the first seat.
    let avg = sampled_win_rate(&rules, &zero, &zero, PlaysAs::Averaged, start, 11, 1).unwrap();
    assert_eq!(avg, 6.0 / 11.0);
}

#[test]
fn same_seed_same_result() {
    let rules = GameRules::plain(30, 6, 4).with_toggles(true, true);
    let p = RandomPolicy::new(rules.max_rolls, 3);
    let q = ConstantPolicy(2);
    let run = |seed| {
        sampled_win_rate(&rules, &p, &q, PlaysAs::Averaged, Start::default(), 2_000, seed)
            .unwrap()
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn converges_to_exact_value() {
    // Exact first-seat value is 31/36.
    let rules = GameRules::plain(2, 6, 2);
    let one = ConstantPolicy(1);
    let w = sampled_win_rate(&rules, &one, &one, PlaysAs::First, Start::default(), 20_000, 9)
        .unwrap();
    assert!((w - 31.0 / 36.0).abs() < 0.02, "{w}");
}
