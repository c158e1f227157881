use crate::rules::{free_bacon, GameRules, RulesError};

#[test]
fn free_bacon_uses_largest_digit() {
    assert_eq!(free_bacon(0), 1);
    assert_eq!(free_bacon(7), 8);
    assert_eq!(free_bacon(42), 5);
    assert_eq!(free_bacon(90), 10);
    assert_eq!(free_bacon(19), 10);
}

#[test]
fn swap_requires_multiples_above_one() {
    let rules = GameRules::default();
    assert!(rules.is_swap(20, 40));
    assert!(rules.is_swap(40, 20));
    assert!(rules.is_swap(13, 13));
    assert!(!rules.is_swap(1, 40));
    assert!(!rules.is_swap(0, 40));
    assert!(!rules.is_swap(21, 40));
}

#[test]
fn swap_toggle_disables_rule() {
    let rules = GameRules::default().with_toggles(false, true);
    assert!(!rules.is_swap(20, 40));
    assert_eq!(rules.apply_swap(20, 40), (20, 40));

    let on = GameRules::default();
    assert_eq!(on.apply_swap(20, 40), (40, 20));
}

#[test]
fn time_trot_matches_turn_modulus() {
    let rules = GameRules::default();
    assert!(rules.is_time_trot(0, 0));
    assert!(rules.is_time_trot(7, 2));
    assert!(!rules.is_time_trot(7, 3));
    // rolls >= modulus can never trot
    assert!(!rules.is_time_trot(5, 5));

    let off = rules.with_toggles(true, false);
    assert!(!off.is_time_trot(7, 2));
}

#[test]
fn validate_rejects_degenerate_rules() {
    assert!(GameRules::default().validate().is_ok());

    let mut r = GameRules::default();
    r.dice_sides = 1;
    assert_eq!(r.validate(), Err(RulesError::TooFewSides(1)));

    let mut r = GameRules::default();
    r.max_rolls = 0;
    assert_eq!(r.validate(), Err(RulesError::BadMaxRolls { got: 0 }));

    let mut r = GameRules::default();
    r.goal = 1;
    assert_eq!(r.validate(), Err(RulesError::GoalTooSmall(1)));

    let mut r = GameRules::default();
    r.trot_modulus = 0;
    assert_eq!(r.validate(), Err(RulesError::ZeroTrotModulus));

    let mut r = GameRules::default();
    r.dice_sides = 100;
    r.max_rolls = 20;
    assert!(matches!(
        r.validate(),
        Err(RulesError::OutcomeOverflow { .. })
    ));
}

#[test]
fn ruleset_id_encodes_toggles() {
    let id = GameRules::plain(10, 6, 2).ruleset_id();
    assert_eq!(id, "hog_g10_d2x6_t5_swap0_trot0");
}
