use bacon_core::{ConstantPolicy, GameRules, Policy};

use crate::roster::{builtin_names, builtin_policy, Roster};
use crate::EvalError;

#[test]
fn builtin_names_and_order() {
    let rules = GameRules::plain(20, 6, 2);
    let r = Roster::builtin(&rules, 0);
    let names: Vec<&str> = r.names().collect();
    assert_eq!(
        names,
        ["always0", "always1", "always2", "random", "swap", "default"]
    );
    // "default" rolls four dice, capped by max_rolls
    assert_eq!(r.get("default").map(|p| p.choose(3, 5)), Some(2));
    assert_eq!(r.get("always1").map(|p| p.choose(3, 5)), Some(1));
    assert!(r.get("nope").is_none());
}

#[test]
fn duplicate_add_is_rejected() {
    let mut r = Roster::new();
    r.add("a", Box::new(ConstantPolicy(1))).unwrap();
    let err = r.add("a", Box::new(ConstantPolicy(2))).unwrap_err();
    assert!(matches!(err, EvalError::DuplicateName(n) if n == "a"));
    assert_eq!(r.len(), 1);
}

#[test]
fn select_keeps_requested_order() {
    let rules = GameRules::plain(20, 6, 3);
    let r = Roster::builtin(&rules, 0).select(&["swap", "always0"]).unwrap();
    assert_eq!(r.names().collect::<Vec<_>>(), ["swap", "always0"]);
    assert_eq!(r.position("always0"), Some(1));
}

#[test]
fn select_reports_bad_names() {
    let rules = GameRules::plain(20, 6, 3);
    let err = Roster::builtin(&rules, 0).select(&["always9"]).err();
    assert!(matches!(err, Some(EvalError::UnknownPolicy(n)) if n == "always9"));
    let err = Roster::builtin(&rules, 0)
        .select(&["swap", "swap"])
        .err();
    assert!(matches!(err, Some(EvalError::DuplicateName(n)) if n == "swap"));
}

#[test]
fn builtin_lookup_by_name() {
    let rules = GameRules::plain(20, 6, 3);
    assert_eq!(builtin_policy(&rules, 0, "always3").map(|p| p.choose(0, 0)), Some(3));
    assert!(builtin_policy(&rules, 0, "always4").is_none());
    assert!(builtin_policy(&rules, 0, "alwaysx").is_none());
    assert!(builtin_policy(&rules, 0, "final").is_none());
    for name in builtin_names(&rules) {
        assert!(builtin_policy(&rules, 0, &name).is_some(), "{name}");
    }
}
