use std::collections::HashSet;
use std::sync::atomic::AtomicBool;

use bacon_core::{ConstantPolicy, GameRules, PolicyTable};
use bacon_oracle::Precomputed;

use crate::evaluator::Evaluator;
use crate::learn::{next_focus, Improver, LearnOptions, LearnProgress, LearnRound};
use crate::EvalError;

#[derive(Default)]
struct Recorder {
    rounds: Vec<LearnRound>,
    checkpoints: Vec<u64>,
}

impl LearnProgress for Recorder {
    fn on_round(&mut self, round: &LearnRound) {
        self.rounds.push(*round);
    }

    fn on_checkpoint(&mut self, round: u64) {
        self.checkpoints.push(round);
    }
}

fn options(rounds: u64) -> LearnOptions {
    LearnOptions {
        rounds,
        focus: None,
        checkpoint_interval: 10,
        checkpoint: None,
    }
}

#[test]
fn focus_walk_visits_every_cell_then_repeats() {
    let goal = 3;
    let mut focus = (goal - 1, goal - 1);
    let mut seen = vec![focus];
    for _ in 1..goal * goal {
        focus = next_focus(focus, goal);
        seen.push(focus);
    }
    assert_eq!(
        seen,
        vec![(2, 2), (1, 1), (0, 0), (1, 2), (2, 1), (0, 1), (1, 0), (0, 2), (2, 0)]
    );
    assert_eq!(next_focus(focus, goal), (2, 2));

    let goal = 7;
    let mut focus = (goal - 1, goal - 1);
    let mut cells = HashSet::new();
    for _ in 0..goal * goal {
        cells.insert(focus);
        focus = next_focus(focus, goal);
    }
    assert_eq!(cells.len(), (goal * goal) as usize);
    assert_eq!(focus, (goal - 1, goal - 1));
}

#[test]
fn win_rate_never_decreases() {
    let rules = GameRules::plain(8, 6, 3).with_toggles(true, false);
    let pre = Precomputed::new(rules).unwrap();
    let mut table = PolicyTable::from_policy(&rules, &ConstantPolicy(1)).unwrap();
    let opponent = ConstantPolicy(2);
    let mut rec = Recorder::default();
    let stop = AtomicBool::new(false);

    let report = Improver::new(&pre)
        .learn(&mut table, &opponent, &options(64), &stop, Some(&mut rec))
        .unwrap();

    assert_eq!(report.rounds_completed, 64);
    assert!(!report.interrupted);
    assert_eq!(rec.rounds.len(), 64);
    let mut prev = report.initial_win_rate;
    for r in &rec.rounds {
        assert!(r.win_rate >= prev, "round {}: {} < {prev}", r.round, r.win_rate);
        assert!(table.get(r.focus.0, r.focus.1) <= rules.max_rolls);
        prev = r.win_rate;
    }
    assert_eq!(report.final_win_rate, prev);
    assert!(report.final_win_rate > report.initial_win_rate);

    let mut eval = Evaluator::new(&pre);
    let again = eval.averaged(&table, &opponent);
    assert_eq!(again, report.final_win_rate);
}

#[test]
fn rounds_follow_focus_walk() {
    let rules = GameRules::plain(5, 6, 2);
    let pre = Precomputed::new(rules).unwrap();
    let mut table = PolicyTable::new(&rules);
    let mut rec = Recorder::default();
    let stop = AtomicBool::new(false);
    let opts = LearnOptions {
        focus: Some((1, 3)),
        ..options(4)
    };
    let report = Improver::new(&pre)
        .learn(&mut table, &ConstantPolicy(1), &opts, &stop, Some(&mut rec))
        .unwrap();

    let mut focus = (1, 3);
    for r in &rec.rounds {
        assert_eq!(r.focus, focus);
        focus = next_focus(focus, rules.goal);
    }
    assert_eq!(report.next_focus, focus);
}

#[test]
fn preset_interrupt_does_nothing() {
    let rules = GameRules::plain(6, 6, 2);
    let pre = Precomputed::new(rules).unwrap();
    let mut table = PolicyTable::new(&rules);
    let before = table.clone();
    let stop = AtomicBool::new(true);
    let report = Improver::new(&pre)
        .learn(&mut table, &ConstantPolicy(1), &options(10), &stop, None)
        .unwrap();
    assert!(report.interrupted);
    assert_eq!(report.rounds_completed, 0);
    assert_eq!(report.final_win_rate, report.initial_win_rate);
    assert_eq!(report.next_focus, (5, 5));
    assert_eq!(table, before);
}

#[test]
fn checkpoints_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("learned.txt");
    let rules = GameRules::plain(6, 6, 2);
    let pre = Precomputed::new(rules).unwrap();
    let mut table = PolicyTable::new(&rules);
    let mut rec = Recorder::default();
    let stop = AtomicBool::new(false);
    let opts = LearnOptions {
        checkpoint_interval: 2,
        checkpoint: Some(path.clone()),
        ..options(5)
    };
    Improver::new(&pre)
        .learn(&mut table, &ConstantPolicy(3), &opts, &stop, Some(&mut rec))
        .unwrap();

    assert_eq!(rec.checkpoints, vec![2, 4]);
    let saved = PolicyTable::load(&rules, &path).unwrap();
    assert_eq!(saved, table);
}

#[test]
fn bad_inputs_are_rejected() {
    let rules = GameRules::plain(6, 6, 2);
    let pre = Precomputed::new(rules).unwrap();
    let stop = AtomicBool::new(false);

    let mut table = PolicyTable::new(&rules);
    let opts = LearnOptions {
        focus: Some((6, 0)),
        ..options(1)
    };
    let err = Improver::new(&pre)
        .learn(&mut table, &ConstantPolicy(1), &opts, &stop, None)
        .unwrap_err();
    assert!(matches!(err, EvalError::BadFocus(6, 0)));

    let mut other = PolicyTable::new(&GameRules::plain(7, 6, 2));
    let err = Improver::new(&pre)
        .learn(&mut other, &ConstantPolicy(1), &options(1), &stop, None)
        .unwrap_err();
    assert!(matches!(err, EvalError::Table(_)));
}
