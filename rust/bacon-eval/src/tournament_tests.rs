use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use bacon_core::{ConstantPolicy, GameRules};
use bacon_oracle::Precomputed;

use crate::roster::Roster;
use crate::tournament::{rank, round_robin, Standing, TournamentOptions};

fn options(threads: u32, report_interval: u32) -> TournamentOptions {
    TournamentOptions {
        threads,
        report_interval,
        ..TournamentOptions::default()
    }
}

#[test]
fn every_pair_is_played_once() {
    let rules = GameRules::plain(20, 6, 3).with_toggles(true, true);
    let pre = Precomputed::new(rules).unwrap();
    let roster = Roster::builtin(&rules, 1);
    let stop = AtomicBool::new(false);
    let report = round_robin(&pre, &roster, &options(3, 1), &stop, None);

    let n = roster.len();
    assert_eq!(report.total_pairs, n * (n - 1) / 2);
    assert_eq!(report.completed, report.total_pairs);
    assert_eq!(report.decided + report.ties, report.total_pairs);
    assert!(!report.interrupted);
    let wins: u32 = report.standings.iter().map(|s| s.wins).sum();
    assert_eq!(wins as usize, report.decided);
}

#[test]
fn thread_count_does_not_change_results() {
    let rules = GameRules::plain(20, 6, 4).with_toggles(true, false);
    let pre = Precomputed::new(rules).unwrap();
    let stop = AtomicBool::new(false);
    let one = round_robin(&pre, &Roster::builtin(&rules, 5), &options(1, 100), &stop, None);
    let four = round_robin(&pre, &Roster::builtin(&rules, 5), &options(4, 100), &stop, None);
    assert_eq!(one.standings, four.standings);
    assert_eq!(one.ties, four.ties);
}

#[test]
fn mirror_match_is_a_tie() {
    let rules = GameRules::plain(3, 6, 2);
    let pre = Precomputed::new(rules).unwrap();
    let mut roster = Roster::new();
    roster.add("zero", Box::new(ConstantPolicy(0))).unwrap();
    roster.add("zero_again", Box::new(ConstantPolicy(0))).unwrap();
    let stop = AtomicBool::new(false);
    let report = round_robin(&pre, &roster, &options(2, 1), &stop, None);
    assert_eq!(report.ties, 1);
    assert_eq!(report.decided, 0);
    assert!(report.standings.iter().all(|s| s.rank == 1 && s.wins == 0));
}

#[test]
fn interrupt_stops_after_current_comparison() {
    let rules = GameRules::plain(15, 6, 3);
    let pre = Precomputed::new(rules).unwrap();
    let roster = Roster::builtin(&rules, 0);
    let stop = AtomicBool::new(false);
    let seen = Mutex::new(Vec::new());
    let progress = |played: usize, remaining: usize, _wins: u32, _leader: &str| {
        seen.lock().unwrap().push((played, remaining));
        if played == 4 {
            stop.store(true, Ordering::SeqCst);
        }
    };
    let report = round_robin(&pre, &roster, &options(1, 1), &stop, Some(&progress));

    assert!(report.interrupted);
    assert_eq!(report.completed, 4);
    assert_eq!(report.decided + report.ties, 4);
    let total = report.total_pairs;
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(1, total - 1), (2, total - 2), (3, total - 3), (4, total - 4)]
    );
}

#[test]
fn progress_reports_never_overlap() {
    let rules = GameRules::plain(15, 6, 3);
    let pre = Precomputed::new(rules).unwrap();
    let roster = Roster::builtin(&rules, 0);
    let stop = AtomicBool::new(false);
    let inside = AtomicUsize::new(0);
    let max_inside = AtomicUsize::new(0);
    let calls = AtomicUsize::new(0);
    let progress = |_played: usize, _remaining: usize, _wins: u32, _leader: &str| {
        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
        max_inside.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(2));
        calls.fetch_add(1, Ordering::SeqCst);
        inside.fetch_sub(1, Ordering::SeqCst);
    };
    let report = round_robin(&pre, &roster, &options(4, 1), &stop, Some(&progress));

    assert!(!report.interrupted);
    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    assert_eq!(calls.load(Ordering::SeqCst), report.total_pairs);
}

#[test]
fn interrupt_with_many_threads_counts_only_finished_pairs() {
    let rules = GameRules::plain(15, 6, 3);
    let pre = Precomputed::new(rules).unwrap();
    let roster = Roster::builtin(&rules, 0);
    let stop = AtomicBool::new(false);
    let max_played = AtomicUsize::new(0);
    let progress = |played: usize, _remaining: usize, _wins: u32, _leader: &str| {
        max_played.fetch_max(played, Ordering::SeqCst);
        if played >= 5 {
            stop.store(true, Ordering::SeqCst);
        }
    };
    let report = round_robin(&pre, &roster, &options(4, 1), &stop, Some(&progress));

    assert!(report.interrupted);
    assert!(report.completed >= 5 && report.completed < report.total_pairs);
    assert_eq!(report.completed, max_played.load(Ordering::SeqCst));
    assert_eq!(report.decided + report.ties, report.completed);
    let wins: u32 = report.standings.iter().map(|s| s.wins).sum();
    assert_eq!(wins as usize, report.decided);
}

#[test]
fn progress_names_a_leader() {
    let rules = GameRules::plain(15, 6, 3);
    let pre = Precomputed::new(rules).unwrap();
    let roster = Roster::builtin(&rules, 0);
    let stop = AtomicBool::new(false);
    let last = Mutex::new(None);
    let progress = |played: usize, _remaining: usize, wins: u32, leader: &str| {
        *last.lock().unwrap() = Some((played, wins, leader.to_string()));
    };
    let report = round_robin(&pre, &roster, &options(1, 1), &stop, Some(&progress));

    let (played, wins, leader) = last.into_inner().unwrap().expect("at least one report");
    assert_eq!(played, report.total_pairs);
    assert_eq!(wins, report.standings[0].wins);
    assert!(roster.position(&leader).is_some());
}

#[test]
fn tied_wins_share_a_rank() {
    let mut roster = Roster::new();
    for name in ["c", "a", "b", "d"] {
        roster.add(name, Box::new(ConstantPolicy(1))).unwrap();
    }
    let standings = rank(&roster, &[1, 1, 2, 0]);
    let expect = |rank, name: &str, wins| Standing {
        rank,
        name: name.to_string(),
        wins,
    };
    assert_eq!(
        standings,
        vec![expect(1, "b", 2), expect(2, "a", 1), expect(2, "c", 1), expect(4, "d", 0)]
    );
    assert_eq!(standings[1].render_line(), "2. a with 1 wins");
}
