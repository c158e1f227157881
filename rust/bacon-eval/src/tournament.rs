//! Round-robin tournament over a roster, split across worker threads.
//!
//! Thread `k` of `T` takes, for every `i`, the opponents `j = i + 1 + k, i + 1 + k + T, ...`.
//! Each worker owns its evaluator and tallies; the tallies are merged after all threads join.
//! Shared atomics exist only to feed progress reports.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;

use bacon_core::{Start, TournamentConfig};
use bacon_oracle::Precomputed;

use crate::evaluator::{Evaluator, PlaysAs};
use crate::roster::Roster;

#[derive(Debug, Clone, Copy)]
pub struct TournamentOptions {
    pub margin: f64,
    pub threads: u32,
    pub report_interval: u32,
}

impl Default for TournamentOptions {
    fn default() -> Self {
        Self::from_config(&TournamentConfig::default())
    }
}

impl TournamentOptions {
    pub fn from_config(cfg: &TournamentConfig) -> Self {
        Self {
            margin: cfg.margin,
            threads: cfg.threads,
            report_interval: cfg.report_interval,
        }
    }
}

/// Progress sink. Called from worker threads, never concurrently with itself.
pub trait TournamentProgress: Sync {
    fn report(&self, played: usize, remaining: usize, leader_wins: u32, leader: &str);
}

impl<F> TournamentProgress for F
where
    F: Fn(usize, usize, u32, &str) + Sync,
{
    fn report(&self, played: usize, remaining: usize, leader_wins: u32, leader: &str) {
        self(played, remaining, leader_wins, leader)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub rank: usize,
    pub name: String,
    pub wins: u32,
}

impl Standing {
    pub fn render_line(&self) -> String {
        format!("{}. {} with {} wins", self.rank, self.name, self.wins)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TournamentReport {
    /// Sorted by wins (descending), then name; tied entries share a rank.
    pub standings: Vec<Standing>,
    pub decided: usize,
    pub ties: usize,
    pub completed: usize,
    pub total_pairs: usize,
    pub interrupted: bool,
}

/// Per-worker tallies.
#[derive(Debug, Clone, Default)]
struct TournamentPartial {
    wins: Vec<u32>,
    decided: usize,
    ties: usize,
    completed: usize,
}

impl TournamentPartial {
    fn new(n: usize) -> Self {
        Self {
            wins: vec![0; n],
            ..Self::default()
        }
    }

    fn merge(&mut self, other: &TournamentPartial) {
        for (w, o) in self.wins.iter_mut().zip(&other.wins) {
            *w += o;
        }
        self.decided += other.decided;
        self.ties += other.ties;
        self.completed += other.completed;
    }
}

/// Serializes progress callbacks with a busy flag and a condition variable. The mutex is
/// only held to flip the flag, not while the callback runs.
struct ReportGate {
    busy: Mutex<bool>,
    idle: Condvar,
}

struct GateRelease<'a>(&'a ReportGate);

impl Drop for GateRelease<'_> {
    fn drop(&mut self) {
        let mut busy = self.0.busy.lock().unwrap_or_else(PoisonError::into_inner);
        *busy = false;
        self.0.idle.notify_one();
    }
}

impl ReportGate {
    fn new() -> Self {
        Self {
            busy: Mutex::new(false),
            idle: Condvar::new(),
        }
    }

    fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        {
            let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);
            while *busy {
                busy = self
                    .idle
                    .wait(busy)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            *busy = true;
        }
        let _release = GateRelease(self);
        f()
    }
}

/// Live counters for progress reports.
struct Scoreboard {
    played: AtomicUsize,
    wins: Vec<AtomicU32>,
    /// `wins << 32 | (u32::MAX - idx)`: the max is the most wins, lowest index on ties.
    leader: AtomicU64,
}

impl Scoreboard {
    fn new(n: usize) -> Self {
        Self {
            played: AtomicUsize::new(0),
            wins: (0..n).map(|_| AtomicU32::new(0)).collect(),
            leader: AtomicU64::new(Self::pack(0, 0)),
        }
    }

    fn pack(wins: u32, idx: usize) -> u64 {
        ((wins as u64) << 32) | (u32::MAX - idx as u32) as u64
    }

    fn credit(&self, idx: usize) {
        let wins = self.wins[idx].fetch_add(1, Ordering::Relaxed) + 1;
        self.leader
            .fetch_max(Self::pack(wins, idx), Ordering::Relaxed);
    }

    fn leader(&self) -> (u32, usize) {
        let v = self.leader.load(Ordering::Relaxed);
        ((v >> 32) as u32, (u32::MAX - v as u32) as usize)
    }
}

/// Play every unordered pair once with the averaged exact win rate.
///
/// `interrupt` is polled before each comparison; once set, workers stop taking new pairs and
/// the report covers exactly the comparisons that finished.
pub fn round_robin(
    pre: &Precomputed,
    roster: &Roster,
    opts: &TournamentOptions,
    interrupt: &AtomicBool,
    progress: Option<&dyn TournamentProgress>,
) -> TournamentReport {
    let n = roster.len();
    let total_pairs = n * n.saturating_sub(1) / 2;
    let threads = opts.threads.max(1) as usize;
    let interval = opts.report_interval.max(1) as usize;
    let margin = opts.margin;

    let board = Scoreboard::new(n);
    let gate = ReportGate::new();

    let worker = |k: usize| -> TournamentPartial {
        let mut eval = Evaluator::new(pre);
        let mut part = TournamentPartial::new(n);
        for i in 0..n {
            let mut j = i + 1 + k;
            while j < n {
                if interrupt.load(Ordering::SeqCst) {
                    return part;
                }
                let avr = eval.win_rate(
                    roster.policy(i),
                    roster.policy(j),
                    PlaysAs::Averaged,
                    Start::default(),
                );
                let winner = if avr > margin {
                    Some(i)
                } else if avr < 1.0 - margin {
                    Some(j)
                } else {
                    None
                };
                match winner {
                    Some(w) => {
                        part.wins[w] += 1;
                        part.decided += 1;
                        board.credit(w);
                    }
                    None => part.ties += 1,
                }
                part.completed += 1;

                let played = board.played.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(p) = progress {
                    if played % interval == 0 {
                        gate.run(|| {
                            let (wins, idx) = board.leader();
                            p.report(played, total_pairs - played, wins, roster.name(idx));
                        });
                    }
                }
                j += threads;
            }
        }
        part
    };

    let mut total = TournamentPartial::new(n);
    thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|k| {
                let worker = &worker;
                s.spawn(move || worker(k))
            })
            .collect();
        for h in handles {
            let part = h
                .join()
                .unwrap_or_else(|e| std::panic::resume_unwind(e));
            total.merge(&part);
        }
    });

    TournamentReport {
        standings: rank(roster, &total.wins),
        decided: total.decided,
        ties: total.ties,
        completed: total.completed,
        total_pairs,
        interrupted: total.completed < total_pairs,
    }
}

/// Stable sort by wins descending then name; equal win counts share the first rank of
/// their group.
pub fn rank(roster: &Roster, wins: &[u32]) -> Vec<Standing> {
    let mut order: Vec<usize> = (0..roster.len()).collect();
    order.sort_by(|&a, &b| {
        wins[b]
            .cmp(&wins[a])
            .then_with(|| roster.name(a).cmp(roster.name(b)))
    });

    let mut out: Vec<Standing> = Vec::with_capacity(order.len());
    for (pos, &idx) in order.iter().enumerate() {
        let rank = match out.last() {
            Some(prev) if prev.wins == wins[idx] => prev.rank,
            _ => pos + 1,
        };
        out.push(Standing {
            rank,
            name: roster.name(idx).to_string(),
            wins: wins[idx],
        });
    }
    out
}
