use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

fn bacon_bin() -> String {
    // Provided by Cargo for integration tests of binaries.
    env!("CARGO_BIN_EXE_bacon").to_string()
}

fn write_config(dir: &Path, yaml: &str) -> PathBuf {
    let path = dir.join("cfg.yaml");
    fs::write(&path, yaml).unwrap();
    path
}

/// Small ruleset so every command finishes quickly.
fn small_config(dir: &Path) -> PathBuf {
    write_config(
        dir,
        r#"
rules:
  goal: 12
  max_rolls: 3
tournament:
  threads: 2
  report_interval: 1
learn:
  announce_interval: 1
  win_rate_interval: 2
sampling:
  samples: 2000
  seed: 7
"#,
    )
}

fn run(args: &[&str]) -> Output {
    Command::new(bacon_bin()).args(args).output().unwrap()
}

fn ok(args: &[&str]) -> String {
    let out = run(args);
    assert!(
        out.status.success(),
        "args: {args:?}\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn version_and_help() {
    assert!(ok(&["--version"]).starts_with("bacon "));
    let out = run(&[]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("tournament"));
    assert!(ok(&["learn", "--help"]).contains("bacon learn"));
}

#[test]
fn unknown_command_and_policy_fail() {
    let out = run(&["frobnicate"]);
    assert_eq!(out.status.code(), Some(1));

    let dir = tempfile::tempdir().unwrap();
    let cfg = small_config(dir.path());
    let out = run(&["get", "nonsense", "1", "2", "--config", cfg.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Unknown policy"));

    let out = run(&["get", "always1", "12", "0", "--config", cfg.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(dir.path(), "rules:\n  goal: 1\n");
    let out = run(&["winrate", "always1", "always2", "--config", cfg.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("goal"));
}

#[test]
fn final_writes_a_dense_table() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = small_config(dir.path());
    let table = dir.path().join("final.txt");
    let lookup = dir.path().join("final.py");
    let stdout = ok(&[
        "final",
        "--config",
        cfg.to_str().unwrap(),
        "--out",
        table.to_str().unwrap(),
        "--lookup",
        lookup.to_str().unwrap(),
    ]);
    assert!(stdout.contains("First-mover win rate"));

    let text = fs::read_to_string(&table).unwrap();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 12);
    for row in rows {
        let cells: Vec<u32> = row.split_whitespace().map(|t| t.parse().unwrap()).collect();
        assert_eq!(cells.len(), 12);
        assert!(cells.iter().all(|&r| r <= 3));
    }
    let expr = fs::read_to_string(&lookup).unwrap();
    assert!(expr.starts_with("def strategy(score, opponent_score):"));

    // `get` on the saved file agrees with `get final`.
    let from_file = ok(&["get", table.to_str().unwrap(), "5", "3", "--config", cfg.to_str().unwrap()]);
    let solved = ok(&["get", "final", "5", "3", "--config", cfg.to_str().unwrap()]);
    assert_eq!(from_file, solved);
}

#[test]
fn winrate_of_mirror_match_is_even() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = small_config(dir.path());
    let out = ok(&["winrate", "swap", "swap", "--config", cfg.to_str().unwrap()]);
    assert!(out.contains("(averaged): 0.500000"), "{out}");

    // Goal 3 with zero dice is decided by free bacon alone.
    let cfg = write_config(dir.path(), "rules:\n  goal: 3\n  max_rolls: 2\n  swine_swap: false\n  time_trot: false\n");
    let out = ok(&["winrate", "always0", "always0", "--as", "first", "--config", cfg.to_str().unwrap()]);
    assert!(out.contains("(first): 1.000000"), "{out}");
}

#[test]
fn sample_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = small_config(dir.path());
    let args = ["sample", "always2", "random", "--config", cfg.to_str().unwrap()];
    let a = ok(&args);
    let b = ok(&args);
    assert_eq!(a, b);
    assert!(a.contains("2000 games"));
}

#[test]
fn tournament_prints_standings_and_logs() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = small_config(dir.path());
    let log = dir.path().join("t.ndjson");
    let out = ok(&[
        "tournament",
        "always1",
        "always2",
        "always3",
        "final",
        "--config",
        cfg.to_str().unwrap(),
        "--log",
        log.to_str().unwrap(),
    ]);
    let standings: Vec<&str> = out.lines().filter(|l| l.contains(" wins") && l.contains(". ")).collect();
    assert!(out.contains("Decided:"));
    assert!(standings.iter().any(|l| l.contains("final with")));

    let events: Vec<Value> = fs::read_to_string(&log)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let progress = events.iter().filter(|e| e["event"] == "tournament_progress").count();
    let standing = events.iter().filter(|e| e["event"] == "tournament_standing").count();
    assert_eq!(progress, 6);
    assert_eq!(standing, 4);

    let manifest = bacon_logging::read_manifest(bacon_logging::manifest_path_for(&log)).unwrap();
    assert_eq!(manifest.command, "tournament");
    assert_eq!(manifest.tournament_pairs_total, 6);
    assert_eq!(manifest.tournament_pairs_completed, 6);
    assert!(!manifest.interrupted);
    assert!(manifest.config_hash.is_some());
    assert!(manifest.finished_ts_ms.is_some());
}

#[test]
fn learn_writes_improved_table() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = small_config(dir.path());
    let table = dir.path().join("learned.txt");
    let log = dir.path().join("learn.ndjson");
    let out = ok(&[
        "learn",
        "--from",
        "always1",
        "--opponent",
        "always3",
        "--rounds",
        "5",
        "--out",
        table.to_str().unwrap(),
        "--config",
        cfg.to_str().unwrap(),
        "--log",
        log.to_str().unwrap(),
    ]);
    assert!(out.contains("after 5 rounds"), "{out}");
    assert!(out.contains("Round 5/5"));

    let rules = bacon_core::Config::load(&cfg).unwrap().rules;
    let learned = bacon_core::PolicyTable::load(&rules, &table).unwrap();
    assert_eq!(learned.goal(), 12);

    let manifest = bacon_logging::read_manifest(bacon_logging::manifest_path_for(&log)).unwrap();
    assert_eq!(manifest.learn_rounds_completed, 5);
    assert!(manifest.final_win_rate.is_some());

    let rounds = fs::read_to_string(&log).unwrap().lines().count();
    assert_eq!(rounds, 5);
}

#[test]
fn table_tools() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = small_config(dir.path());
    let c = cfg.to_str().unwrap();

    let out = ok(&["diff", "always2", "always2", "--config", c]);
    assert!(out.contains("0 of 144 cells differ"));
    let out = ok(&["diff", "always1", "always2", "--config", c]);
    assert!(out.contains("144 of 144 cells differ"));
    assert!(out.contains("(0, 0): 1 vs 2"));

    let out = ok(&["graph", "always3", "--config", c]);
    assert!(out.contains("LEGEND"));
    let out = ok(&["graph", "always3", "--against", "always3", "--config", c]);
    assert!(out.contains("LEGEND"));

    let out = ok(&["export", "always0", "--config", c]);
    assert!(out.starts_with("def strategy(score, opponent_score):"));
    let dense = dir.path().join("swap.txt");
    ok(&["export", "swap", "--dense", "--out", dense.to_str().unwrap(), "--config", c]);
    assert_eq!(fs::read_to_string(dense).unwrap().lines().count(), 12);
}

#[test]
fn play_narrates_a_game() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = small_config(dir.path());
    let out = ok(&["play", "always2", "swap", "--seed", "3", "--config", cfg.to_str().unwrap()]);
    assert!(out.contains("Current score: 0-0"));
    assert!(out.contains("Player 0 rolled: 2"));
    assert!(out.contains("Final score:"));
}
