//! bacon: CLI binary for the Hog analysis engine.
//!
//! Subcommands:
//! - final, export, graph, get, diff (policy tables)
//! - winrate, sample, play (two-policy comparisons)
//! - tournament, learn (long-running; interruptible with --time-limit)

use std::env;
use std::fmt::Display;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use bacon_core::{play, Announced, Config, FairDice, GameRules, Policy, PolicyTable, Start};
use bacon_eval::{
    builtin_names, builtin_policy, round_robin, sampled_win_rate, Evaluator, Improver,
    LearnOptions, LearnProgress, LearnRound, PlaysAs, Roster, TournamentOptions,
};
use bacon_logging::{
    hash_config_bytes, manifest_path_for, now_ms, try_git_hash, write_manifest_atomic,
    LearnRoundEventV1, NdjsonWriter, RunManifestV1, TournamentProgressEventV1,
    TournamentStandingEventV1, VersionInfoV1,
};
use bacon_oracle::{Precomputed, Solver};

fn die(msg: impl Display) -> ! {
    eprintln!("{msg}");
    process::exit(1);
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    args.get(i + 1)
        .map(String::as_str)
        .unwrap_or_else(|| die(format!("Missing value for {flag}")))
}

fn parse<T: FromStr>(s: &str, flag: &str) -> T {
    s.parse()
        .unwrap_or_else(|_| die(format!("Invalid {flag} value: {s}")))
}

/// `S,O` or `S,O,T`.
fn parse_start(s: &str, rules: &GameRules) -> Start {
    let parts: Vec<u32> = s.split(',').map(|p| parse(p.trim(), "--start")).collect();
    let start = match parts.as_slice() {
        [a, b] => Start::new(*a, *b, 0),
        [a, b, t] => Start::new(*a, *b, *t),
        _ => die(format!("Invalid --start value: {s} (expected SCORE,OPPO[,TURN])")),
    };
    check_scores(start.score, start.oppo_score, rules);
    start
}

fn check_scores(score: u32, oppo_score: u32, rules: &GameRules) {
    if score >= rules.goal || oppo_score >= rules.goal {
        die(format!(
            "Scores must be below the goal of {} (got {score}, {oppo_score})",
            rules.goal
        ));
    }
}

fn parse_plays_as(s: &str) -> PlaysAs {
    match s {
        "first" => PlaysAs::First,
        "second" => PlaysAs::Second,
        "averaged" | "avg" => PlaysAs::Averaged,
        other => die(format!(
            "Invalid --as value: {other} (expected first, second or averaged)"
        )),
    }
}

fn plays_as_label(p: PlaysAs) -> &'static str {
    match p {
        PlaysAs::First => "first",
        PlaysAs::Second => "second",
        PlaysAs::Averaged => "averaged",
    }
}

/// Options every command accepts, pulled out before command-specific parsing.
struct Common {
    config: Config,
    config_bytes: Option<Vec<u8>>,
    time_limit: Option<f64>,
    log: Option<PathBuf>,
    rest: Vec<String>,
}

fn split_common(args: &[String]) -> Common {
    let mut config_path: Option<String> = None;
    let mut time_limit: Option<f64> = None;
    let mut log: Option<PathBuf> = None;
    let mut rest = Vec::new();

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                config_path = Some(value(args, i, "--config").to_string());
                i += 2;
            }
            "--time-limit" => {
                let secs: f64 = parse(value(args, i, "--time-limit"), "--time-limit");
                if !secs.is_finite() || secs < 0.0 {
                    die(format!("Invalid --time-limit value: {secs}"));
                }
                time_limit = Some(secs);
                i += 2;
            }
            "--log" => {
                log = Some(PathBuf::from(value(args, i, "--log")));
                i += 2;
            }
            _ => {
                rest.push(args[i].clone());
                i += 1;
            }
        }
    }

    let (config, config_bytes) = match config_path {
        Some(path) => {
            let bytes = fs::read(&path)
                .unwrap_or_else(|e| die(format!("Failed to read config {path}: {e}")));
            let text = String::from_utf8_lossy(&bytes);
            let cfg = Config::from_yaml(&text)
                .unwrap_or_else(|e| die(format!("Invalid config {path}: {e}")));
            (cfg, Some(bytes))
        }
        None => (Config::default(), None),
    };

    Common {
        config,
        config_bytes,
        time_limit,
        log,
        rest,
    }
}

/// Flag set by a timer thread once `--time-limit` elapses.
fn arm_interrupt(time_limit: Option<f64>) -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    if let Some(secs) = time_limit {
        let f = Arc::clone(&flag);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs_f64(secs));
            f.store(true, Ordering::SeqCst);
        });
    }
    flag
}

/// Precomputed tables plus policy-name resolution.
struct Session {
    rules: GameRules,
    pre: Precomputed,
    seed: u64,
    optimal: Option<PolicyTable>,
}

impl Session {
    fn new(config: &Config) -> Self {
        let pre = Precomputed::new(config.rules)
            .unwrap_or_else(|e| die(format!("Failed to precompute tables: {e}")));
        Self {
            rules: config.rules,
            pre,
            seed: config.sampling.seed,
            optimal: None,
        }
    }

    fn optimal(&mut self) -> &PolicyTable {
        let pre = &self.pre;
        self.optimal.get_or_insert_with(|| {
            eprintln!("Solving optimal policy for {}...", pre.rules().ruleset_id());
            let t0 = Instant::now();
            let solved = Solver::new(pre)
                .solve()
                .unwrap_or_else(|e| die(format!("Solver failed: {e}")));
            eprintln!("Solved in {:.2}s", t0.elapsed().as_secs_f64());
            solved.into_table()
        })
    }

    /// Builtin name, `final`, or a dense table file.
    fn policy(&mut self, name: &str) -> Box<dyn Policy> {
        if let Some(p) = builtin_policy(&self.rules, self.seed, name) {
            return p;
        }
        if name == "final" {
            return Box::new(self.optimal().clone());
        }
        if Path::new(name).is_file() {
            let table = PolicyTable::load(&self.rules, name)
                .unwrap_or_else(|e| die(format!("Failed to load table {name}: {e}")));
            return Box::new(table);
        }
        die(format!(
            "Unknown policy: {name} (expected one of {}, final, or a table file)",
            builtin_names(&self.rules).join(", ")
        ))
    }

    fn table(&mut self, name: &str) -> PolicyTable {
        let p = self.policy(name);
        PolicyTable::from_policy(&self.rules, &*p)
            .unwrap_or_else(|e| die(format!("Policy {name} is out of range: {e}")))
    }
}

/// NDJSON event log and its manifest for one run.
struct RunLog {
    writer: Mutex<NdjsonWriter>,
    manifest: RunManifestV1,
    manifest_path: PathBuf,
    ruleset_id: String,
}

impl RunLog {
    fn open(common: &Common, command: &str) -> Option<Self> {
        let path = common.log.as_ref()?;
        let writer = NdjsonWriter::open_append_with_flush(path, 100)
            .unwrap_or_else(|e| die(format!("Failed to open log {}: {e}", path.display())));
        let ruleset_id = common.config.rules.ruleset_id();
        let mut manifest =
            RunManifestV1::new(format!("{command}-{}", now_ms()), command, ruleset_id.clone());
        manifest.git_hash = try_git_hash();
        manifest.config_hash = common.config_bytes.as_deref().map(hash_config_bytes);
        manifest.events_path = path.display().to_string();
        let manifest_path = manifest_path_for(path);
        write_manifest_atomic(&manifest_path, &manifest)
            .unwrap_or_else(|e| die(format!("Failed to write run manifest: {e}")));
        Some(Self {
            writer: Mutex::new(writer),
            manifest,
            manifest_path,
            ruleset_id,
        })
    }

    fn version(&self) -> VersionInfoV1 {
        VersionInfoV1::new(self.ruleset_id.clone())
    }

    fn run_id(&self) -> String {
        self.manifest.run_id.clone()
    }

    fn write<T: serde::Serialize>(&self, event: &T) {
        let mut w = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = w.write_event(event) {
            eprintln!("Failed to write log event: {e}");
        }
    }

    fn finish(mut self, update: impl FnOnce(&mut RunManifestV1)) {
        let mut w = self
            .writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = w.flush() {
            eprintln!("Failed to flush log: {e}");
        }
        update(&mut self.manifest);
        self.manifest.finished_ts_ms = Some(now_ms());
        write_manifest_atomic(&self.manifest_path, &self.manifest)
            .unwrap_or_else(|e| die(format!("Failed to write run manifest: {e}")));
    }
}

fn print_help() {
    eprintln!(
        r#"bacon - Hog strategy analysis

USAGE:
    bacon <COMMAND> [OPTIONS]

COMMANDS:
    final           Solve the optimal policy and write its table
    winrate         Exact win rate of one policy against another
    sample          Monte-Carlo win rate of one policy against another
    tournament      Round-robin tournament between policies
    learn           Improve a policy table against an opponent
    play            Play and narrate one game
    get             Print a policy's roll count at one score pair
    diff            List the cells where two policies differ
    graph           Draw a policy (or the difference of two) as text
    export          Write a policy as a lookup expression

GLOBAL OPTIONS:
    --config PATH       YAML config (rules, tournament, learn, sampling)
    --time-limit SECS   Stop tournament/learn cleanly after SECS seconds
    --log PATH          Append NDJSON events to PATH (tournament, learn)
    -h, --help          Print this help message
    -V, --version       Print version

POLICIES:
    always0..alwaysN, random, swap, default, final, or a path to a table file.

Run `bacon <COMMAND> --help` for command options.
"#
    );
}

fn print_version() {
    println!("bacon {}", env!("CARGO_PKG_VERSION"));
}

fn two_names(pos: &[String], usage: &str) -> (String, String) {
    match pos {
        [a, b] => (a.clone(), b.clone()),
        _ => die(format!("Usage: {usage}")),
    }
}

fn cmd_final(common: Common) {
    let mut out: Option<PathBuf> = None;
    let mut lookup: Option<PathBuf> = None;

    let args = &common.rest;
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"bacon final

USAGE:
    bacon final [--out PATH] [--lookup PATH] [--config PATH]

OPTIONS:
    --out PATH      Write the dense table to PATH (default: stdout)
    --lookup PATH   Also write the table as a lookup expression
"#
                );
                return;
            }
            "--out" => {
                out = Some(PathBuf::from(value(args, i, "--out")));
                i += 2;
            }
            "--lookup" => {
                lookup = Some(PathBuf::from(value(args, i, "--lookup")));
                i += 2;
            }
            other => die(format!(
                "Unknown option for `bacon final`: {other}\nRun `bacon final --help` for usage."
            )),
        }
    }

    let rules = common.config.rules;
    let pre = Precomputed::new(rules)
        .unwrap_or_else(|e| die(format!("Failed to precompute tables: {e}")));
    eprintln!("Solving optimal policy for {}...", rules.ruleset_id());
    let t0 = Instant::now();
    let optimal = Solver::new(&pre)
        .solve()
        .unwrap_or_else(|e| die(format!("Solver failed: {e}")));
    let secs = t0.elapsed().as_secs_f64();

    if let Some(path) = &lookup {
        let f = fs::File::create(path)
            .unwrap_or_else(|e| die(format!("Failed to create {}: {e}", path.display())));
        optimal
            .table()
            .write_lookup_expr(io::BufWriter::new(f))
            .unwrap_or_else(|e| die(format!("Failed to write {}: {e}", path.display())));
    }

    match &out {
        Some(path) => {
            optimal
                .table()
                .save(path)
                .unwrap_or_else(|e| die(format!("Failed to write {}: {e}", path.display())));
            println!("Solved in {secs:.2}s");
            println!("First-mover win rate: {:.6}", optimal.win_rate(0, 0));
            println!("Wrote {}", path.display());
        }
        None => {
            eprintln!("Solved in {secs:.2}s");
            eprintln!("First-mover win rate: {:.6}", optimal.win_rate(0, 0));
            optimal
                .table()
                .write_dense(io::stdout().lock())
                .unwrap_or_else(|e| die(format!("Failed to write table: {e}")));
        }
    }
}

fn cmd_winrate(common: Common) {
    let mut plays_as = PlaysAs::Averaged;
    let mut start: Option<String> = None;
    let mut pos: Vec<String> = Vec::new();

    let args = &common.rest;
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"bacon winrate

USAGE:
    bacon winrate POLICY OPPONENT [--as first|second|averaged] [--start S,O[,T]]

OPTIONS:
    --as SEAT       Seat taken by POLICY (default: averaged)
    --start S,O,T   Starting scores (POLICY's first) and turn counter (default: 0,0,0)
"#
                );
                return;
            }
            "--as" => {
                plays_as = parse_plays_as(value(args, i, "--as"));
                i += 2;
            }
            "--start" => {
                start = Some(value(args, i, "--start").to_string());
                i += 2;
            }
            other if other.starts_with("--") => die(format!(
                "Unknown option for `bacon winrate`: {other}\nRun `bacon winrate --help` for usage."
            )),
            other => {
                pos.push(other.to_string());
                i += 1;
            }
        }
    }

    let (a, b) = two_names(&pos, "bacon winrate POLICY OPPONENT");
    let mut session = Session::new(&common.config);
    let start = start
        .map(|s| parse_start(&s, &session.rules))
        .unwrap_or_default();
    let pa = session.policy(&a);
    let pb = session.policy(&b);

    let mut eval = Evaluator::new(&session.pre);
    let w = eval.win_rate(&*pa, &*pb, plays_as, start);
    println!(
        "Win rate of {a} against {b} ({}): {w:.6}",
        plays_as_label(plays_as)
    );
}

fn cmd_sample(common: Common) {
    let mut plays_as = PlaysAs::Averaged;
    let mut start: Option<String> = None;
    let mut samples = common.config.sampling.samples;
    let mut seed = common.config.sampling.seed;
    let mut pos: Vec<String> = Vec::new();

    let args = &common.rest;
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"bacon sample

USAGE:
    bacon sample POLICY OPPONENT [--samples N] [--seed S] [--as SEAT] [--start S,O[,T]]

OPTIONS:
    --samples N     Games to play (default: sampling.samples)
    --seed S        Dice seed (default: sampling.seed)
    --as SEAT       first, second or averaged (default: averaged)
    --start S,O,T   Starting scores (POLICY's first) and turn counter
"#
                );
                return;
            }
            "--samples" => {
                samples = parse(value(args, i, "--samples"), "--samples");
                i += 2;
            }
            "--seed" => {
                seed = parse(value(args, i, "--seed"), "--seed");
                i += 2;
            }
            "--as" => {
                plays_as = parse_plays_as(value(args, i, "--as"));
                i += 2;
            }
            "--start" => {
                start = Some(value(args, i, "--start").to_string());
                i += 2;
            }
            other if other.starts_with("--") => die(format!(
                "Unknown option for `bacon sample`: {other}\nRun `bacon sample --help` for usage."
            )),
            other => {
                pos.push(other.to_string());
                i += 1;
            }
        }
    }

    let (a, b) = two_names(&pos, "bacon sample POLICY OPPONENT");
    let mut session = Session::new(&common.config);
    let start = start
        .map(|s| parse_start(&s, &session.rules))
        .unwrap_or_default();
    let pa = session.policy(&a);
    let pb = session.policy(&b);

    let t0 = Instant::now();
    let w = sampled_win_rate(&session.rules, &*pa, &*pb, plays_as, start, samples, seed)
        .unwrap_or_else(|e| die(e));
    println!(
        "Sampled win rate of {a} against {b} ({}, {samples} games): {w:.6}",
        plays_as_label(plays_as)
    );
    eprintln!("Sampled in {:.2}s", t0.elapsed().as_secs_f64());
}

fn cmd_tournament(common: Common) {
    let mut opts = TournamentOptions::from_config(&common.config.tournament);
    let mut pos: Vec<String> = Vec::new();

    let args = &common.rest;
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"bacon tournament

USAGE:
    bacon tournament [POLICY...] [--threads N] [--margin M] [--report-interval N]
                     [--time-limit SECS] [--log PATH]

Plays every pair of policies once with the exact averaged win rate. Without
POLICY arguments, all builtins plus `final` take part.

OPTIONS:
    --threads N           Worker threads (default: tournament.threads)
    --margin M            Win-rate margin for a decided game (default: tournament.margin)
    --report-interval N   Progress line every N comparisons (default: tournament.report_interval)
"#
                );
                return;
            }
            "--threads" => {
                opts.threads = parse(value(args, i, "--threads"), "--threads");
                i += 2;
            }
            "--margin" => {
                opts.margin = parse(value(args, i, "--margin"), "--margin");
                i += 2;
            }
            "--report-interval" => {
                opts.report_interval =
                    parse(value(args, i, "--report-interval"), "--report-interval");
                i += 2;
            }
            other if other.starts_with("--") => die(format!(
                "Unknown option for `bacon tournament`: {other}\nRun `bacon tournament --help` for usage."
            )),
            other => {
                pos.push(other.to_string());
                i += 1;
            }
        }
    }
    if opts.threads == 0 || opts.report_interval == 0 {
        die("--threads and --report-interval must be >= 1");
    }
    if !(0.5..1.0).contains(&opts.margin) {
        die(format!("--margin must be in [0.5, 1.0) (got {})", opts.margin));
    }

    let mut session = Session::new(&common.config);
    let names: Vec<String> = if pos.is_empty() {
        let mut all = builtin_names(&session.rules);
        all.push("final".to_string());
        all
    } else {
        pos
    };
    let mut roster = Roster::new();
    for name in &names {
        let p = session.policy(name);
        roster.add(name.clone(), p).unwrap_or_else(|e| die(e));
    }

    let log = RunLog::open(&common, "tournament");
    let interrupt = arm_interrupt(common.time_limit);

    println!(
        "Tournament: {} policies, {} comparisons, {} threads",
        roster.len(),
        roster.len() * roster.len().saturating_sub(1) / 2,
        opts.threads
    );
    let t0 = Instant::now();
    let progress = |played: usize, remaining: usize, leader_wins: u32, leader: &str| {
        println!(
            "{played} played, {remaining} remaining. Leader: {leader} with {leader_wins} wins"
        );
        if let Some(log) = &log {
            log.write(&TournamentProgressEventV1 {
                event: "tournament_progress",
                ts_ms: now_ms(),
                v: log.version(),
                run_id: log.run_id(),
                played: played as u64,
                remaining: remaining as u64,
                leader: leader.to_string(),
                leader_wins,
            });
        }
    };
    let report = round_robin(&session.pre, &roster, &opts, &interrupt, Some(&progress));

    println!();
    for s in &report.standings {
        println!("{}", s.render_line());
    }
    println!();
    println!(
        "Decided: {}, ties: {}, elapsed: {:.2}s",
        report.decided,
        report.ties,
        t0.elapsed().as_secs_f64()
    );
    if report.interrupted {
        println!(
            "Interrupted after {} of {} comparisons",
            report.completed, report.total_pairs
        );
    }

    if let Some(log) = log {
        for s in &report.standings {
            log.write(&TournamentStandingEventV1 {
                event: "tournament_standing",
                ts_ms: now_ms(),
                v: log.version(),
                run_id: log.run_id(),
                rank: s.rank as u32,
                name: s.name.clone(),
                wins: s.wins,
            });
        }
        log.finish(|m| {
            m.tournament_pairs_completed = report.completed as u64;
            m.tournament_pairs_total = report.total_pairs as u64;
            m.interrupted = report.interrupted;
        });
    }
}

/// Prints a line every `announce_interval` rounds and logs every round.
struct LearnPrinter<'a> {
    announce_interval: u64,
    out: &'a Path,
    log: Option<&'a RunLog>,
}

impl LearnProgress for LearnPrinter<'_> {
    fn on_round(&mut self, r: &LearnRound) {
        if r.round % self.announce_interval == 0 || r.round == r.rounds {
            println!(
                "Round {}/{}: ({}, {}) -> {} dice, win rate {:.6}",
                r.round, r.rounds, r.focus.0, r.focus.1, r.rolls, r.win_rate
            );
        }
        if let Some(log) = self.log {
            log.write(&LearnRoundEventV1 {
                event: "learn_round",
                ts_ms: now_ms(),
                v: log.version(),
                run_id: log.run_id(),
                round: r.round,
                rounds: r.rounds,
                score: r.focus.0,
                oppo_score: r.focus.1,
                rolls: r.rolls,
                win_rate: r.win_rate,
            });
        }
    }

    fn on_checkpoint(&mut self, round: u64) {
        println!("Saved {} after round {round}", self.out.display());
    }
}

fn cmd_learn(common: Common) {
    let mut from = "final".to_string();
    let mut opponent = "default".to_string();
    let mut rounds: Option<u64> = None;
    let mut focus: Option<(u32, u32)> = None;
    let mut out: Option<PathBuf> = None;

    let args = &common.rest;
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"bacon learn

USAGE:
    bacon learn --out PATH [--from POLICY] [--opponent POLICY] [--rounds N] [--focus S,O]
                [--time-limit SECS] [--log PATH]

Improves one cell per round against a fixed opponent, keeping a change only if the
averaged win rate strictly improves. The table is saved every learn.win_rate_interval
rounds and at the end.

OPTIONS:
    --out PATH          Table file to write (required)
    --from POLICY       Starting policy (default: final)
    --opponent POLICY   Fixed opponent (default: default)
    --rounds N          Rounds to run (default: learn.rounds, or goal*goal)
    --focus S,O         First cell to improve (default: goal-1,goal-1)
"#
                );
                return;
            }
            "--out" => {
                out = Some(PathBuf::from(value(args, i, "--out")));
                i += 2;
            }
            "--from" => {
                from = value(args, i, "--from").to_string();
                i += 2;
            }
            "--opponent" => {
                opponent = value(args, i, "--opponent").to_string();
                i += 2;
            }
            "--rounds" => {
                rounds = Some(parse(value(args, i, "--rounds"), "--rounds"));
                i += 2;
            }
            "--focus" => {
                let s = value(args, i, "--focus");
                let parts: Vec<u32> = s.split(',').map(|p| parse(p.trim(), "--focus")).collect();
                match parts.as_slice() {
                    [a, b] => focus = Some((*a, *b)),
                    _ => die(format!("Invalid --focus value: {s} (expected S,O)")),
                }
                i += 2;
            }
            other => die(format!(
                "Unknown option for `bacon learn`: {other}\nRun `bacon learn --help` for usage."
            )),
        }
    }
    let out = out.unwrap_or_else(|| die("Missing required --out PATH"));

    let mut session = Session::new(&common.config);
    if let Some((s, o)) = focus {
        check_scores(s, o, &session.rules);
    }
    let mut table = session.table(&from);
    let opp = session.policy(&opponent);
    let learn_cfg = &common.config.learn;
    let opts = LearnOptions {
        rounds: rounds.unwrap_or_else(|| learn_cfg.rounds_for(&session.rules)),
        focus,
        checkpoint_interval: learn_cfg.win_rate_interval,
        checkpoint: Some(out.clone()),
    };

    let log = RunLog::open(&common, "learn");
    let interrupt = arm_interrupt(common.time_limit);
    let mut printer = LearnPrinter {
        announce_interval: learn_cfg.announce_interval.max(1),
        out: &out,
        log: log.as_ref(),
    };

    println!(
        "Learning from {from} against {opponent}: {} rounds",
        opts.rounds
    );
    let report = Improver::new(&session.pre)
        .learn(&mut table, &*opp, &opts, &interrupt, Some(&mut printer))
        .unwrap_or_else(|e| die(format!("Learning failed: {e}")));

    println!(
        "Win rate: {:.6} -> {:.6} after {} rounds",
        report.initial_win_rate, report.final_win_rate, report.rounds_completed
    );
    println!("Next focus: {},{}", report.next_focus.0, report.next_focus.1);
    if report.interrupted {
        println!("Stopped early by the time limit");
    }
    println!("Wrote {}", out.display());

    if let Some(log) = log {
        let out_path = out.display().to_string();
        log.finish(|m| {
            m.output_path = Some(out_path);
            m.learn_rounds_completed = report.rounds_completed;
            m.final_win_rate = Some(report.final_win_rate);
            m.interrupted = report.interrupted;
        });
    }
}

fn cmd_play(common: Common) {
    let mut seed = common.config.sampling.seed;
    let mut start: Option<String> = None;
    let mut pos: Vec<String> = Vec::new();

    let args = &common.rest;
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"bacon play

USAGE:
    bacon play PLAYER0 PLAYER1 [--seed S] [--start S0,S1[,T]]

OPTIONS:
    --seed S         Dice seed (default: sampling.seed)
    --start S0,S1,T  Starting scores and turn counter (default: 0,0,0)
"#
                );
                return;
            }
            "--seed" => {
                seed = parse(value(args, i, "--seed"), "--seed");
                i += 2;
            }
            "--start" => {
                start = Some(value(args, i, "--start").to_string());
                i += 2;
            }
            other if other.starts_with("--") => die(format!(
                "Unknown option for `bacon play`: {other}\nRun `bacon play --help` for usage."
            )),
            other => {
                pos.push(other.to_string());
                i += 1;
            }
        }
    }

    let (a, b) = two_names(&pos, "bacon play PLAYER0 PLAYER1");
    let mut session = Session::new(&common.config);
    let start = start
        .map(|s| parse_start(&s, &session.rules))
        .unwrap_or_default();
    let p0 = Announced::new(session.policy(&a), 0, io::stdout());
    let p1 = Announced::new(session.policy(&b), 1, io::stdout());
    let mut dice = FairDice::new(session.rules.dice_sides, seed);

    let scores = play(&p0, &p1, start, &session.rules, &mut dice);
    let winner = if scores.winner() == 0 { &a } else { &b };
    println!("Final score: {}-{}", scores.score0, scores.score1);
    println!("Player {} ({winner}) wins", scores.winner());
}

fn cmd_get(common: Common) {
    let args = &common.rest;
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!(
            r#"bacon get

USAGE:
    bacon get POLICY SCORE OPPONENT_SCORE
"#
        );
        return;
    }
    let [name, score, oppo] = args.as_slice() else {
        die("Usage: bacon get POLICY SCORE OPPONENT_SCORE");
    };
    let mut session = Session::new(&common.config);
    let score: u32 = parse(score, "SCORE");
    let oppo: u32 = parse(oppo, "OPPONENT_SCORE");
    check_scores(score, oppo, &session.rules);
    let p = session.policy(name);
    println!("{}", p.choose(score, oppo));
}

fn cmd_diff(common: Common) {
    let args = &common.rest;
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!(
            r#"bacon diff

USAGE:
    bacon diff POLICY_A POLICY_B

Lists every (score, opponent score) cell where the two policies choose differently.
"#
        );
        return;
    }
    let (a, b) = two_names(args, "bacon diff POLICY_A POLICY_B");
    let mut session = Session::new(&common.config);
    let ta = session.table(&a);
    let tb = session.table(&b);
    let diffs = ta.diff(&tb).unwrap_or_else(|e| die(e));

    let stdout = io::stdout();
    let mut w = stdout.lock();
    for d in &diffs {
        // Write errors (closed pipe) end the listing early.
        if writeln!(w, "({}, {}): {} vs {}", d.score, d.oppo_score, d.left, d.right).is_err() {
            return;
        }
    }
    let _ = writeln!(
        w,
        "{} of {} cells differ",
        diffs.len(),
        session.rules.cells()
    );
}

fn cmd_graph(common: Common) {
    let mut against: Option<String> = None;
    let mut pos: Vec<String> = Vec::new();

    let args = &common.rest;
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"bacon graph

USAGE:
    bacon graph POLICY [--against OTHER]

Draws the roll count at every score pair. With --against, draws |POLICY - OTHER|.
"#
                );
                return;
            }
            "--against" => {
                against = Some(value(args, i, "--against").to_string());
                i += 2;
            }
            other if other.starts_with("--") => die(format!(
                "Unknown option for `bacon graph`: {other}\nRun `bacon graph --help` for usage."
            )),
            other => {
                pos.push(other.to_string());
                i += 1;
            }
        }
    }
    let [name] = pos.as_slice() else {
        die("Usage: bacon graph POLICY [--against OTHER]");
    };

    let mut session = Session::new(&common.config);
    let table = session.table(name);
    let drawn = match &against {
        Some(other) => {
            let t = session.table(other);
            table.abs_diff(&t).unwrap_or_else(|e| die(e))
        }
        None => table,
    };
    print!("{}", drawn.render_diagram());
}

fn cmd_export(common: Common) {
    let mut out: Option<PathBuf> = None;
    let mut dense = false;
    let mut pos: Vec<String> = Vec::new();

    let args = &common.rest;
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"bacon export

USAGE:
    bacon export POLICY [--out PATH] [--dense]

OPTIONS:
    --out PATH   Write to PATH instead of stdout
    --dense      Write the dense table format instead of a lookup expression
"#
                );
                return;
            }
            "--out" => {
                out = Some(PathBuf::from(value(args, i, "--out")));
                i += 2;
            }
            "--dense" => {
                dense = true;
                i += 1;
            }
            other if other.starts_with("--") => die(format!(
                "Unknown option for `bacon export`: {other}\nRun `bacon export --help` for usage."
            )),
            other => {
                pos.push(other.to_string());
                i += 1;
            }
        }
    }
    let [name] = pos.as_slice() else {
        die("Usage: bacon export POLICY [--out PATH] [--dense]");
    };

    let mut session = Session::new(&common.config);
    let table = session.table(name);
    let w: Box<dyn Write> = match &out {
        Some(path) => Box::new(io::BufWriter::new(fs::File::create(path).unwrap_or_else(
            |e| die(format!("Failed to create {}: {e}", path.display())),
        ))),
        None => Box::new(io::stdout().lock()),
    };
    let res = if dense {
        table.write_dense(w).map_err(|e| e.to_string())
    } else {
        table.write_lookup_expr(w).map_err(|e| e.to_string())
    };
    res.unwrap_or_else(|e| die(format!("Failed to write table: {e}")));
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        process::exit(0);
    }

    let cmd = args[1].as_str();
    let common = || split_common(&args[2..]);
    match cmd {
        "-h" | "--help" | "help" => print_help(),
        "-V" | "--version" => print_version(),
        "final" => cmd_final(common()),
        "winrate" => cmd_winrate(common()),
        "sample" => cmd_sample(common()),
        "tournament" => cmd_tournament(common()),
        "learn" => cmd_learn(common()),
        "play" => cmd_play(common()),
        "get" => cmd_get(common()),
        "diff" => cmd_diff(common()),
        "graph" => cmd_graph(common()),
        "export" => cmd_export(common()),
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!("Run `bacon --help` for usage.");
            process::exit(1);
        }
    }
}
