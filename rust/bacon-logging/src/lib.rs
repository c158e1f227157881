//! bacon-logging: NDJSON event logs + run manifests for long-running analyses.
//!
//! Append-only NDJSON so a killed tournament or learning run leaves a readable prefix.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run manifest schema version.
pub const RUN_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifestV1 {
    pub run_manifest_version: u32,

    pub run_id: String,
    pub created_ts_ms: u64,
    pub finished_ts_ms: Option<u64>,

    /// CLI subcommand that produced the run ("tournament", "learn", ...).
    pub command: String,
    pub ruleset_id: String,

    // Hashes for reproducibility.
    pub git_hash: Option<String>,
    pub config_hash: Option<String>,

    pub events_path: String,
    /// Table written by the run, if any.
    pub output_path: Option<String>,

    // Counters.
    pub tournament_pairs_completed: u64,
    pub tournament_pairs_total: u64,
    pub learn_rounds_completed: u64,

    pub final_win_rate: Option<f64>,
    pub interrupted: bool,
}

impl RunManifestV1 {
    pub fn new(run_id: impl Into<String>, command: &str, ruleset_id: String) -> Self {
        Self {
            run_manifest_version: RUN_MANIFEST_VERSION,
            run_id: run_id.into(),
            created_ts_ms: now_ms(),
            finished_ts_ms: None,
            command: command.to_string(),
            ruleset_id,
            git_hash: None,
            config_hash: None,
            events_path: String::new(),
            output_path: None,
            tournament_pairs_completed: 0,
            tournament_pairs_total: 0,
            learn_rounds_completed: 0,
            final_win_rate: None,
            interrupted: false,
        }
    }
}

/// Manifest path that sits next to an events log: `run.ndjson` -> `run.manifest.json`.
pub fn manifest_path_for(events: &Path) -> PathBuf {
    events.with_extension("manifest.json")
}

pub fn now_ms() -> u64 {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    d.as_millis() as u64
}

pub fn hash_config_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

pub fn try_git_hash() -> Option<String> {
    use std::process::Command;

    let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8(out.stdout).ok()?;
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

pub fn read_manifest(path: impl AsRef<Path>) -> Result<RunManifestV1, NdjsonError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice::<RunManifestV1>(&bytes)?)
}

pub fn write_manifest_atomic(path: impl AsRef<Path>, m: &RunManifestV1) -> Result<(), NdjsonError> {
    let path = path.as_ref();
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(m)?;
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Fields shared by every event.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfoV1 {
    pub ruleset_id: String,
    pub crate_version: &'static str,
}

impl VersionInfoV1 {
    pub fn new(ruleset_id: String) -> Self {
        Self {
            ruleset_id,
            crate_version: VERSION,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TournamentProgressEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub run_id: String,
    pub played: u64,
    pub remaining: u64,
    pub leader: String,
    pub leader_wins: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TournamentStandingEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub run_id: String,
    pub rank: u32,
    pub name: String,
    pub wins: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LearnRoundEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub run_id: String,
    pub round: u64,
    pub rounds: u64,
    pub score: u32,
    pub oppo_score: u32,
    pub rolls: u32,
    pub win_rate: f64,
}

#[derive(Debug)]
pub enum NdjsonError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for NdjsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "event log I/O failed: {e}"),
            Self::Json(e) => write!(f, "event encoding failed: {e}"),
        }
    }
}

impl std::error::Error for NdjsonError {}

impl From<io::Error> for NdjsonError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for NdjsonError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append. Creates it if it doesn't exist.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, NdjsonError> {
        Self::open_append_with_flush(path, 0)
    }

    /// `flush_every_lines=0` disables periodic flushing.
    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, NdjsonError> {
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}
