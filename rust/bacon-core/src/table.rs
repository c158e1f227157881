//! Dense `goal x goal` policy table and its text formats.
//!
//! Dense format: `goal` lines of `goal` whitespace-separated roll counts, row-major,
//! one row per mover score. The lookup-expression export is write-only.

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::policy::Policy;
use crate::rules::GameRules;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("bad roll count {token:?} at cell {index}")]
    Parse { index: usize, token: String },
    #[error("table has {got} cells, expected {expected}")]
    WrongSize { expected: usize, got: usize },
    #[error("roll count {rolls} at ({score}, {oppo_score}) exceeds max_rolls {max_rolls}")]
    RollOutOfRange {
        score: u32,
        oppo_score: u32,
        rolls: u32,
        max_rolls: u32,
    },
    #[error("tables have different goals ({left} vs {right})")]
    GoalMismatch { left: u32, right: u32 },
}

/// One cell where two tables disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDiff {
    pub score: u32,
    pub oppo_score: u32,
    pub left: u32,
    pub right: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    goal: u32,
    max_rolls: u32,
    rolls: Vec<u8>,
}

impl PolicyTable {
    /// Table that rolls zero everywhere.
    pub fn new(rules: &GameRules) -> Self {
        Self {
            goal: rules.goal,
            max_rolls: rules.max_rolls,
            rolls: vec![0; rules.cells()],
        }
    }

    /// Tabulate `policy` at every score pair.
    pub fn from_policy(rules: &GameRules, policy: &dyn Policy) -> Result<Self, TableError> {
        let mut t = Self::new(rules);
        for score in 0..rules.goal {
            for oppo_score in 0..rules.goal {
                t.set(score, oppo_score, policy.choose(score, oppo_score))?;
            }
        }
        Ok(t)
    }

    pub fn goal(&self) -> u32 {
        self.goal
    }

    pub fn max_rolls(&self) -> u32 {
        self.max_rolls
    }

    #[inline]
    fn index(&self, score: u32, oppo_score: u32) -> usize {
        debug_assert!(score < self.goal && oppo_score < self.goal);
        (score as usize) * (self.goal as usize) + oppo_score as usize
    }

    #[inline]
    pub fn get(&self, score: u32, oppo_score: u32) -> u32 {
        self.rolls[self.index(score, oppo_score)] as u32
    }

    pub fn set(&mut self, score: u32, oppo_score: u32, rolls: u32) -> Result<(), TableError> {
        if rolls > self.max_rolls {
            return Err(TableError::RollOutOfRange {
                score,
                oppo_score,
                rolls,
                max_rolls: self.max_rolls,
            });
        }
        let idx = self.index(score, oppo_score);
        self.rolls[idx] = rolls as u8;
        Ok(())
    }

    pub fn write_dense<W: Write>(&self, mut w: W) -> io::Result<()> {
        for row in self.rolls.chunks(self.goal as usize) {
            for r in row {
                write!(w, "{r} ")?;
            }
            writeln!(w)?;
        }
        w.flush()
    }

    pub fn read_dense<R: Read>(rules: &GameRules, mut r: R) -> Result<Self, TableError> {
        let mut text = String::new();
        r.read_to_string(&mut text)?;

        let mut t = Self::new(rules);
        let expected = rules.cells();
        let mut count = 0usize;
        for (index, token) in text.split_whitespace().enumerate() {
            if index >= expected {
                return Err(TableError::WrongSize {
                    expected,
                    got: text.split_whitespace().count(),
                });
            }
            let rolls: u32 = token.parse().map_err(|_| TableError::Parse {
                index,
                token: token.to_string(),
            })?;
            let g = rules.goal;
            t.set(index as u32 / g, index as u32 % g, rolls)?;
            count += 1;
        }
        if count != expected {
            return Err(TableError::WrongSize {
                expected,
                got: count,
            });
        }
        Ok(t)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TableError> {
        let f = fs::File::create(path)?;
        self.write_dense(BufWriter::new(f))?;
        Ok(())
    }

    pub fn load(rules: &GameRules, path: impl AsRef<Path>) -> Result<Self, TableError> {
        let f = fs::File::open(path)?;
        Self::read_dense(rules, f)
    }

    /// One-line lookup expression: a nested array literal indexed `[score][opponent_score]`.
    pub fn write_lookup_expr<W: Write>(&self, mut w: W) -> io::Result<()> {
        write!(w, "def strategy(score, opponent_score):\n    return [")?;
        for (i, row) in self.rolls.chunks(self.goal as usize).enumerate() {
            if i > 0 {
                write!(w, ",")?;
            }
            write!(w, "[")?;
            for (j, r) in row.iter().enumerate() {
                if j > 0 {
                    write!(w, ",")?;
                }
                write!(w, "{r}")?;
            }
            write!(w, "]")?;
        }
        writeln!(w, "][score][opponent_score]")?;
        w.flush()
    }

    /// Cells where `self` and `other` disagree, in row-major order.
    pub fn diff(&self, other: &PolicyTable) -> Result<Vec<CellDiff>, TableError> {
        if self.goal != other.goal {
            return Err(TableError::GoalMismatch {
                left: self.goal,
                right: other.goal,
            });
        }
        let g = self.goal;
        Ok(self
            .rolls
            .iter()
            .zip(&other.rolls)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, (&a, &b))| CellDiff {
                score: i as u32 / g,
                oppo_score: i as u32 % g,
                left: a as u32,
                right: b as u32,
            })
            .collect())
    }

    /// Cell-wise `|self - other|`, for drawing where two tables disagree.
    pub fn abs_diff(&self, other: &PolicyTable) -> Result<PolicyTable, TableError> {
        if self.goal != other.goal {
            return Err(TableError::GoalMismatch {
                left: self.goal,
                right: other.goal,
            });
        }
        Ok(PolicyTable {
            goal: self.goal,
            max_rolls: self.max_rolls.max(other.max_rolls),
            rolls: self
                .rolls
                .iter()
                .zip(&other.rolls)
                .map(|(&a, &b)| a.abs_diff(b))
                .collect(),
        })
    }

    /// Text heat-map. Y is the mover's score (top row highest), X the opponent's score.
    /// Each line averages two adjacent score rows.
    pub fn render_diagram(&self) -> String {
        const SHADES: [char; 6] = [' ', ':', '|', '%', '\u{2593}', '\u{2588}'];
        let g = self.goal;
        let max = self.max_rolls.max(1);
        let level = |rolls: u32| -> char {
            if rolls == 0 {
                SHADES[0]
            } else {
                let i = 1 + ((rolls - 1) * 5 / max) as usize;
                SHADES[i.min(SHADES.len() - 1)]
            }
        };

        let mut out =
            String::from("Y-axis is player score, X-axis is opponent score. Bottom left is 0, 0.\n\n");
        for lo in (0..g).step_by(2).rev() {
            let hi = if lo + 1 < g { lo + 1 } else { lo };
            out.push('[');
            for j in 0..g {
                out.push(level((self.get(lo, j) + self.get(hi, j)) / 2));
            }
            out.push_str("]\n");
        }

        out.push_str("\nLEGEND:");
        for (i, c) in SHADES.iter().enumerate() {
            let (from, to) = bucket_bounds(i, max);
            if from > to {
                continue;
            }
            if from == to {
                out.push_str(&format!("  [{c}{c}] = {from}"));
            } else {
                out.push_str(&format!("  [{c}{c}] = {from}-{to}"));
            }
        }
        out.push('\n');
        out
    }
}

/// Inclusive roll range drawn with shade `i`.
fn bucket_bounds(i: usize, max: u32) -> (u32, u32) {
    if i == 0 {
        return (0, 0);
    }
    let in_bucket = |r: u32| 1 + ((r - 1) * 5 / max) as usize == i;
    let mut from = u32::MAX;
    let mut to = 0;
    for r in 1..=max {
        if in_bucket(r) {
            from = from.min(r);
            to = to.max(r);
        }
    }
    (from, to)
}

impl Policy for PolicyTable {
    #[inline]
    fn choose(&self, score: u32, oppo_score: u32) -> u32 {
        self.get(score, oppo_score)
    }
}
