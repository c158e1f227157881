//! Roll-outcome distribution: how many dice sequences end a turn with each score.
//!
//! For `r` dice the turn score is 1 when any die shows a 1 (Pig Out), else the sum of the
//! faces, so the achievable scores are `1` and `2r..=sides*r`.

use bacon_core::GameRules;

use crate::OracleError;

/// `P(r dice score 1)` enters [`OutcomeTable::avg_prob`] divided by this.
pub const PIG_OUT_DIVISOR: f64 = 8.0;
/// Every other `P(r dice score s)` enters [`OutcomeTable::avg_prob`] divided by this.
pub const SUM_DIVISOR: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct OutcomeTable {
    sides: u32,
    max_rolls: u32,
    /// `sides^r`
    total: Vec<u64>,
    /// `[r][s]`, `s` in `0..=sides*max_rolls`
    counts: Vec<Vec<u64>>,
    probs: Vec<Vec<f64>>,
    avg: Vec<f64>,
}

impl OutcomeTable {
    pub fn new(rules: &GameRules) -> Result<Self, OracleError> {
        rules.validate()?;
        let sides = rules.dice_sides;
        let max_rolls = rules.max_rolls;
        let width = (sides * max_rolls + 1) as usize;

        let mut total = vec![1u64; max_rolls as usize + 1];
        let mut counts = vec![vec![0u64; width]; max_rolls as usize + 1];
        let mut probs = vec![vec![0.0f64; width]; max_rolls as usize + 1];
        let mut avg = vec![0.0f64; width];

        counts[0][0] = 1;
        probs[0][0] = 1.0;

        for r in 1..=max_rolls {
            let ri = r as usize;
            total[ri] = total[ri - 1] * sides as u64;
            let expected = total[ri];

            let pig_out = pig_out_count(sides, r)?;
            counts[ri][1] = pig_out;
            probs[ri][1] = pig_out as f64 / expected as f64;
            avg[1] += probs[ri][1] / PIG_OUT_DIVISOR;
            let mut counted = pig_out;

            // Sums without a 1: each new die adds 2..=sides to an (r-1)-dice sum, so the count
            // is a sliding window over the previous row. Only indices >= 2(r-1) are real sums;
            // index 1 of the previous row is Pig Out and never extends.
            let low = 2 * (ri - 1);
            let s = sides as usize;
            let mut window = 0u64;
            for j in 2 * ri..=s * ri {
                window += counts[ri - 1][j - 2];
                if j > low + s {
                    window -= counts[ri - 1][j - s - 1];
                }
                counts[ri][j] = window;
                counted += window;
                probs[ri][j] = window as f64 / expected as f64;
                avg[j] += probs[ri][j] / SUM_DIVISOR;
            }

            if counted != expected {
                return Err(OracleError::InconsistentOutcomes {
                    rolls: r,
                    counted,
                    expected,
                });
            }
        }

        Ok(Self {
            sides,
            max_rolls,
            total,
            counts,
            probs,
            avg,
        })
    }

    pub fn sides(&self) -> u32 {
        self.sides
    }

    pub fn max_rolls(&self) -> u32 {
        self.max_rolls
    }

    /// Largest achievable turn score from dice.
    pub fn max_sum(&self) -> u32 {
        self.sides * self.max_rolls
    }

    pub fn total(&self, rolls: u32) -> u64 {
        self.total[rolls as usize]
    }

    pub fn count(&self, rolls: u32, sum: u32) -> u64 {
        self.counts[rolls as usize]
            .get(sum as usize)
            .copied()
            .unwrap_or(0)
    }

    pub fn prob(&self, rolls: u32, sum: u32) -> f64 {
        self.probs[rolls as usize]
            .get(sum as usize)
            .copied()
            .unwrap_or(0.0)
    }

    /// Weighted average of `prob(r, sum)` over `r = 1..=max_rolls`.
    pub fn avg_prob(&self, sum: u32) -> f64 {
        self.avg.get(sum as usize).copied().unwrap_or(0.0)
    }

    /// Achievable `(sum, count)` pairs for `rolls >= 1` dice: Pig Out first, then ascending sums.
    /// Empty for zero dice.
    pub fn outcomes(&self, rolls: u32) -> impl Iterator<Item = (u32, u64)> + '_ {
        let row = &self.counts[rolls as usize];
        let sums = if rolls == 0 {
            1..1
        } else {
            2 * rolls..self.sides * rolls + 1
        };
        let pig_out = (rolls > 0).then_some((1, row[1]));
        pig_out
            .into_iter()
            .chain(sums.map(move |s| (s, row[s as usize])))
    }
}

/// Sequences of `rolls` dice containing at least one 1: `sum_{m<rolls} C(rolls, m) (sides-1)^m`,
/// where `m` is the number of dice that are not 1.
fn pig_out_count(sides: u32, rolls: u32) -> Result<u64, OracleError> {
    let mut sum: u128 = 0;
    let mut choose: u128 = 1;
    let mut pow: u128 = 1;
    for m in 0..rolls as u128 {
        sum += choose * pow;
        pow *= (sides - 1) as u128;
        choose = choose * (rolls as u128 - m) / (m + 1);
    }
    u64::try_from(sum)
        .map_err(|_| OracleError::Rules(bacon_core::RulesError::OutcomeOverflow { sides, rolls }))
}
