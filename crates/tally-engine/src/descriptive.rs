//! Missing-aware descriptive statistics and frequency tables.
//!
//! `describe` partitions a column into present and absent values (absent =
//! null, NaN, or infinite) and computes every statistic over the present
//! values only. An all-absent column yields a result with every statistic
//! absent rather than an error.

use serde::{Deserialize, Serialize};

use tally_core::Value;

/// Summary statistics for one numeric column.
///
/// `n` counts the full column including absent values; `missing` counts the
/// absent ones. Every other field is `None` (or empty, for `modes`) when no
/// present values remain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Describe {
    pub n: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Every tied mode, in first-seen order — multimodal columns return all
    /// of them, not an arbitrary pick.
    pub modes: Vec<f64>,
    pub stdev: Option<f64>,
    pub variance: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub range: Option<f64>,
    pub q1: Option<f64>,
    pub q2: Option<f64>,
    pub q3: Option<f64>,
    pub iqr: Option<f64>,
}

impl Describe {
    fn all_absent(total: usize) -> Self {
        Self {
            n: total,
            missing: total,
            mean: None,
            median: None,
            modes: Vec::new(),
            stdev: None,
            variance: None,
            min: None,
            max: None,
            range: None,
            q1: None,
            q2: None,
            q3: None,
            iqr: None,
        }
    }
}

/// One bucket of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
}

/// Compute descriptive statistics for a column, treating `None`, NaN, and
/// infinite entries as missing. Never fails: an all-missing column returns
/// a result with `missing == n` and every statistic absent.
#[must_use]
pub fn describe(data: &[Option<f64>]) -> Describe {
    let total = data.len();
    let clean: Vec<f64> = data
        .iter()
        .filter_map(|v| v.filter(|x| x.is_finite()))
        .collect();

    if clean.is_empty() {
        return Describe::all_absent(total);
    }

    let n = clean.len();
    #[allow(clippy::cast_precision_loss)]
    let mean = clean.iter().sum::<f64>() / n as f64;

    let mut sorted = clean.clone();
    sorted.sort_by(f64::total_cmp);
    let median = median_of_sorted(&sorted);

    let variance = if n > 1 {
        #[allow(clippy::cast_precision_loss)]
        let v = clean.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        v
    } else {
        0.0
    };

    let min = sorted[0];
    let max = sorted[n - 1];
    let (q1, q2, q3) = quartiles_of_sorted(&sorted);

    Describe {
        n: total,
        missing: total - n,
        mean: Some(mean),
        median: Some(median),
        modes: multimode(&clean),
        stdev: Some(variance.sqrt()),
        variance: Some(variance),
        min: Some(min),
        max: Some(max),
        range: Some(max - min),
        q1: Some(q1),
        q2: Some(q2),
        q3: Some(q3),
        iqr: Some(q3 - q1),
    }
}

/// Count occurrences of each distinct display label, in first-seen order.
/// Absent values land in the literal `"Missing"` bucket.
#[must_use]
pub fn frequency_table(values: &[Value]) -> Vec<FrequencyEntry> {
    let mut entries: Vec<FrequencyEntry> = Vec::new();
    for value in values {
        let label = value.label();
        match entries.iter_mut().find(|e| e.value == label) {
            Some(entry) => entry.count += 1,
            None => entries.push(FrequencyEntry {
                value: label,
                count: 1,
            }),
        }
    }
    entries
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        f64::midpoint(sorted[n / 2 - 1], sorted[n / 2])
    }
}

/// Quartiles by the "exclusive" linear-interpolation method (positions at
/// `i*(n+1)/4`, interpolation index clamped into the data range). A single
/// observation degenerates to Q1 = Q2 = Q3 = the value.
fn quartiles_of_sorted(sorted: &[f64]) -> (f64, f64, f64) {
    let n = sorted.len();
    if n == 1 {
        return (sorted[0], sorted[0], sorted[0]);
    }
    let m = n + 1;
    let mut qs = [0.0; 3];
    for (slot, i) in (1..=3_usize).enumerate() {
        let j = (i * m / 4).clamp(1, n - 1);
        #[allow(clippy::cast_precision_loss)]
        let delta = (i * m) as f64 - (j * 4) as f64;
        qs[slot] = (sorted[j - 1] * (4.0 - delta) + sorted[j] * delta) / 4.0;
    }
    (qs[0], qs[1], qs[2])
}

/// All values sharing the maximum occurrence count, in first-seen order.
fn multimode(values: &[f64]) -> Vec<f64> {
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for &v in values {
        match counts.iter_mut().find(|(seen, _)| *seen == v) {
            Some((_, count)) => *count += 1,
            None => counts.push((v, 1)),
        }
    }
    let best = counts.iter().map(|&(_, c)| c).max().unwrap_or(0);
    counts
        .into_iter()
        .filter(|&(_, c)| c == best)
        .map(|(v, _)| v)
        .collect()
}
