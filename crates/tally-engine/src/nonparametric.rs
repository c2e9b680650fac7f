//! Rank-based and exact nonparametric tests.
//!
//! Mann-Whitney and Wilcoxon report a two-sided p-value from the
//! large-sample normal approximation (and say so in their note field);
//! Fisher's 2×2 test is exact, summing hypergeometric probabilities over
//! every table consistent with the observed marginals.

use libm::erf;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::rank::rank_with_ties;

const APPROX_NOTE: &str = "P-value is based on a normal distribution approximation.";

/// Result of the Mann-Whitney U test for two independent samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MannWhitneyU {
    pub u_statistic: f64,
    pub n1: usize,
    pub n2: usize,
    /// Rank-biserial correlation effect size, `1 - 2U/(n1*n2)`.
    pub rank_biserial: f64,
    pub p_value_approx: f64,
    pub note: String,
}

/// Result of the Wilcoxon signed-rank test for paired samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WilcoxonSignedRank {
    pub w_statistic: f64,
    /// Pairs remaining after zero differences are dropped.
    pub n_pairs: usize,
    pub sum_ranks_positive: f64,
    pub sum_ranks_negative: f64,
    pub p_value_approx: f64,
    pub note: String,
}

/// Result of Fisher's exact test on a 2×2 contingency table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FisherExact {
    pub p_value: f64,
    pub note: String,
}

/// Mann-Whitney U test for two independent samples.
///
/// Ranks the pooled samples with mid-rank tie handling, derives
/// `U1 = R1 - n1(n1+1)/2`, `U2 = n1*n2 - U1`, and reports `U = min(U1, U2)`.
///
/// # Errors
///
/// Returns [`EngineError::EmptySample`] if either sample is empty.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<MannWhitneyU, EngineError> {
    let (n1, n2) = (x.len(), y.len());
    if n1 == 0 || n2 == 0 {
        return Err(EngineError::EmptySample);
    }

    let combined: Vec<f64> = x.iter().chain(y).copied().collect();
    let ranks = rank_with_ties(&combined);
    let rank_sum_x: f64 = ranks[..n1].iter().sum();

    #[allow(clippy::cast_precision_loss)]
    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let u1 = rank_sum_x - n1f * (n1f + 1.0) / 2.0;
    let u2 = n1f * n2f - u1;
    let u = u1.min(u2);

    let rank_biserial = 1.0 - 2.0 * u / (n1f * n2f);

    let mean_u = n1f * n2f / 2.0;
    let std_u = (n1f * n2f * (n1f + n2f + 1.0) / 12.0).sqrt();

    Ok(MannWhitneyU {
        u_statistic: u,
        n1,
        n2,
        rank_biserial,
        p_value_approx: normal_approx_p(u, mean_u, std_u),
        note: APPROX_NOTE.to_string(),
    })
}

/// Wilcoxon signed-rank test for two related, paired samples.
///
/// Pairs with zero difference are dropped; if every pair is identical the
/// result degenerates to `W = 0`, `p = 1.0` without error.
///
/// # Errors
///
/// Returns [`EngineError::LengthMismatch`] if the samples differ in length.
pub fn wilcoxon_signed_rank(x: &[f64], y: &[f64]) -> Result<WilcoxonSignedRank, EngineError> {
    if x.len() != y.len() {
        return Err(EngineError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }

    #[allow(clippy::float_cmp)]
    let diffs: Vec<f64> = x
        .iter()
        .zip(y)
        .filter(|(xi, yi)| xi != yi)
        .map(|(xi, yi)| xi - yi)
        .collect();

    if diffs.is_empty() {
        return Ok(WilcoxonSignedRank {
            w_statistic: 0.0,
            n_pairs: 0,
            sum_ranks_positive: 0.0,
            sum_ranks_negative: 0.0,
            p_value_approx: 1.0,
            note: "All pairs were identical.".to_string(),
        });
    }

    let abs_diffs: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    let ranks = rank_with_ties(&abs_diffs);

    let w_plus: f64 = diffs
        .iter()
        .zip(&ranks)
        .filter(|(d, _)| **d > 0.0)
        .map(|(_, r)| r)
        .sum();
    let w_minus: f64 = diffs
        .iter()
        .zip(&ranks)
        .filter(|(d, _)| **d < 0.0)
        .map(|(_, r)| r)
        .sum();
    let w = w_plus.min(w_minus);

    #[allow(clippy::cast_precision_loss)]
    let n = diffs.len() as f64;
    let mean_w = n * (n + 1.0) / 4.0;
    let std_w = (n * (n + 1.0) * (2.0 * n + 1.0) / 24.0).sqrt();

    Ok(WilcoxonSignedRank {
        w_statistic: w,
        n_pairs: diffs.len(),
        sum_ranks_positive: w_plus,
        sum_ranks_negative: w_minus,
        p_value_approx: normal_approx_p(w, mean_w, std_w),
        note: APPROX_NOTE.to_string(),
    })
}

/// Fisher's exact test on a 2×2 contingency table, two-sided.
///
/// Enumerates every table sharing the observed row and column marginals,
/// summing the hypergeometric probability of each table at least as extreme
/// (probability ≤ the observed table's) as the one observed.
#[must_use]
pub fn fisher_exact_2x2(table: &[[u64; 2]; 2]) -> FisherExact {
    let [[a, b], [c, d]] = *table;
    let n = a + b + c + d;

    let ln_fact = ln_factorials(n as usize);
    let prob = |a: u64, b: u64, c: u64, d: u64| -> f64 {
        (ln_fact[(a + b) as usize] + ln_fact[(c + d) as usize]
            + ln_fact[(a + c) as usize]
            + ln_fact[(b + d) as usize]
            - ln_fact[n as usize]
            - ln_fact[a as usize]
            - ln_fact[b as usize]
            - ln_fact[c as usize]
            - ln_fact[d as usize])
            .exp()
    };

    let p_observed = prob(a, b, c, d);

    let row1 = a + b;
    let col1 = a + c;
    let lo = (row1 + col1).saturating_sub(n);
    let hi = row1.min(col1);

    // Guard against log-space round-off in the "at least as extreme" test.
    let threshold = p_observed * (1.0 + 1e-7);

    let mut p_sum = 0.0;
    for i in lo..=hi {
        let (na, nb, nc) = (i, row1 - i, col1 - i);
        let nd = n - row1 - col1 + i;
        let p = prob(na, nb, nc, nd);
        if p <= threshold {
            p_sum += p;
        }
    }

    FisherExact {
        p_value: p_sum.min(1.0),
        note: "P-value is exact for a two-sided test.".to_string(),
    }
}

/// Two-sided tail probability of `stat` under a normal reference with the
/// given mean and standard deviation. Degenerates to a step function when
/// the standard deviation is zero.
fn normal_approx_p(stat: f64, mean: f64, std: f64) -> f64 {
    if std == 0.0 {
        if stat > mean { 1.0 } else { 0.0 }
    } else {
        let z = (stat - mean) / std;
        1.0 - erf(z.abs() / std::f64::consts::SQRT_2)
    }
}

/// Cumulative table of `ln(k!)` for `k in 0..=n`.
fn ln_factorials(n: usize) -> Vec<f64> {
    let mut table = Vec::with_capacity(n + 1);
    let mut acc = 0.0;
    table.push(0.0);
    for k in 1..=n {
        #[allow(clippy::cast_precision_loss)]
        {
            acc += (k as f64).ln();
        }
        table.push(acc);
    }
    table
}
