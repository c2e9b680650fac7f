//! Ordinary least squares: closed-form simple regression and matrix OLS
//! over the normal equations.
//!
//! Conventions fixed here (1e-12 thresholds throughout): R² is exactly 1.0
//! when the total sum of squares is numerically zero (a flat response is
//! treated as perfectly explained), adjusted R² is 0.0 when `n ≤ p`, and a
//! t-statistic is 0.0 rather than a near-zero division when its standard
//! error falls below the threshold. P-values and confidence intervals need
//! a t-distribution CDF and are deliberately not computed; every result
//! says so in its note field.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::linalg;

const EPS: f64 = 1e-12;

const OLS_NOTE: &str =
    "P-values and confidence intervals require a t-distribution CDF and are not computed.";

/// Simple (one-predictor) linear regression result.
///
/// `coefficients` is `[intercept, slope]`. Standard errors and
/// t-statistics are `None` when the predictor has zero variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleRegression {
    pub coefficients: [f64; 2],
    pub std_errors: [Option<f64>; 2],
    pub t_statistics: [Option<f64>; 2],
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub n: usize,
    pub df_model: usize,
    pub df_residual: usize,
    pub note: String,
}

/// Multiple-regression (OLS) result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OlsFit {
    /// Intercept first when the model was fit with one.
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub t_statistics: Vec<f64>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub mse: f64,
    pub n: usize,
    pub df_model: usize,
    pub df_residual: usize,
    pub note: String,
}

/// Closed-form least-squares fit of `y = intercept + slope * x`.
///
/// # Errors
///
/// Returns [`EngineError::LengthMismatch`] for unequal inputs and
/// [`EngineError::TooFewObservations`] for fewer than two points.
pub fn simple_linear_regression(x: &[f64], y: &[f64]) -> Result<SimpleRegression, EngineError> {
    if x.len() != y.len() {
        return Err(EngineError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(EngineError::TooFewObservations { n, p: 2 });
    }

    #[allow(clippy::cast_precision_loss)]
    let nf = n as f64;
    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;

    let ss_x: f64 = x.iter().map(|xi| (xi - x_mean).powi(2)).sum();
    let s_xy: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
        .sum();

    if ss_x <= EPS {
        return Err(EngineError::Numerical(
            "Predictor has zero variance; slope is undefined.".to_string(),
        ));
    }

    let slope = s_xy / ss_x;
    let intercept = y_mean - slope * x_mean;

    let residuals: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| yi - (intercept + slope * xi))
        .collect();
    let ss_residual: f64 = residuals.iter().map(|r| r * r).sum();
    let ss_total: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();

    let p = 2;
    let (r_squared, adj_r_squared) = r_squared_pair(ss_residual, ss_total, n, p);

    let (std_errors, t_statistics) = if n > p {
        #[allow(clippy::cast_precision_loss)]
        let mse = ss_residual / (n - p) as f64;
        let se_intercept = (mse * (1.0 / nf + x_mean.powi(2) / ss_x)).sqrt();
        let se_slope = (mse / ss_x).sqrt();
        let t = |coef: f64, se: f64| if se > EPS { coef / se } else { 0.0 };
        (
            [Some(se_intercept), Some(se_slope)],
            [Some(t(intercept, se_intercept)), Some(t(slope, se_slope))],
        )
    } else {
        ([None, None], [None, None])
    };

    Ok(SimpleRegression {
        coefficients: [intercept, slope],
        std_errors,
        t_statistics,
        r_squared,
        adj_r_squared,
        n,
        df_model: p - 1,
        df_residual: n.saturating_sub(p),
        note: OLS_NOTE.to_string(),
    })
}

/// OLS over predictor *rows* via the normal equations
/// `β = (XᵗX)⁻¹ Xᵗy`, optionally prepending a constant 1.0 column.
///
/// # Errors
///
/// Returns [`EngineError::LengthMismatch`] when `x.len() != y.len()`,
/// [`EngineError::TooFewObservations`] when the observation count does not
/// exceed the (augmented) parameter count, and [`EngineError::Numerical`]
/// when `XᵗX` is singular — typically perfect multicollinearity among
/// predictors.
pub fn ols(x: &[Vec<f64>], y: &[f64], add_intercept: bool) -> Result<OlsFit, EngineError> {
    if x.len() != y.len() {
        return Err(EngineError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let n = y.len();

    let design: linalg::Matrix = if add_intercept {
        x.iter()
            .map(|row| std::iter::once(1.0).chain(row.iter().copied()).collect())
            .collect()
    } else {
        x.to_vec()
    };

    let p = design.first().map_or(0, Vec::len);
    if n <= p {
        return Err(EngineError::TooFewObservations { n, p });
    }

    let xt = linalg::transpose(&design);
    let xtx = linalg::matmul(&xt, &design)?;
    let xtx_inv = linalg::invert(&xtx).map_err(|e| match e {
        EngineError::Singular => EngineError::Numerical(
            "Failed to solve regression; predictors may be perfectly multicollinear.".to_string(),
        ),
        other => other,
    })?;
    let xty = linalg::matvec(&xt, &y.to_vec())?;
    let coefficients = linalg::matvec(&xtx_inv, &xty)?;

    let fitted = linalg::matvec(&design, &coefficients)?;
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(yi, fi)| yi - fi).collect();
    let ss_residual: f64 = residuals.iter().map(|r| r * r).sum();

    #[allow(clippy::cast_precision_loss)]
    let y_mean = y.iter().sum::<f64>() / n as f64;
    let ss_total: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();

    let (r_squared, adj_r_squared) = r_squared_pair(ss_residual, ss_total, n, p);

    #[allow(clippy::cast_precision_loss)]
    let mse = ss_residual / (n - p) as f64;
    let std_errors: Vec<f64> = (0..p).map(|i| (mse * xtx_inv[i][i]).sqrt()).collect();
    let t_statistics: Vec<f64> = coefficients
        .iter()
        .zip(&std_errors)
        .map(|(&coef, &se)| if se > EPS { coef / se } else { 0.0 })
        .collect();

    Ok(OlsFit {
        coefficients,
        std_errors,
        t_statistics,
        r_squared,
        adj_r_squared,
        mse,
        n,
        df_model: p - 1,
        df_residual: n - p,
        note: OLS_NOTE.to_string(),
    })
}

/// R² and adjusted R² under the canonical conventions: a numerically zero
/// total sum of squares reads as perfectly explained, and adjusted R²
/// collapses to 0.0 when `n ≤ p`.
fn r_squared_pair(ss_residual: f64, ss_total: f64, n: usize, p: usize) -> (f64, f64) {
    let r_squared = if ss_total > EPS {
        1.0 - ss_residual / ss_total
    } else {
        1.0
    };
    let adj = if n > p {
        #[allow(clippy::cast_precision_loss)]
        let adj = 1.0 - (1.0 - r_squared) * (n - 1) as f64 / (n - p) as f64;
        adj
    } else {
        0.0
    };
    (r_squared, adj)
}
