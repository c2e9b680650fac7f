//! Dense small-matrix kernel for the regression module.
//!
//! Matrices are row-major `Vec<Vec<f64>>`, vectors are `Vec<f64>`. This is
//! deliberately not a general-purpose matrix library — only the operations
//! the normal equations need, on matrices with a handful of columns.

use crate::error::EngineError;

pub type Matrix = Vec<Vec<f64>>;
pub type Vector = Vec<f64>;

/// Pivot magnitude below which a matrix is treated as singular. A fixed
/// design constant, not user-configurable: callers must handle
/// near-singularity as a hard failure instead of receiving garbage.
pub const PIVOT_EPS: f64 = 1e-12;

/// Transpose a rectangular matrix.
#[must_use]
pub fn transpose(a: &Matrix) -> Matrix {
    let rows = a.len();
    let cols = a.first().map_or(0, Vec::len);
    let mut out = vec![vec![0.0; rows]; cols];
    for (i, row) in a.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            out[j][i] = v;
        }
    }
    out
}

/// Multiply two matrices.
///
/// # Errors
///
/// Returns [`EngineError::DimensionMismatch`] when `a.cols != b.rows`.
pub fn matmul(a: &Matrix, b: &Matrix) -> Result<Matrix, EngineError> {
    let a_cols = a.first().map_or(0, Vec::len);
    let b_rows = b.len();
    let b_cols = b.first().map_or(0, Vec::len);
    if a_cols != b_rows {
        return Err(EngineError::DimensionMismatch(format!(
            "{}x{a_cols} * {b_rows}x{b_cols}",
            a.len()
        )));
    }
    let mut out = vec![vec![0.0; b_cols]; a.len()];
    for (i, a_row) in a.iter().enumerate() {
        for (k, &a_ik) in a_row.iter().enumerate() {
            for (j, &b_kj) in b[k].iter().enumerate() {
                out[i][j] += a_ik * b_kj;
            }
        }
    }
    Ok(out)
}

/// Multiply a matrix by a vector.
///
/// # Errors
///
/// Returns [`EngineError::DimensionMismatch`] when `a.cols != v.len()`.
pub fn matvec(a: &Matrix, v: &Vector) -> Result<Vector, EngineError> {
    let a_cols = a.first().map_or(0, Vec::len);
    if a_cols != v.len() {
        return Err(EngineError::DimensionMismatch(format!(
            "{}x{a_cols} * vector of length {}",
            a.len(),
            v.len()
        )));
    }
    Ok(a.iter()
        .map(|row| row.iter().zip(v).map(|(&x, &y)| x * y).sum())
        .collect())
}

/// The n×n identity matrix.
#[must_use]
pub fn identity(n: usize) -> Matrix {
    let mut out = vec![vec![0.0; n]; n];
    for (i, row) in out.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    out
}

/// Invert a square matrix by Gauss-Jordan elimination with partial
/// pivoting: at each column the remaining row with the largest absolute
/// value in that column is swapped in before reducing.
///
/// # Errors
///
/// Returns [`EngineError::NotSquare`] for a non-square input and
/// [`EngineError::Singular`] when the chosen pivot's magnitude falls below
/// [`PIVOT_EPS`].
pub fn invert(a: &Matrix) -> Result<Matrix, EngineError> {
    let n = a.len();
    for row in a {
        if row.len() != n {
            return Err(EngineError::NotSquare {
                rows: n,
                cols: row.len(),
            });
        }
    }

    // Augment with the identity; reduce until the left half is identity.
    let mut aug: Matrix = a
        .iter()
        .zip(identity(n))
        .map(|(row, id_row)| row.iter().copied().chain(id_row).collect())
        .collect();

    for i in 0..n {
        let mut pivot_row = i;
        for k in (i + 1)..n {
            if aug[k][i].abs() > aug[pivot_row][i].abs() {
                pivot_row = k;
            }
        }
        aug.swap(i, pivot_row);

        let pivot = aug[i][i];
        if pivot.abs() < PIVOT_EPS {
            return Err(EngineError::Singular);
        }

        for j in i..(2 * n) {
            aug[i][j] /= pivot;
        }

        for k in 0..n {
            if k == i {
                continue;
            }
            let factor = aug[k][i];
            for j in i..(2 * n) {
                aug[k][j] -= factor * aug[i][j];
            }
        }
    }

    Ok(aug.into_iter().map(|row| row[n..].to_vec()).collect())
}
