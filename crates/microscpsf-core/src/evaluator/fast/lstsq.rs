//! Least-squares fit of the sampled pupil function onto the Bessel basis.
//!
//! Solves $\mathbf{A}\mathbf{C} \approx \mathbf{B}$ where $\mathbf{A}$ is the
//! real $m \times n$ design matrix ($m$ pupil samples, $n$ basis functions)
//! and $\mathbf{B}$ holds one complex right-hand side per axial offset.
//!
//! Since $\mathbf{A}$ is real, the real and imaginary parts of $\mathbf{B}$
//! are fitted as independent real columns against a single SVD of
//! $\mathbf{A}$ (via `nalgebra`), then recombined.

use nalgebra::DMatrix;
use ndarray::Array2;
use num_complex::Complex64;

use super::super::PsfError;

/// Coefficients and diagnostics of a least-squares solve.
#[derive(Debug, Clone)]
pub struct LeastSquaresFit {
    /// Complex coefficients, shape `(n, p)`: one column per right-hand side.
    pub coefficients: Array2<Complex64>,
    /// Numerical rank of the design matrix after truncation.
    pub rank: usize,
    /// Euclidean norm of the complex residual for each right-hand side.
    pub residual_norms: Vec<f64>,
}

/// Minimum-norm least-squares solution with a real design matrix and complex
/// right-hand sides.
///
/// Singular values below $\epsilon \max(m, n)\, \sigma_{\max}$ are discarded,
/// matching the usual LAPACK `gelsd` cutoff.
///
/// # Arguments
/// * `design` - Real design matrix $\mathbf{A}$, shape `(m, n)`.
/// * `rhs` - Complex right-hand sides $\mathbf{B}$, shape `(m, p)`.
pub fn solve_complex_lstsq(
    design: &Array2<f64>,
    rhs: &Array2<Complex64>,
) -> Result<LeastSquaresFit, PsfError> {
    let (m, n) = design.dim();
    let p = rhs.ncols();
    if rhs.nrows() != m {
        return Err(PsfError::LinAlg(format!(
            "right-hand side has {} rows, design matrix has {m}",
            rhs.nrows()
        )));
    }

    let a = DMatrix::<f64>::from_fn(m, n, |i, j| design[[i, j]]);

    // Real parts in columns [0, p), imaginary parts in [p, 2p).
    let b = DMatrix::<f64>::from_fn(m, 2 * p, |i, j| {
        if j < p {
            rhs[[i, j]].re
        } else {
            rhs[[i, j - p]].im
        }
    });

    let svd = a.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    if !sigma_max.is_finite() || sigma_max <= 0.0 {
        return Err(PsfError::LinAlg(format!(
            "design matrix is degenerate (largest singular value {sigma_max})"
        )));
    }
    let cutoff = f64::EPSILON * m.max(n) as f64 * sigma_max;
    let rank = svd.rank(cutoff);

    let x = svd
        .solve(&b, cutoff)
        .map_err(|e| PsfError::LinAlg(e.to_string()))?;

    let residual = &a * &x - &b;
    let residual_norms = (0..p)
        .map(|j| {
            let re = residual.column(j).norm_squared();
            let im = residual.column(j + p).norm_squared();
            (re + im).sqrt()
        })
        .collect();

    let coefficients = Array2::from_shape_fn((n, p), |(i, j)| Complex64::new(x[(i, j)], x[(i, j + p)]));

    Ok(LeastSquaresFit {
        coefficients,
        rank,
        residual_norms,
    })
}
