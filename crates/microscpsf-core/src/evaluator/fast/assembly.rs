//! Matrix assembly for the Fourier-Bessel PSF evaluator.
//!
//! Three dense matrices are built per evaluation:
//!
//! - the pupil function $e^{i\phi(z, \rho_j)}$, shape `(n_rho, n_z)`,
//! - the design matrix $J_0(s_k \rho_j)$, shape `(n_rho, n_basis)`,
//! - the reconstruction matrix $R_k(r)$, shape `(n_r, n_basis)`.
//!
//! Rows are independent, so each matrix is filled row-parallel with Rayon
//! when requested. Row order is fixed, which keeps the output identical to a
//! serial fill.

use ndarray::Array2;
use num_complex::Complex64;
use rayon::prelude::*;

use crate::bessel::{is_coincident, j0, lommel_integral};
use crate::config::BasisConfig;
use crate::opd::compute_opd;
use crate::types::{FocalScan, MicroscopeParameters};

/// Fill a `rows x cols` matrix from independent row vectors.
fn fill_rows<T, F>(rows: usize, cols: usize, parallel: bool, row_fn: F) -> Array2<T>
where
    T: Send + Clone,
    F: Fn(usize) -> Vec<T> + Send + Sync,
{
    let data: Vec<Vec<T>> = if parallel {
        (0..rows).into_par_iter().map(&row_fn).collect()
    } else {
        (0..rows).map(&row_fn).collect()
    };
    Array2::from_shape_fn((rows, cols), |(i, j)| data[i][j].clone())
}

/// Sampled complex pupil function, shape `(n_rho, n_z)`.
///
/// Column `i` holds $\exp(i\phi)$ for working distance $t_{i0} + z_i$.
pub fn pupil_function(
    params: &MicroscopeParameters,
    scan: &FocalScan,
    rho: &[f64],
    parallel: bool,
) -> Array2<Complex64> {
    let zd = scan.detector_position_or(params);
    let by_offset = fill_rows(scan.axial_offsets.len(), rho.len(), parallel, |i| {
        let ti = params.ti0 + scan.axial_offsets[i];
        compute_opd(params, rho, ti, scan.particle_depth, scan.wavelength, zd)
            .into_iter()
            .map(|phase| Complex64::new(0.0, phase).exp())
            .collect()
    });
    by_offset.reversed_axes()
}

/// Bessel design matrix $A_{jk} = J_0(s_k \rho_j)$, shape `(n_rho, n_basis)`.
pub fn design_matrix(basis: &BasisConfig, rho: &[f64], parallel: bool) -> Array2<f64> {
    let s = &basis.scaling_factors;
    fill_rows(rho.len(), s.len(), parallel, |j| {
        s.iter().map(|&sk| j0(sk * rho[j])).collect()
    })
}

/// Reconstruction matrix $R_k(r)$, shape `(n_r, n_basis)`, plus the number
/// of entries that fell back to the coincident-argument limit.
pub fn reconstruction_matrix(
    params: &MicroscopeParameters,
    basis: &BasisConfig,
    radii: &[f64],
    wavelength: f64,
    parallel: bool,
) -> (Array2<f64>, usize) {
    let s = &basis.scaling_factors;
    let b_of = |r: f64| 2.0 * std::f64::consts::PI * r * params.numerical_aperture / wavelength;

    let matrix = fill_rows(radii.len(), s.len(), parallel, |i| {
        let b = b_of(radii[i]);
        s.iter()
            .map(|&sk| lommel_integral(sk, b, basis.max_rho))
            .collect()
    });

    let coincidences = radii
        .iter()
        .map(|&r| {
            let b = b_of(r);
            s.iter().filter(|&&sk| is_coincident(sk, b)).count()
        })
        .sum();

    (matrix, coincidences)
}
