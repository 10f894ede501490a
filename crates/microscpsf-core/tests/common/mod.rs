//! Shared test harness: a brute-force reference evaluator and grid helpers.
//!
//! [`QuadratureEvaluator`] integrates the Gibson-Lanni pupil function
//! directly,
//!
//! $$ \mathrm{PSF}(r, z) = \Big| \int_0^{\rho_m} J_0(b\rho)\, e^{i\phi_z(\rho)} \rho\, d\rho \Big|^2, $$
//!
//! with composite Simpson quadrature. It shares the OPD model with the fast
//! evaluator but none of the Fourier-Bessel machinery, so it bounds the error
//! of the basis expansion and the closed-form reconstruction.

#![allow(dead_code)]

use ndarray::Array2;
use num_complex::Complex64;

use microscpsf_core::bessel::j0;
use microscpsf_core::config::configure;
use microscpsf_core::evaluator::{normalise_to_peak, PsfError, PsfEvaluator};
use microscpsf_core::opd::compute_opd;
use microscpsf_core::types::{FocalScan, MicroscopeParameters, PsfGrid};

/// Direct numerical quadrature over the pupil.
pub struct QuadratureEvaluator {
    /// Number of Simpson intervals (even).
    pub intervals: usize,
}

impl Default for QuadratureEvaluator {
    fn default() -> Self {
        Self { intervals: 40_000 }
    }
}

impl PsfEvaluator for QuadratureEvaluator {
    fn evaluate_focal_scan(
        &self,
        params: &MicroscopeParameters,
        scan: &FocalScan,
    ) -> Result<PsfGrid, PsfError> {
        params.validate()?;
        scan.validate(params)?;

        let n = self.intervals + self.intervals % 2;
        let max_rho = configure(params, scan.wavelength).max_rho;
        let h = max_rho / n as f64;
        let rho: Vec<f64> = (0..=n).map(|j| j as f64 * h).collect();

        // Simpson weights folded together with the rho Jacobian.
        let weights: Vec<f64> = (0..=n)
            .map(|j| {
                let w = if j == 0 || j == n {
                    1.0
                } else if j % 2 == 1 {
                    4.0
                } else {
                    2.0
                };
                w * rho[j] * h / 3.0
            })
            .collect();

        let zd = scan.detector_position_or(params);
        let pupils: Vec<Vec<Complex64>> = scan
            .axial_offsets
            .iter()
            .map(|z| {
                compute_opd(
                    params,
                    &rho,
                    params.ti0 + z,
                    scan.particle_depth,
                    scan.wavelength,
                    zd,
                )
                .into_iter()
                .zip(&weights)
                .map(|(phase, w)| Complex64::new(0.0, phase).exp() * *w)
                .collect()
            })
            .collect();

        let kernels: Vec<Vec<f64>> = scan
            .radii
            .iter()
            .map(|r| {
                let b = 2.0 * std::f64::consts::PI * r * params.numerical_aperture
                    / scan.wavelength;
                rho.iter().map(|p| j0(b * p)).collect()
            })
            .collect();

        let mut intensity =
            Array2::from_shape_fn((pupils.len(), kernels.len()), |(iz, ir)| {
                let field: Complex64 = pupils[iz]
                    .iter()
                    .zip(&kernels[ir])
                    .map(|(p, k)| *p * *k)
                    .sum();
                field.norm_sqr()
            });
        normalise_to_peak(&mut intensity)?;

        Ok(PsfGrid {
            radii: scan.radii.clone(),
            axial_offsets: scan.axial_offsets.clone(),
            intensity,
        })
    }

    fn method_name(&self) -> &str {
        "Simpson quadrature"
    }
}

/// `n` evenly spaced values from `start` in steps of `step`.
pub fn arange(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Radii 0.0..=1.0 in steps of 0.1.
pub fn standard_radii() -> Vec<f64> {
    arange(0.0, 0.1, 11)
}

/// Axial offsets -1.0..=1.0 in steps of 0.2.
pub fn standard_offsets() -> Vec<f64> {
    arange(-1.0, 0.2, 11)
}

/// Elementwise `|a - b| <= atol + rtol * |b|`, panicking with the worst entry.
pub fn assert_grids_close(a: &PsfGrid, b: &PsfGrid, atol: f64, rtol: f64) {
    assert_eq!(a.shape(), b.shape(), "grid shapes differ");
    let mut worst: Option<(usize, usize, f64, f64)> = None;
    let mut worst_excess = 0.0;
    for ((iz, ir), &x) in a.intensity.indexed_iter() {
        let y = b.intensity[[iz, ir]];
        let excess = (x - y).abs() - (atol + rtol * y.abs());
        if excess > worst_excess {
            worst_excess = excess;
            worst = Some((iz, ir, x, y));
        }
    }
    if let Some((iz, ir, x, y)) = worst {
        panic!(
            "grids differ at z={:.2}, r={:.2}: {:.6e} vs {:.6e} (atol={atol:e}, rtol={rtol:e})",
            a.axial_offsets[iz], a.radii[ir], x, y
        );
    }
}
