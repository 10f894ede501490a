//! Fourier-Bessel fast PSF evaluator.
//!
//! Implements the algorithm of Li, Xue & Blu, *JOSA A* **34**, 1029 (2017).
//! Instead of integrating the Gibson-Lanni pupil function numerically for
//! every `(r, z)` pair, the sampled pupil function of each axial offset is
//! expanded in a truncated basis of rescaled Bessel functions,
//!
//! $$ e^{i\phi_z(\rho)} \approx \sum_k C_k(z)\, J_0(s_k \rho), $$
//!
//! after which the radial integral has a closed form:
//!
//! $$
//! \mathrm{PSF}(r, z) = \Big| \sum_k C_k(z) \int_0^{\rho_m} J_0(s_k\rho) J_0(b\rho)\rho\, d\rho \Big|^2,
//! \quad b = \frac{2\pi r\, \mathrm{NA}}{\lambda}.
//! $$
//!
//! # Pipeline
//!
//! 1. Basis configuration ([`crate::config`]) and pupil sampling.
//! 2. Phase matrix from the OPD ([`crate::opd`]) and $e^{i\phi}$.
//! 3. Design matrix $J_0(s_k\rho_j)$ and SVD least squares ([`lstsq`]).
//! 4. Lommel reconstruction matrix ([`assembly::reconstruction_matrix`]).
//! 5. $|R\,C|^2$, transposed to `(axial, radius)` and normalised.

pub mod assembly;
pub mod lstsq;

use ndarray::Array2;

use super::{normalise_to_peak, NumericalWarning, PsfError, PsfEvaluator};
use crate::config::{configure_with, NUM_BASIS, RHO_SAMPLES};
use crate::types::{FocalScan, MicroscopeParameters, PsfGrid};

/// The fast evaluator, holding configuration for the numerical method.
#[derive(Debug, Clone)]
pub struct FastPsfEvaluator {
    /// Number of rescaled Bessel functions in the expansion.
    pub num_basis: usize,
    /// Number of pupil samples used for the fit.
    pub rho_samples: usize,
    /// Fill matrices across threads with Rayon.
    pub parallel: bool,
}

impl Default for FastPsfEvaluator {
    fn default() -> Self {
        Self {
            num_basis: NUM_BASIS,
            rho_samples: RHO_SAMPLES,
            parallel: true,
        }
    }
}

/// Diagnostics collected while fitting and reconstructing.
#[derive(Debug, Clone, PartialEq)]
pub struct FitDiagnostics {
    /// Numerical rank of the Bessel design matrix.
    pub rank: usize,
    /// Number of basis functions requested.
    pub num_basis: usize,
    /// Largest least-squares residual norm over all axial offsets.
    pub max_residual: f64,
    /// Reconstruction entries resolved by the coincident-argument limit.
    pub coincidences: usize,
    /// Non-fatal conditions raised during the evaluation.
    pub warnings: Vec<NumericalWarning>,
}

/// A PSF grid together with the diagnostics of the fit that produced it.
#[derive(Debug, Clone)]
pub struct FocalScanResult {
    pub psf: PsfGrid,
    pub diagnostics: FitDiagnostics,
}

impl FastPsfEvaluator {
    pub fn new(num_basis: usize, rho_samples: usize) -> Self {
        Self {
            num_basis,
            rho_samples,
            ..Default::default()
        }
    }

    /// Disable or enable Rayon parallelism.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Evaluate a focal scan and return the fit diagnostics alongside it.
    pub fn evaluate_detailed(
        &self,
        params: &MicroscopeParameters,
        scan: &FocalScan,
    ) -> Result<FocalScanResult, PsfError> {
        params.validate()?;
        scan.validate(params)?;
        if self.num_basis == 0 || self.rho_samples < 2 {
            return Err(PsfError::Configuration(format!(
                "evaluator needs at least one basis function and two pupil samples \
                 (got {} and {})",
                self.num_basis, self.rho_samples
            )));
        }

        let basis = configure_with(params, scan.wavelength, self.num_basis);
        let rho = basis.pupil_samples(self.rho_samples);
        log::debug!(
            "focal scan: {} offsets x {} radii, {} basis terms, max_rho={:.4}",
            scan.axial_offsets.len(),
            scan.radii.len(),
            self.num_basis,
            basis.max_rho
        );

        // Pupil function and Bessel design matrix, both (n_rho, ...).
        let pupil = assembly::pupil_function(params, scan, &rho, self.parallel);
        let design = assembly::design_matrix(&basis, &rho, self.parallel);

        // Coefficients C, shape (n_basis, n_z).
        let fit = lstsq::solve_complex_lstsq(&design, &pupil)?;
        let max_residual = fit.residual_norms.iter().copied().fold(0.0, f64::max);
        log::debug!("basis fit: rank {}, max residual {:.3e}", fit.rank, max_residual);

        let mut warnings = Vec::new();
        if fit.rank < self.num_basis {
            let w = NumericalWarning::RankDeficient {
                rank: fit.rank,
                num_basis: self.num_basis,
            };
            log::warn!("{w}");
            warnings.push(w);
        }

        // Closed-form radial integrals R, shape (n_r, n_basis).
        let (recon, coincidences) = assembly::reconstruction_matrix(
            params,
            &basis,
            &scan.radii,
            scan.wavelength,
            self.parallel,
        );
        if coincidences > 0 {
            let w = NumericalWarning::BesselCoincidence {
                count: coincidences,
            };
            log::warn!("{w}");
            warnings.push(w);
        }

        // Field (n_r, n_z) -> intensity (n_z, n_r).
        let field = recon.mapv(num_complex::Complex64::from).dot(&fit.coefficients);
        let mut intensity: Array2<f64> = field.t().mapv(|e| e.norm_sqr());
        normalise_to_peak(&mut intensity)?;

        Ok(FocalScanResult {
            psf: PsfGrid {
                radii: scan.radii.clone(),
                axial_offsets: scan.axial_offsets.clone(),
                intensity,
            },
            diagnostics: FitDiagnostics {
                rank: fit.rank,
                num_basis: self.num_basis,
                max_residual,
                coincidences,
                warnings,
            },
        })
    }
}

impl PsfEvaluator for FastPsfEvaluator {
    fn evaluate_focal_scan(
        &self,
        params: &MicroscopeParameters,
        scan: &FocalScan,
    ) -> Result<PsfGrid, PsfError> {
        self.evaluate_detailed(params, scan).map(|result| result.psf)
    }

    fn method_name(&self) -> &str {
        "Fourier-Bessel fast Gibson-Lanni"
    }
}
