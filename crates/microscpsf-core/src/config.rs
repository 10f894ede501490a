//! Fourier-Bessel basis configuration.
//!
//! The pupil phase is approximated by a sum of rescaled order-zero Bessel
//! functions $J_0(s_k \rho)$. The scaling factors $s_k$ follow Li, Xue & Blu,
//! *JOSA A* **34**, 1029 (2017):
//!
//! $$ s_k = \mathrm{NA}\,(3k - 2)\,\frac{\lambda_{\min}}{\lambda}, \quad k = 1..K $$
//!
//! where $\lambda_{\min}$ is the shortest wavelength the spacing was tuned for.

use crate::types::MicroscopeParameters;

/// Number of rescaled Bessel functions approximating the pupil phase.
pub const NUM_BASIS: usize = 100;

/// Number of pupil samples along the radial direction.
pub const RHO_SAMPLES: usize = 1000;

/// Reference wavelength (µm) from which the basis spacing is derived.
pub const MIN_WAVELENGTH: f64 = 0.436;

/// Basis constants for one wavelength and parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisConfig {
    /// Bessel argument scales, strictly increasing.
    pub scaling_factors: Vec<f64>,
    /// Normalised maximum pupil radius, in (0, 1].
    pub max_rho: f64,
}

impl BasisConfig {
    /// `n` pupil radii uniformly spaced over `[0, max_rho]`, both ends included.
    pub fn pupil_samples(&self, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![0.0],
            _ => {
                let step = self.max_rho / (n - 1) as f64;
                let mut rho: Vec<f64> = (0..n).map(|j| j as f64 * step).collect();
                rho[n - 1] = self.max_rho;
                rho
            }
        }
    }

    pub fn num_basis(&self) -> usize {
        self.scaling_factors.len()
    }
}

/// Derive the basis constants with the standard number of terms.
pub fn configure(params: &MicroscopeParameters, wavelength: f64) -> BasisConfig {
    configure_with(params, wavelength, NUM_BASIS)
}

/// Derive the basis constants with an explicit number of terms.
///
/// Wavelengths shorter than [`MIN_WAVELENGTH`] are accepted; they produce a
/// denser basis that samples the pupil less accurately.
pub fn configure_with(
    params: &MicroscopeParameters,
    wavelength: f64,
    num_basis: usize,
) -> BasisConfig {
    let na = params.numerical_aperture;
    let scaling_factors = (1..=num_basis)
        .map(|k| na * (3 * k - 2) as f64 * MIN_WAVELENGTH / wavelength)
        .collect();

    let max_rho = na.min(params.min_refractive_index()) / na;

    BasisConfig {
        scaling_factors,
        max_rho,
    }
}
