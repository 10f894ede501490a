//! PSF evaluator abstraction and implementations.
//!
//! The [`PsfEvaluator`] trait defines the interface shared by every method of
//! computing a Gibson-Lanni focal scan. The production implementation is the
//! Fourier-Bessel fast evaluator ([`fast::FastPsfEvaluator`]); reference
//! integrators used for validation implement the same trait so both can be
//! run against identical inputs.

pub mod fast;

use thiserror::Error;

use crate::types::{FocalScan, MicroscopeParameters, PsfGrid};

/// Errors that can occur during a PSF evaluation.
#[derive(Debug, Error)]
pub enum PsfError {
    /// Invalid microscope parameters.
    #[error("Invalid microscope configuration: {0}")]
    Configuration(String),

    /// Invalid scan request.
    #[error("Invalid scan request: {0}")]
    Domain(String),

    /// The computed field carries no light, so it cannot be normalised.
    #[error("Degenerate PSF: peak intensity is {peak:e}")]
    DegenerateField { peak: f64 },

    #[error("Linear algebra error: {0}")]
    LinAlg(String),
}

impl PsfError {
    /// Whether the error stems from the scan request rather than the
    /// microscope description or the numerics.
    pub fn is_domain_error(&self) -> bool {
        matches!(self, Self::Domain(_) | Self::DegenerateField { .. })
    }
}

/// Non-fatal numerical conditions encountered during an evaluation.
///
/// Each has a defined fallback; none of them produce NaN or infinite output.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericalWarning {
    /// The Bessel design matrix lost rank; the minimum-norm solution over
    /// the retained singular vectors was used.
    RankDeficient { rank: usize, num_basis: usize },
    /// Reconstruction entries where the basis scale coincided with the radial
    /// frequency; the analytic limit of the Lommel integral was used.
    BesselCoincidence { count: usize },
}

impl std::fmt::Display for NumericalWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RankDeficient { rank, num_basis } => write!(
                f,
                "Bessel basis is rank deficient ({rank} of {num_basis} terms retained)"
            ),
            Self::BesselCoincidence { count } => write!(
                f,
                "{count} reconstruction term(s) used the coincident-argument limit"
            ),
        }
    }
}

/// The core trait that all PSF evaluation methods implement.
pub trait PsfEvaluator {
    /// Evaluate the PSF on the `(axial offset, radius)` grid of `scan`,
    /// normalised so that the global maximum is exactly 1.0.
    fn evaluate_focal_scan(
        &self,
        params: &MicroscopeParameters,
        scan: &FocalScan,
    ) -> Result<PsfGrid, PsfError>;

    /// Human-readable name of the evaluation method.
    fn method_name(&self) -> &str;
}

/// Divide `intensity` by its global maximum in place.
///
/// Shared by all evaluators so that every method applies the same
/// normalisation and the same degenerate-field rule.
pub fn normalise_to_peak(intensity: &mut ndarray::Array2<f64>) -> Result<(), PsfError> {
    let peak = intensity.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !peak.is_finite() || peak <= 0.0 {
        return Err(PsfError::DegenerateField { peak });
    }
    intensity.mapv_inplace(|v| v / peak);
    Ok(())
}
