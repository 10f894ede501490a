//! # microscpsf core
//!
//! Point-spread function of a wide-field fluorescence microscope under the
//! Gibson-Lanni aberration model, evaluated with the fast Fourier-Bessel
//! method of Li, Xue & Blu (2017).
//!
//! ## Architecture
//!
//! All evaluation methods implement the [`evaluator::PsfEvaluator`] trait,
//! which maps a [`types::MicroscopeParameters`] and a [`types::FocalScan`] to
//! a normalised [`types::PsfGrid`]. The production implementation is
//! [`evaluator::fast::FastPsfEvaluator`].
//!
//! ## Modules
//!
//! - [`types`]: Microscope parameters, scan requests, PSF grids.
//! - [`config`]: Fourier-Bessel basis scaling and pupil sampling.
//! - [`opd`]: Optical path difference and detector focus offset.
//! - [`bessel`]: $J_0$, $J_1$ and the Lommel overlap integral.
//! - [`evaluator`]: Evaluator trait, errors and the fast evaluator.
//!
//! ```no_run
//! use microscpsf_core::evaluator::fast::FastPsfEvaluator;
//! use microscpsf_core::evaluator::PsfEvaluator;
//! use microscpsf_core::types::{FocalScan, MicroscopeParameters};
//!
//! let params = MicroscopeParameters::default();
//! let radii: Vec<f64> = (0..=10).map(|i| 0.1 * i as f64).collect();
//! let offsets: Vec<f64> = (0..=10).map(|i| -1.0 + 0.2 * i as f64).collect();
//! let scan = FocalScan::new(radii, offsets).with_particle_depth(0.5);
//!
//! let psf = FastPsfEvaluator::default().evaluate_focal_scan(&params, &scan)?;
//! assert_eq!(psf.peak(), 1.0);
//! # Ok::<(), microscpsf_core::evaluator::PsfError>(())
//! ```

pub mod bessel;
pub mod config;
pub mod evaluator;
pub mod opd;
pub mod types;

pub use evaluator::fast::FastPsfEvaluator;
pub use evaluator::{PsfError, PsfEvaluator};
pub use types::{FocalScan, MicroscopeParameters, PsfGrid};
