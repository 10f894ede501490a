//! Core types shared across the PSF pipeline.
//!
//! This module defines the microscope description, the focal-scan request
//! and the normalised intensity grid returned by every evaluator.
//!
//! All distances are in microns.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::evaluator::PsfError;

/// Default emission wavelength (µm) used when a scan does not specify one.
pub const DEFAULT_WAVELENGTH: f64 = 0.6;

/// Optical parameters of the microscope in the Gibson-Lanni model.
///
/// "Design" values describe the optical stack the objective was corrected
/// for; "actual" values describe the stack in the experiment. Any mismatch
/// between the two introduces aberration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicroscopeParameters {
    /// Lateral magnification `M`.
    #[serde(alias = "M")]
    pub magnification: f64,
    /// Numerical aperture `NA`.
    #[serde(alias = "NA")]
    pub numerical_aperture: f64,
    /// Coverslip refractive index, design value.
    pub ng0: f64,
    /// Coverslip refractive index, actual value.
    pub ng: f64,
    /// Immersion medium refractive index, design value.
    pub ni0: f64,
    /// Immersion medium refractive index, actual value.
    pub ni: f64,
    /// Specimen refractive index.
    pub ns: f64,
    /// Working distance (immersion medium thickness), design value.
    pub ti0: f64,
    /// Coverslip thickness, design value.
    pub tg0: f64,
    /// Coverslip thickness, actual value.
    pub tg: f64,
    /// Tube length, i.e. the design detector position.
    pub zd0: f64,
}

impl Default for MicroscopeParameters {
    /// A 100x/1.4 oil objective with matched coverslip and immersion oil,
    /// imaging into an aqueous specimen.
    fn default() -> Self {
        Self {
            magnification: 100.0,
            numerical_aperture: 1.4,
            ng0: 1.515,
            ng: 1.515,
            ni0: 1.515,
            ni: 1.515,
            ns: 1.33,
            ti0: 150.0,
            tg0: 170.0,
            tg: 170.0,
            zd0: 200.0e3,
        }
    }
}

impl MicroscopeParameters {
    /// Check that every quantity is finite and strictly positive.
    ///
    /// An `NA` larger than one of the refractive indices is accepted: the
    /// usable pupil is then clipped by `max_rho` (see
    /// [`configure`](crate::config::configure)).
    pub fn validate(&self) -> Result<(), PsfError> {
        let fields = [
            ("magnification", self.magnification),
            ("numerical_aperture", self.numerical_aperture),
            ("ng0", self.ng0),
            ("ng", self.ng),
            ("ni0", self.ni0),
            ("ni", self.ni),
            ("ns", self.ns),
            ("ti0", self.ti0),
            ("tg0", self.tg0),
            ("tg", self.tg),
            ("zd0", self.zd0),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(PsfError::Configuration(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Smallest refractive index in the optical stack.
    pub fn min_refractive_index(&self) -> f64 {
        [self.ng0, self.ng, self.ni0, self.ni, self.ns]
            .into_iter()
            .fold(f64::INFINITY, f64::min)
    }

    /// Aperture radius at the back focal plane, $a = \mathrm{NA}\, z_{d0} / M$.
    pub fn back_focal_aperture(&self) -> f64 {
        self.numerical_aperture * self.zd0 / self.magnification
    }
}

/// A focal-scan request: the PSF is sampled at every combination of
/// `radii` and `axial_offsets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocalScan {
    /// Lateral distances from the optical axis (µm), non-negative.
    pub radii: Vec<f64>,
    /// Coverslip z offsets relative to the design working distance (µm).
    /// Negative values move the coverslip closer to the objective.
    pub axial_offsets: Vec<f64>,
    /// Emitter height above the coverslip (µm).
    pub particle_depth: f64,
    /// Emission wavelength (µm).
    pub wavelength: f64,
    /// Actual detector position (µm). `None` means the design tube length.
    pub detector_position: Option<f64>,
}

impl FocalScan {
    pub fn new(radii: Vec<f64>, axial_offsets: Vec<f64>) -> Self {
        Self {
            radii,
            axial_offsets,
            particle_depth: 0.0,
            wavelength: DEFAULT_WAVELENGTH,
            detector_position: None,
        }
    }

    pub fn with_particle_depth(mut self, particle_depth: f64) -> Self {
        self.particle_depth = particle_depth;
        self
    }

    pub fn with_wavelength(mut self, wavelength: f64) -> Self {
        self.wavelength = wavelength;
        self
    }

    pub fn with_detector_position(mut self, detector_position: f64) -> Self {
        self.detector_position = Some(detector_position);
        self
    }

    /// Detector position, falling back to the design tube length.
    pub fn detector_position_or(&self, params: &MicroscopeParameters) -> f64 {
        self.detector_position.unwrap_or(params.zd0)
    }

    /// Reject requests that cannot produce a meaningful grid.
    ///
    /// All checks run before any numerical work is done.
    pub fn validate(&self, params: &MicroscopeParameters) -> Result<(), PsfError> {
        if self.radii.is_empty() {
            return Err(PsfError::Domain("radius list is empty".into()));
        }
        if self.axial_offsets.is_empty() {
            return Err(PsfError::Domain("axial offset list is empty".into()));
        }
        if let Some((i, r)) = self
            .radii
            .iter()
            .enumerate()
            .find(|(_, r)| !r.is_finite() || **r < 0.0)
        {
            return Err(PsfError::Domain(format!(
                "radius {i} must be finite and non-negative, got {r}"
            )));
        }
        if let Some((i, z)) = self
            .axial_offsets
            .iter()
            .enumerate()
            .find(|(_, z)| !z.is_finite())
        {
            return Err(PsfError::Domain(format!(
                "axial offset {i} must be finite, got {z}"
            )));
        }
        if !self.particle_depth.is_finite() || self.particle_depth < 0.0 {
            return Err(PsfError::Domain(format!(
                "particle depth must be finite and non-negative, got {}",
                self.particle_depth
            )));
        }
        if !self.wavelength.is_finite() || self.wavelength <= 0.0 {
            return Err(PsfError::Domain(format!(
                "wavelength must be positive, got {}",
                self.wavelength
            )));
        }
        let zd = self.detector_position_or(params);
        if !zd.is_finite() || zd <= 0.0 {
            return Err(PsfError::Domain(format!(
                "detector position must be positive, got {zd}"
            )));
        }
        Ok(())
    }
}

/// Radial/axial PSF intensity normalised to a peak of exactly 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsfGrid {
    /// Radii (µm), one per column.
    pub radii: Vec<f64>,
    /// Axial offsets (µm), one per row.
    pub axial_offsets: Vec<f64>,
    /// Intensity, shape `(axial_offsets.len(), radii.len())`.
    pub intensity: Array2<f64>,
}

impl PsfGrid {
    /// `(num_axial_offsets, num_radii)`.
    pub fn shape(&self) -> (usize, usize) {
        self.intensity.dim()
    }

    /// Intensity at a given axial index and radius index.
    pub fn at(&self, axial: usize, radius: usize) -> f64 {
        self.intensity[[axial, radius]]
    }

    /// Largest intensity value in the grid.
    pub fn peak(&self) -> f64 {
        self.intensity.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Intensity profile along the optical axis for one radius index.
    pub fn axial_profile(&self, radius: usize) -> Vec<f64> {
        self.intensity.column(radius).to_vec()
    }

    /// Intensity profile across radii for one axial index.
    pub fn radial_profile(&self, axial: usize) -> Vec<f64> {
        self.intensity.row(axial).to_vec()
    }
}
