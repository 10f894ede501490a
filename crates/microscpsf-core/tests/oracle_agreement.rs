//! Integration test: fast Fourier-Bessel evaluator vs direct quadrature.
//!
//! The reference evaluator integrates the pupil function with a fine Simpson
//! rule, so any disagreement beyond the tolerance comes from truncating the
//! Bessel expansion or from the closed-form reconstruction.

mod common;

use common::{assert_grids_close, standard_offsets, standard_radii, QuadratureEvaluator};
use microscpsf_core::evaluator::fast::FastPsfEvaluator;
use microscpsf_core::evaluator::PsfEvaluator;
use microscpsf_core::types::{FocalScan, MicroscopeParameters, PsfGrid};

fn run_both(params: &MicroscopeParameters, scan: &FocalScan) -> (PsfGrid, PsfGrid) {
    let fast = FastPsfEvaluator::default()
        .evaluate_focal_scan(params, scan)
        .expect("fast evaluation should succeed");
    let slow = QuadratureEvaluator::default()
        .evaluate_focal_scan(params, scan)
        .expect("quadrature should succeed");
    (fast, slow)
}

/// Emitter on the coverslip surface. Without a specimen path the pupil phase
/// is smooth over the whole aperture, so both methods agree to rounding.
#[test]
fn test_particle_on_surface() {
    let params = MicroscopeParameters::default();
    let scan = FocalScan::new(standard_radii(), standard_offsets());
    let (fast, slow) = run_both(&params, &scan);
    assert_grids_close(&fast, &slow, 1e-10, 1e-10);
}

/// Emitter inside the specimen: adds the spherical aberration of the
/// oil/water mismatch.
#[test]
fn test_particle_above_surface() {
    let params = MicroscopeParameters::default();
    let scan = FocalScan::new(standard_radii(), standard_offsets()).with_particle_depth(0.5);
    let (fast, slow) = run_both(&params, &scan);
    assert_grids_close(&fast, &slow, 1e-4, 1e-4);
}

#[test]
fn test_shallow_particle() {
    let params = MicroscopeParameters::default();
    let scan = FocalScan::new(standard_radii(), standard_offsets()).with_particle_depth(0.1);
    let (fast, slow) = run_both(&params, &scan);
    assert_grids_close(&fast, &slow, 1e-4, 1e-4);
}

/// Detector 1 mm behind the design tube length.
#[test]
fn test_detector_offset() {
    let params = MicroscopeParameters::default();
    let scan = FocalScan::new(standard_radii(), standard_offsets())
        .with_detector_position(params.zd0 + 1000.0);
    let (fast, slow) = run_both(&params, &scan);
    assert_grids_close(&fast, &slow, 1e-10, 1e-10);
}

/// Slightly wrong immersion oil and a thicker coverslip.
#[test]
fn test_mismatched_immersion_and_coverslip() {
    let params = MicroscopeParameters {
        ni: 1.518,
        tg: 172.0,
        ..Default::default()
    };
    let scan = FocalScan::new(standard_radii(), standard_offsets()).with_particle_depth(0.2);
    let (fast, slow) = run_both(&params, &scan);
    assert_grids_close(&fast, &slow, 1e-3, 1e-3);
}

/// Shortest wavelength the basis spacing was tuned for.
#[test]
fn test_blue_emission() {
    let params = MicroscopeParameters::default();
    let scan = FocalScan::new(standard_radii(), standard_offsets()).with_wavelength(0.436);
    let (fast, slow) = run_both(&params, &scan);
    assert_grids_close(&fast, &slow, 1e-4, 1e-4);
}
