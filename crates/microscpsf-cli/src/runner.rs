//! Scan runner: ties together the job configuration, the fast evaluator and
//! the output writers.

use std::path::Path;

use anyhow::{Context, Result};

use microscpsf_core::evaluator::fast::{FastPsfEvaluator, FocalScanResult};
use microscpsf_core::types::{FocalScan, PsfGrid};

use crate::config::JobConfig;

/// Build the evaluator described by the `[evaluator]` table.
pub fn build_evaluator(job: &JobConfig) -> FastPsfEvaluator {
    FastPsfEvaluator::new(job.evaluator.num_basis, job.evaluator.rho_samples)
        .with_parallel(job.evaluator.parallel)
}

/// Parse and validate a job without evaluating it.
pub fn validate_job(job: &JobConfig) -> Result<FocalScan> {
    job.microscope
        .validate()
        .context("Invalid [microscope] table")?;
    let scan = job.focal_scan().context("Invalid [scan] table")?;
    scan.validate(&job.microscope)
        .context("Invalid [scan] table")?;
    Ok(scan)
}

/// Run a full focal scan from a parsed job configuration.
pub fn run_scan(job: &JobConfig) -> Result<FocalScanResult> {
    let scan = validate_job(job)?;
    println!(
        "  Grid: {} axial offsets x {} radii (depth={} µm, λ={} µm)",
        scan.axial_offsets.len(),
        scan.radii.len(),
        scan.particle_depth,
        scan.wavelength
    );

    let evaluator = build_evaluator(job);
    log::info!(
        "evaluator: {} basis terms, {} pupil samples, parallel={}",
        evaluator.num_basis,
        evaluator.rho_samples,
        evaluator.parallel
    );
    let result = evaluator
        .evaluate_detailed(&job.microscope, &scan)
        .context("PSF evaluation failed")?;

    let diag = &result.diagnostics;
    println!(
        "  Basis fit: rank {}/{}, max residual {:.3e}",
        diag.rank, diag.num_basis, diag.max_residual
    );
    for w in &diag.warnings {
        println!("  Warning: {w}");
    }
    Ok(result)
}

/// Write a PSF grid to CSV with a metadata header.
///
/// The first row after the header holds the radii; every following row
/// starts with its axial offset.
pub fn write_psf_csv(psf: &PsfGrid, path: &Path, job: &JobConfig) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;

    let m = &job.microscope;
    writeln!(file, "# microscpsf focal scan (Gibson-Lanni, Fourier-Bessel)")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(
        file,
        "# M={}, NA={}, ns={}, ni={}, ni0={}, ng={}, ng0={}",
        m.magnification, m.numerical_aperture, m.ns, m.ni, m.ni0, m.ng, m.ng0
    )?;
    writeln!(
        file,
        "# ti0={} µm, tg={} µm, tg0={} µm, zd0={} µm",
        m.ti0, m.tg, m.tg0, m.zd0
    )?;
    writeln!(
        file,
        "# particle_depth={} µm, wavelength={} µm",
        job.scan.particle_depth, job.scan.wavelength
    )?;
    if let Some(zd) = job.scan.detector_position {
        writeln!(file, "# detector_position={} µm", zd)?;
    }
    writeln!(file, "#")?;

    let header: Vec<String> = psf.radii.iter().map(|r| format!("{r:.6}")).collect();
    writeln!(file, "axial_offset_um\\radius_um,{}", header.join(","))?;

    for (i, z) in psf.axial_offsets.iter().enumerate() {
        let row: Vec<String> = psf
            .radial_profile(i)
            .iter()
            .map(|v| format!("{v:.8e}"))
            .collect();
        writeln!(file, "{z:.6},{}", row.join(","))?;
    }

    println!("PSF grid written to: {}", path.display());
    Ok(())
}

/// Write a PSF grid to JSON.
pub fn write_psf_json(psf: &PsfGrid, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(psf)?;
    std::fs::write(path, json).with_context(|| format!("Cannot write {}", path.display()))?;

    println!("PSF JSON written to: {}", path.display());
    Ok(())
}
