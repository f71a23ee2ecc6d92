use log::{debug, error};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::cell::log_cell;
use crate::config::{DEFAULT_MAX_RESOLUTION, MAX_MILLER_INDEX};
use crate::error::CellError;
use crate::geometry::beam::Beam;
use crate::geometry::crystal::Crystal;
use crate::geometry::partiality::{partiality, PartialityModel};
use crate::geometry::reflection::{MillerIndex, Reflection, ReflectionList};
use crate::interfaces::{DetectorModel, SymmetryOperations};
use crate::symmetries::CenteringAbsences;
use crate::Result;

/// Convergence statistics from one [`update_partialities`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialityUpdate {
    pub n_gained: usize,
    pub n_lost: usize,
    /// Mean |Δpartiality| over reflections excited after the update
    pub mean_change: f64,
}

/// Excitation test for the reciprocal lattice point `q` of reflection (h, k, l).
///
/// Returns `None` if the point is not excited, projects off the detector, or fails the
/// r_low >= r_high consistency check.
pub fn check_reflection(
    crystal: &Crystal,
    beam: &Beam,
    detector: Option<&dyn DetectorModel>,
    model: PartialityModel,
    hkl: MillerIndex,
    q: &Vector3<f64>,
) -> Option<Reflection> {
    if hkl.is_origin() {
        return None;
    }

    let pr = crystal.profile_radius;
    let del = beam.divergence + crystal.mosaicity;

    // "low" is the largest sphere (short wavelength), "high" the smallest
    let klow = beam.k_low();
    let khigh = beam.k_high();

    // Backscattering
    if q.z < -khigh / 2.0 {
        return None;
    }

    let tl = q.x.hypot(q.y);

    let (sin_half, cos_half) = (del / 2.0).sin_cos();
    let rhigh = khigh - (tl + sin_half * khigh).hypot(q.z + cos_half * khigh);
    let rlow = klow - (tl - sin_half * klow).hypot(q.z + cos_half * klow);

    if rlow < rhigh {
        error!(
            "Reflection with rlow < rhigh: {} rlow = {:e}, rhigh = {:e}",
            hkl, rlow, rhigh
        );
        error!(
            "div + m = {:e}, R = {:e}, bw = {:e}",
            del, pr, beam.bandwidth
        );
        return None;
    }

    // Entirely outside the excitation band on one side
    if rlow.is_sign_negative() == rhigh.is_sign_negative() && rlow.abs() > pr && rhigh.abs() > pr
    {
        return None;
    }

    let mut refl = Reflection::new(hkl);

    if let Some(det) = detector {
        refl.detector_position = Some(det.locate_peak(q, beam.k())?);
    }

    refl.set_partial(rlow, rhigh, partiality(model, rlow, rhigh, pr));
    refl.lorentz = 1.0;
    refl.symmetric_indices = hkl;
    refl.redundancy = 1;

    Some(refl)
}

/// Predict the reflections excited for `crystal` under `beam`, using centering absences.
pub fn find_intersections(
    crystal: &Crystal,
    beam: &Beam,
    detector: Option<&dyn DetectorModel>,
    model: PartialityModel,
) -> Result<ReflectionList> {
    find_intersections_with_symmetry(crystal, beam, detector, model, &CenteringAbsences)
}

/// As [`find_intersections`], with a caller-supplied absence test.
pub fn find_intersections_with_symmetry(
    crystal: &Crystal,
    beam: &Beam,
    detector: Option<&dyn DetectorModel>,
    model: PartialityModel,
    symmetry: &dyn SymmetryOperations,
) -> Result<ReflectionList> {
    let cell = &crystal.cell;

    if !cell.is_sensible() {
        error!("Invalid unit cell parameters given to find_intersections");
        log_cell(cell);
        return Err(CellError::InvalidCellGeometry(
            "cell angles are not sensible".to_string(),
        ));
    }

    let mres = detector
        .map(|det| det.largest_q(beam.wavelength))
        .unwrap_or(DEFAULT_MAX_RESOLUTION);

    let [a, b, c] = cell.direct_vectors();
    let mut hmax = (mres * a.norm()) as i32;
    let mut kmax = (mres * b.norm()) as i32;
    let mut lmax = (mres * c.norm()) as i32;

    if hmax > MAX_MILLER_INDEX || kmax > MAX_MILLER_INDEX || lmax > MAX_MILLER_INDEX {
        error!(
            "Unit cell is too large - will only integrate reflections up to {}th order.",
            MAX_MILLER_INDEX
        );
        log_cell(cell);
        hmax = hmax.min(MAX_MILLER_INDEX);
        kmax = kmax.min(MAX_MILLER_INDEX);
        lmax = lmax.min(MAX_MILLER_INDEX);
    }

    debug!("Searching index box +/-{} +/-{} +/-{}", hmax, kmax, lmax);

    let mut reflections = ReflectionList::new();
    for h in -hmax..=hmax {
        for k in -kmax..=kmax {
            for l in -lmax..=lmax {
                if symmetry.is_forbidden_reflection(cell, h, k, l) {
                    continue;
                }

                let q = cell.reciprocal_position(h, k, l);
                let hkl = MillerIndex::new(h, k, l);
                if let Some(refl) = check_reflection(crystal, beam, detector, model, hkl, &q) {
                    reflections.insert(refl);
                }
            }
        }
    }

    debug!("Predicted {} reflections", reflections.len());
    Ok(reflections)
}

/// Recompute excitation for the reflections already held by `crystal`.
///
/// No new indices are discovered. Reflections that stop being excited get partiality 0 and
/// redundancy 0; those that start being excited get redundancy 1.
pub fn update_partialities(
    crystal: &mut Crystal,
    beam: &Beam,
    detector: Option<&dyn DetectorModel>,
    model: PartialityModel,
) -> PartialityUpdate {
    let mut stats = PartialityUpdate::default();

    if model == PartialityModel::Unity {
        for refl in crystal.reflections.iter_mut() {
            refl.partiality = 1.0;
            refl.lorentz = 1.0;
        }
        return stats;
    }

    // Predictions borrow the crystal immutably, so collect them before writing back
    let current: &Crystal = crystal;
    let predictions: Vec<(MillerIndex, Option<Reflection>)> = current
        .reflections
        .iter()
        .map(|refl| {
            let hkl = refl.symmetric_indices;
            let q = current.cell.reciprocal_position(hkl.h, hkl.k, hkl.l);
            let vals = check_reflection(current, beam, detector, model, hkl, &q);
            (refl.indices(), vals)
        })
        .collect();

    let mut total_change = 0.0;
    let mut n = 0usize;

    for (index, vals) in predictions {
        let Some(refl) = crystal.reflections.find_mut(index.h, index.k, index.l) else {
            continue;
        };

        match vals {
            None => {
                if refl.redundancy != 0 {
                    stats.n_lost += 1;
                    refl.partiality = 0.0;
                    refl.redundancy = 0;
                }
            }
            Some(vals) => {
                if refl.redundancy == 0 {
                    stats.n_gained += 1;
                    refl.redundancy = 1;
                }

                let old_p = refl.partiality;
                refl.set_partial(vals.r_low, vals.r_high, vals.partiality);
                refl.lorentz = vals.lorentz;
                refl.detector_position = vals.detector_position;

                total_change += (vals.partiality - old_p).abs();
                n += 1;
            }
        }
    }

    stats.mean_change = if n > 0 { total_change / n as f64 } else { 0.0 };
    debug!(
        "Partiality update: {} gained, {} lost, mean change {:e}",
        stats.n_gained, stats.n_lost, stats.mean_change
    );
    stats
}
