use nalgebra::Vector3;

use crate::cell::{angle_between, UnitCell};
use crate::geometry::beam::Beam;
use crate::geometry::reflection::ReflectionList;

/// Polarisation factor for reciprocal lattice point `q`, beam fully polarised along x.
pub fn polarisation_factor(q: &Vector3<f64>, wavelength: f64) -> f64 {
    let diffracted = q + Vector3::new(0.0, 0.0, 1.0 / wavelength);
    let tt = angle_between(&Vector3::z(), &diffracted);
    let phi = q.y.atan2(q.x);

    let pa = (phi.sin() * tt.sin()).powi(2);
    let pb = tt.cos().powi(2);
    1.0 - 2.0 * (1.0 - pa) + (1.0 + pb)
}

/// Divide every intensity in `list` by its polarisation factor.
pub fn polarisation_correction(list: &mut ReflectionList, cell: &UnitCell, beam: &Beam) {
    for refl in list.iter_mut() {
        let hkl = refl.indices();
        let q = cell.reciprocal_position(hkl.h, hkl.k, hkl.l);
        refl.intensity /= polarisation_factor(&q, beam.wavelength);
    }
}
