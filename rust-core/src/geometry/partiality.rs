use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use statrs::function::erf::erf;

use crate::config::GAUSSIAN_PROFILE_WIDTHS;

/// Shape of the reflection profile used to turn excitation errors into a partiality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartialityModel {
    /// Every excited reflection is fully recorded
    Unity,
    /// Uniform sphere of radius equal to the profile radius
    #[default]
    Sphere,
    /// Gaussian with the profile radius at 2.6 sigma
    Gaussian,
}

// Excitation errors closer than this (m^-1) are treated as a single Ewald sphere
const DEGENERATE_BAND: f64 = 1e-9;

fn clamp_excitation(rlow: f64, rhigh: f64, pr: f64) -> (f64, f64) {
    // Beyond the profile the sphere only just touches the reflection
    (rlow.clamp(-pr, pr), rhigh.clamp(-pr, pr))
}

/// Fraction of a uniform spherical profile of radius `pr` swept between the two spheres.
pub fn sphere_fraction(rlow: f64, rhigh: f64, pr: f64) -> f64 {
    let (rlow, rhigh) = clamp_excitation(rlow, rhigh, pr);

    let qlow = (rlow + pr) / (2.0 * pr);
    let qhigh = (rhigh + pr) / (2.0 * pr);

    let plow = 3.0 * qlow * qlow - 2.0 * qlow * qlow * qlow;
    let phigh = 3.0 * qhigh * qhigh - 2.0 * qhigh * qhigh * qhigh;

    plow - phigh
}

/// Fraction of a Gaussian profile (sigma = `pr`/2.6) swept between the two spheres.
pub fn gaussian_fraction(rlow: f64, rhigh: f64, pr: f64) -> f64 {
    let sigma = pr / GAUSSIAN_PROFILE_WIDTHS;
    let (rlow, rhigh) = clamp_excitation(rlow, rhigh, pr);

    let plow = 0.5 * (1.0 + erf(rlow / (sigma * 2f64.sqrt())));
    let phigh = 0.5 * (1.0 + erf(rhigh / (sigma * 2f64.sqrt())));

    plow - phigh
}

/// Partiality of a reflection with excitation errors `rlow` >= `rhigh` and profile radius `pr`.
///
/// The swept fraction is normalised by the band width Δ = rlow - rhigh. With a monochromatic,
/// parallel beam and no mosaicity the band collapses; the limit Δ -> 0 is used instead.
pub fn partiality(model: PartialityModel, rlow: f64, rhigh: f64, pr: f64) -> f64 {
    let delta = rlow - rhigh;

    match model {
        PartialityModel::Unity => 1.0,
        PartialityModel::Sphere if delta.abs() < DEGENERATE_BAND => {
            let r = rlow.clamp(-pr, pr);
            let q = (r + pr) / (2.0 * pr);
            4.0 * q * (1.0 - q)
        }
        PartialityModel::Sphere => 4.0 * sphere_fraction(rlow, rhigh, pr) * pr / (3.0 * delta),
        PartialityModel::Gaussian if delta.abs() < DEGENERATE_BAND => {
            let sigma = pr / GAUSSIAN_PROFILE_WIDTHS;
            let r = rlow.clamp(-pr, pr);
            let density = (-r * r / (2.0 * sigma * sigma)).exp() / (sigma * (2.0 * PI).sqrt());
            4.0 * pr * density / 3.0
        }
        PartialityModel::Gaussian => {
            4.0 * gaussian_fraction(rlow, rhigh, pr) * pr / (3.0 * delta)
        }
    }
}
