//! Geometry module: Ewald-sphere prediction, partiality models and intensity corrections.
//!
//! Quick reference
//! - Inputs: [`Beam`], [`Crystal`], [`Detector`] / [`Panel`]
//! - Prediction: [`find_intersections`], [`update_partialities`]
//! - Profiles: [`PartialityModel`], [`sphere_fraction`], [`gaussian_fraction`]
//! - Corrections: [`polarisation_correction`]

// ======================== MODULE DECLARATIONS ========================
pub mod beam;
pub mod crystal;
pub mod detector;
pub mod ewald;
pub mod partiality;
pub mod polarisation;
pub mod reflection;

// Test modules
mod _tests_detector;
mod _tests_ewald;
mod _tests_polarisation;

// ======================== INPUTS ========================
pub use beam::Beam;
pub use crystal::Crystal;
pub use detector::{scattering_vector, Detector, Panel};

// ======================== REFLECTIONS ========================
pub use reflection::{
    res_cutoff,        // filtered copy between two 1/d limits
    resolution_limits, // (min, max) 1/d over a list
    MillerIndex,
    Reflection,
    ReflectionList,
};

// ======================== PREDICTION ========================
pub use ewald::{
    check_reflection,                 // excitation test for one lattice point
    find_intersections,               // predict with centering absences
    find_intersections_with_symmetry, // predict with a custom absence test
    update_partialities,              // re-evaluate an existing list
    PartialityUpdate,
};

pub use partiality::{gaussian_fraction, partiality, sphere_fraction, PartialityModel};

// ======================== CORRECTIONS ========================
pub use polarisation::{polarisation_correction, polarisation_factor};
