// Definitions that are used throughout all modules, including the narrow interfaces
// through which the prediction engine talks to its collaborators.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::cell::UnitCell;

// Enumeration to track the space a basis lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Space {
    Direct,
    Reciprocal,
}

/// Systematic absence test for a cell.
pub trait SymmetryOperations {
    /// True if (h, k, l) cannot be observed for this cell (e.g. centering absences).
    fn is_forbidden_reflection(&self, cell: &UnitCell, h: i32, k: i32, l: i32) -> bool;
}

/// Position of a predicted spot on the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorPosition {
    pub panel: usize,
    pub fs: f64,
    pub ss: f64,
}

/// Projection of reciprocal-space positions onto detector pixels.
pub trait DetectorModel {
    /// Project the reciprocal lattice point `q` (m^-1) for incident wavenumber `k` (1/λ).
    ///
    /// Returns `None` when no panel, or more than one panel, claims the point.
    fn locate_peak(&self, q: &Vector3<f64>, k: f64) -> Option<DetectorPosition>;

    /// Largest scattering vector modulus (m^-1) visible anywhere on the detector.
    fn largest_q(&self, wavelength: f64) -> f64;
}
