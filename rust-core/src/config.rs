// Constants

// Tolerances
pub const BASE_VECTOR_TOLERANCE: f64 = 1e-10; // Relative: |det| / (|a||b||c|) below this is singular
pub const CLASSIFY_ANGLE_TOLERANCE_DEG: f64 = 0.005; // Half the 0.01° printing granularity of cell records
pub const CLASSIFY_LENGTH_TOLERANCE: f64 = 5e-14; // Meters, half of 0.001 Å
pub const AB_MATCH_LENGTH_TOLERANCE: f64 = 5.0; // Percent, for match_cell_ab

// Cell matching
pub const MAX_CANDIDATES: usize = 1024; // Per target axis
pub const LENGTH_WEIGHT: f64 = 1e-8; // Weight of length deviations relative to angles in the FOM

// Prediction
pub const MAX_MILLER_INDEX: i32 = 511;
pub const DEFAULT_MAX_RESOLUTION: f64 = 1e10; // m^-1 (1/d = 1 Å^-1), used without a detector
pub const GAUSSIAN_PROFILE_WIDTHS: f64 = 2.6; // Profile radius in units of sigma
