//! Cell module: unit cells, Bravais classification, uncentering and cell matching.
//!
//! Quick reference
//! - Types: [`UnitCell`], [`LatticeType`], [`Centering`], [`UniqueAxis`], [`BaseMatrix`]
//! - Classification: [`classify`], [`is_bravais_lattice`]
//! - Reduction: [`uncenter_cell`]
//! - Matching: [`match_cell`], [`match_cell_ab`], [`MatchTolerances`], [`CandidateMode`]
//! - Records: [`cell_from_cryst1`], [`cell_from_pdb_text`]

// ======================== MODULE DECLARATIONS ========================
pub mod base_matrix;
pub mod cell_matching;
pub mod cell_types;
pub mod pdb;
pub mod uncenter;
pub mod unit_cell;


// ======================== CELL VALUE TYPE ========================
#[doc(inline)]
pub use unit_cell::UnitCell;
// UnitCell impl methods:
//   from_parameters(a, b, c, alpha, beta, gamma) -> Result<Self>   - lengths in m, angles in rad
//   from_direct_axes(a, b, c) / from_reciprocal_axes(a*, b*, c*)  - from basis vectors
//   classified(self) -> Self                                      - derive lattice type + unique axis
//   parameters(&self) -> (a, b, c, alpha, beta, gamma)
//   reciprocal_position(&self, h, k, l) -> Vector3<f64>            - h a* + k b* + l c*
//   resolution(&self, h, k, l) -> f64                              - sin(theta)/lambda
//   is_sensible / is_bravais_lattice / is_right_handed
//   rotated(&self, quat) / rotated_euler(&self, omega, phi, rot)  - fresh rotated copies

pub use base_matrix::BaseMatrix;

pub use unit_cell::{
    angle_between, angles_are_sensible, log_cell, right_handed_vectors, validate_cell,
};

// ======================== CLASSIFICATION ========================
pub use cell_types::{classify, is_bravais_lattice, Centering, LatticeType, UniqueAxis};

// ======================== REDUCTION & MATCHING ========================
pub use uncenter::uncenter_cell;

pub use cell_matching::{
    generate_candidates, match_cell, match_cell_ab, within_tolerance, CandidateList,
    CandidateMode, CandidateVector, CellMatch, MatchTolerances, Multiplier,
};

// ======================== RECORDS ========================
pub use pdb::{cell_from_cryst1, cell_from_pdb_text};
