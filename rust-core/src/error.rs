use thiserror::Error;

use crate::cell::{Centering, LatticeType, UniqueAxis};

/// Failures surfaced by cell construction, validation and matching.
///
/// Per-reflection rejections during prediction are not errors: they are logged and the
/// reflection is skipped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CellError {
    #[error("Invalid unit cell geometry: {0}")]
    InvalidCellGeometry(String),

    #[error("Not a Bravais lattice: {lattice} {centering} (unique axis {unique_axis})")]
    NotBravais {
        lattice: LatticeType,
        centering: Centering,
        unique_axis: UniqueAxis,
    },

    #[error("Basis vectors are either linearly dependent or too close to zero")]
    SingularBasis,

    #[error("No cell correspondence satisfies the tolerances")]
    NoMatch,

    #[error("Parse error: {0}")]
    Parse(String),
}
