use serde::{Deserialize, Serialize};

use crate::cell::UnitCell;
use crate::geometry::reflection::ReflectionList;

/// An oriented crystal: cell (whose Cartesian axes carry the orientation), mosaic spread,
/// reflection profile radius and the reflections predicted or measured for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crystal {
    pub cell: UnitCell,
    /// Mosaic spread in radians
    pub mosaicity: f64,
    /// Reflection profile radius in m^-1
    pub profile_radius: f64,
    pub reflections: ReflectionList,
}

impl Crystal {
    pub fn new(cell: UnitCell, mosaicity: f64, profile_radius: f64) -> Self {
        Crystal {
            cell,
            mosaicity,
            profile_radius,
            reflections: ReflectionList::new(),
        }
    }

    pub fn with_reflections(mut self, reflections: ReflectionList) -> Self {
        self.reflections = reflections;
        self
    }
}
