use serde::{Deserialize, Serialize};

use crate::cell::{Centering, UnitCell};
use crate::interfaces::SymmetryOperations;

/// Systematic absences due to lattice centering only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CenteringAbsences;

impl SymmetryOperations for CenteringAbsences {
    fn is_forbidden_reflection(&self, cell: &UnitCell, h: i32, k: i32, l: i32) -> bool {
        forbidden_by_centering(cell.centering(), h, k, l)
    }
}

/// Whether centering `cen` extinguishes reflection (h, k, l).
pub fn forbidden_by_centering(cen: Centering, h: i32, k: i32, l: i32) -> bool {
    match cen {
        Centering::Primitive | Centering::Rhombohedral => false,
        Centering::ACentered => (k + l) % 2 != 0,
        Centering::BCentered => (h + l) % 2 != 0,
        Centering::CCentered => (h + k) % 2 != 0,
        Centering::BodyCentered => (h + k + l) % 2 != 0,
        // All even or all odd
        Centering::FaceCentered => !all_same_parity(h, k, l),
        // Obverse setting
        Centering::Hexagonal => (-h + k + l) % 3 != 0,
    }
}

fn all_same_parity(h: i32, k: i32, l: i32) -> bool {
    let p = |x: i32| x.rem_euclid(2);
    p(h) == p(k) && p(k) == p(l)
}
