// Symmetries module: the default symmetry collaborator used during prediction.
// Full point-group handling lives outside this crate; only centering absences are provided here.

// ======================== MODULE DECLARATIONS ========================
pub mod absences;


// ======================== SYSTEMATIC ABSENCES ========================
pub use absences::{
    CenteringAbsences,     // struct - SymmetryOperations impl using the cell's centering
    forbidden_by_centering, // fn(cen: Centering, h, k, l) -> bool - centering extinction rule
};
