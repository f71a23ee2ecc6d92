use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{CLASSIFY_ANGLE_TOLERANCE_DEG, CLASSIFY_LENGTH_TOLERANCE};

/// The seven lattice systems used for conventional cells.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LatticeType {
    Triclinic,
    Monoclinic,
    Orthorhombic,
    Tetragonal,
    Rhombohedral,
    Hexagonal,
    Cubic,
}

impl LatticeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LatticeType::Triclinic => "triclinic",
            LatticeType::Monoclinic => "monoclinic",
            LatticeType::Orthorhombic => "orthorhombic",
            LatticeType::Tetragonal => "tetragonal",
            LatticeType::Rhombohedral => "rhombohedral",
            LatticeType::Hexagonal => "hexagonal",
            LatticeType::Cubic => "cubic",
        }
    }

    /// Whether the unique axis is meaningful for this lattice type.
    pub fn has_unique_axis(&self) -> bool {
        matches!(
            self,
            LatticeType::Monoclinic | LatticeType::Tetragonal | LatticeType::Hexagonal
        )
    }
}

impl fmt::Display for LatticeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lattice centerings, identified by their conventional letters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Centering {
    Primitive,    // P
    ACentered,    // A
    BCentered,    // B
    CCentered,    // C
    BodyCentered, // I
    FaceCentered, // F
    Hexagonal,    // H
    Rhombohedral, // R
}

impl Centering {
    pub fn as_char(&self) -> char {
        match self {
            Centering::Primitive => 'P',
            Centering::ACentered => 'A',
            Centering::BCentered => 'B',
            Centering::CCentered => 'C',
            Centering::BodyCentered => 'I',
            Centering::FaceCentered => 'F',
            Centering::Hexagonal => 'H',
            Centering::Rhombohedral => 'R',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(Centering::Primitive),
            'A' => Some(Centering::ACentered),
            'B' => Some(Centering::BCentered),
            'C' => Some(Centering::CCentered),
            'I' => Some(Centering::BodyCentered),
            'F' => Some(Centering::FaceCentered),
            'H' => Some(Centering::Hexagonal),
            'R' => Some(Centering::Rhombohedral),
            _ => None,
        }
    }
}

impl fmt::Display for Centering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Unique axis of a monoclinic, tetragonal or hexagonal cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UniqueAxis {
    A,
    B,
    C,
    Unknown,
}

impl UniqueAxis {
    pub fn as_char(&self) -> char {
        match self {
            UniqueAxis::A => 'a',
            UniqueAxis::B => 'b',
            UniqueAxis::C => 'c',
            UniqueAxis::Unknown => '?',
        }
    }
}

impl fmt::Display for UniqueAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Derive the lattice type and unique axis from cell parameters.
///
/// Lengths are in meters, angles in radians. Angles are compared in degrees with
/// [`CLASSIFY_ANGLE_TOLERANCE_DEG`], lengths with [`CLASSIFY_LENGTH_TOLERANCE`].
pub fn classify(
    a: f64,
    b: f64,
    c: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
) -> (LatticeType, UniqueAxis) {
    let (al, be, ga) = (alpha.to_degrees(), beta.to_degrees(), gamma.to_degrees());

    // Check length relationships
    let a_eq_b = lengths_equal(a, b);
    let b_eq_c = lengths_equal(b, c);
    let a_eq_c = lengths_equal(a, c);

    // Check angle relationships
    let al_90 = angle_is(al, 90.0);
    let be_90 = angle_is(be, 90.0);
    let ga_90 = angle_is(ga, 90.0);
    let all_90 = al_90 && be_90 && ga_90;

    if a_eq_b && a_eq_c {
        // Cubic: a = b = c, α = β = γ = 90°
        if all_90 {
            return (LatticeType::Cubic, UniqueAxis::Unknown);
        }
        // Rhombohedral: a = b = c, α = β = γ ≠ 90°
        if angle_is(al, be) && angle_is(al, ga) {
            return (LatticeType::Rhombohedral, UniqueAxis::Unknown);
        }
    }

    if all_90 {
        if b_eq_c {
            return (LatticeType::Tetragonal, UniqueAxis::A);
        }
        if a_eq_c {
            return (LatticeType::Tetragonal, UniqueAxis::B);
        }
        if a_eq_b {
            return (LatticeType::Tetragonal, UniqueAxis::C);
        }
        return (LatticeType::Orthorhombic, UniqueAxis::Unknown);
    }

    let n_right = [al_90, be_90, ga_90].iter().filter(|&&r| r).count();

    if n_right == 2 {
        // Hexagonal: the odd angle is 120° and the two lengths it spans are equal
        if angle_is(al, 120.0) && b_eq_c {
            return (LatticeType::Hexagonal, UniqueAxis::A);
        }
        if angle_is(be, 120.0) && a_eq_c {
            return (LatticeType::Hexagonal, UniqueAxis::B);
        }
        if angle_is(ga, 120.0) && a_eq_b {
            return (LatticeType::Hexagonal, UniqueAxis::C);
        }

        // Monoclinic: the unique axis faces the non-right angle
        let unique_axis = if !al_90 {
            UniqueAxis::A
        } else if !be_90 {
            UniqueAxis::B
        } else {
            UniqueAxis::C
        };
        return (LatticeType::Monoclinic, unique_axis);
    }

    (LatticeType::Triclinic, UniqueAxis::Unknown)
}

/// Whether a lattice type / centering / unique axis combination is a conventional
/// Bravais lattice.
pub fn is_bravais_lattice(
    lattice: LatticeType,
    centering: Centering,
    unique_axis: UniqueAxis,
) -> bool {
    match centering {
        Centering::Primitive => true,

        Centering::ACentered | Centering::BCentered | Centering::CCentered => match lattice {
            LatticeType::Monoclinic => matches!(
                (centering, unique_axis),
                (Centering::ACentered, UniqueAxis::A)
                    | (Centering::BCentered, UniqueAxis::B)
                    | (Centering::CCentered, UniqueAxis::C)
            ),
            LatticeType::Orthorhombic => true,
            _ => false,
        },

        Centering::BodyCentered => matches!(
            lattice,
            LatticeType::Orthorhombic | LatticeType::Tetragonal | LatticeType::Cubic
        ),

        Centering::FaceCentered => {
            matches!(lattice, LatticeType::Orthorhombic | LatticeType::Cubic)
        }

        Centering::Hexagonal => lattice == LatticeType::Hexagonal,

        // Primitive rhombohedral setting, as produced by uncentering
        Centering::Rhombohedral => lattice == LatticeType::Rhombohedral,
    }
}

fn lengths_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < CLASSIFY_LENGTH_TOLERANCE
}

fn angle_is(angle_deg: f64, target_deg: f64) -> bool {
    (angle_deg - target_deg).abs() < CLASSIFY_ANGLE_TOLERANCE_DEG
}
