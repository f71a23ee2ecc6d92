use log::error;
use nalgebra::Vector3;

use crate::cell::cell_types::{Centering, LatticeType, UniqueAxis};
use crate::cell::unit_cell::UnitCell;
use crate::error::CellError;
use crate::Result;

/// Turn any conventional cell into a primitive one, e.g. for comparison purposes.
///
/// P and R cells are returned unchanged. Otherwise the axes are first cycled so that the
/// centred face of an A/B cell, or the unique axis of an I/F/H cell, ends up on c. The
/// fixed centering transform is then applied to the direct basis:
///
/// | centering | new a, b, c | result |
/// |---|---|---|
/// | I | (−a+b+c)/2, (a−b+c)/2, (a+b−c)/2 | rhombohedral R if cubic, else triclinic P |
/// | F | (b+c)/2, (a+c)/2, (a+b)/2 | rhombohedral R if cubic, else triclinic P |
/// | C | (a+b)/2, (−a+b)/2, c | monoclinic P, unique axis c |
/// | H | (2a+b+c)/3, (−a+b+c)/3, (−a−2b+c)/3 | rhombohedral R |
///
/// # Errors
/// [`CellError::NotBravais`] if the classification is not a legal Bravais lattice.
pub fn uncenter_cell(input: &UnitCell) -> Result<UnitCell> {
    let lattice = input.lattice_type();
    let unique_axis = input.unique_axis();
    let centering = input.centering();

    if !input.is_bravais_lattice() {
        error!("Cannot uncenter: not a Bravais lattice.");
        return Err(CellError::NotBravais {
            lattice,
            centering,
            unique_axis,
        });
    }

    if matches!(centering, Centering::Primitive | Centering::Rhombohedral) {
        return Ok(input.clone());
    }

    let [a, b, c] = input.direct_vectors();
    let ([a, b, c], centering) = move_unique_axis_to_c([a, b, c], centering, unique_axis);

    const H: f64 = 0.5;
    const OT: f64 = 1.0 / 3.0;
    const TT: f64 = 2.0 / 3.0;

    let (reduced_lattice, reduced_centering) = primitive_of(lattice);

    let (axes, new_lattice, new_centering, new_axis) = match centering {
        Centering::BodyCentered => (
            [(-a + b + c) * H, (a - b + c) * H, (a + b - c) * H],
            reduced_lattice,
            reduced_centering,
            UniqueAxis::Unknown,
        ),

        Centering::FaceCentered => (
            [(b + c) * H, (a + c) * H, (a + b) * H],
            reduced_lattice,
            reduced_centering,
            UniqueAxis::Unknown,
        ),

        Centering::CCentered => (
            [(a + b) * H, (-a + b) * H, c],
            LatticeType::Monoclinic,
            Centering::Primitive,
            UniqueAxis::C,
        ),

        Centering::Hexagonal => (
            [
                a * TT + b * OT + c * OT,
                -a * OT + b * OT + c * OT,
                -a * OT - b * TT + c * OT,
            ],
            LatticeType::Rhombohedral,
            Centering::Rhombohedral,
            UniqueAxis::Unknown,
        ),

        // A and B were relabelled to C above; P and R returned early
        other => {
            error!("Invalid centering '{}'", other);
            return Err(CellError::NotBravais {
                lattice,
                centering: other,
                unique_axis,
            });
        }
    };

    let [na, nb, nc] = axes;
    Ok(UnitCell::from_direct_axes(na, nb, nc)?
        .with_lattice_type(new_lattice)
        .with_centering(new_centering)
        .with_unique_axis(new_axis))
}

/// Cubic I/F cells reduce to primitive rhombohedral; everything else to triclinic P.
fn primitive_of(lattice: LatticeType) -> (LatticeType, Centering) {
    if lattice == LatticeType::Cubic {
        (LatticeType::Rhombohedral, Centering::Rhombohedral)
    } else {
        (LatticeType::Triclinic, Centering::Primitive)
    }
}

/// Cycle the axes (preserving handedness) so that the centred face of an A/B cell, or
/// the unique axis of an I/F/H cell, sits on c. The centering letter follows the axes.
///
/// Face-centred cells are rotated by their centering letter alone: an orthorhombic cell
/// has no meaningful unique axis, and a monoclinic one already has it on the centred face.
fn move_unique_axis_to_c(
    [a, b, c]: [Vector3<f64>; 3],
    centering: Centering,
    unique_axis: UniqueAxis,
) -> ([Vector3<f64>; 3], Centering) {
    match centering {
        // (a, b, c) -> (b, c, a)
        Centering::ACentered => ([b, c, a], Centering::CCentered),
        // (a, b, c) -> (c, a, b)
        Centering::BCentered => ([c, a, b], Centering::CCentered),
        Centering::CCentered => ([a, b, c], centering),
        _ => match unique_axis {
            UniqueAxis::A => ([b, c, a], centering),
            UniqueAxis::B => ([c, a, b], centering),
            _ => ([a, b, c], centering),
        },
    }
}
