use log::{debug, error, warn};

use crate::cell::cell_types::Centering;
use crate::cell::unit_cell::{validate_cell, UnitCell};
use crate::error::CellError;
use crate::Result;

const ANGSTROM: f64 = 1e-10;

/// Parse a single PDB `CRYST1` record.
///
/// Lengths are read in Å and angles in degrees from their fixed columns. The centering is
/// the first letter of the space group (column 55) when the record is long enough,
/// otherwise the cell is left primitive with point group "1". The lattice type is
/// classified from the parameters.
pub fn cell_from_cryst1(line: &str) -> Result<UnitCell> {
    if !line.starts_with("CRYST1") {
        return Err(CellError::Parse("not a CRYST1 record".to_string()));
    }

    let field = |range: std::ops::Range<usize>| -> Result<f64> {
        let text = line
            .get(range.clone())
            .ok_or_else(|| CellError::Parse(format!("CRYST1 record too short for columns {range:?}")))?;
        text.trim()
            .parse::<f64>()
            .map_err(|e| CellError::Parse(format!("couldn't understand '{}': {}", text, e)))
    };

    let a = field(6..15)?;
    let b = field(15..24)?;
    let c = field(24..33)?;
    let al = field(33..40)?;
    let be = field(40..47)?;
    let ga = field(47..54)?;
    debug!("CRYST1: {a} {b} {c} / {al} {be} {ga}");

    let mut cell = UnitCell::from_parameters(
        a * ANGSTROM,
        b * ANGSTROM,
        c * ANGSTROM,
        al.to_radians(),
        be.to_radians(),
        ga.to_radians(),
    )?
    .classified();

    // Column 55 counts once the record reaches 65 characters, line terminator excluded
    if line.trim_end_matches(|c| c == '\r' || c == '\n').len() >= 65 {
        let letter = line.get(55..).and_then(|s| s.chars().next()).unwrap_or(' ');
        let centering = Centering::from_char(letter)
            .ok_or_else(|| CellError::Parse(format!("unknown centering '{letter}'")))?;
        cell = cell.with_centering(centering);
    } else {
        error!("CRYST1 line without centering.");
        cell = cell.with_point_group("1");
    }

    validate_cell(&cell);
    Ok(cell)
}

/// Find and parse the first understandable `CRYST1` record in PDB text.
pub fn cell_from_pdb_text(text: &str) -> Result<UnitCell> {
    for line in text.lines().filter(|l| l.starts_with("CRYST1")) {
        match cell_from_cryst1(line) {
            Ok(cell) => return Ok(cell),
            Err(e) => warn!("Couldn't understand CRYST1 line: {}", e),
        }
    }
    Err(CellError::Parse("no usable CRYST1 record".to_string()))
}
