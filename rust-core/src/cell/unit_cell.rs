use log::{info, warn};
use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use crate::cell::base_matrix::BaseMatrix;
use crate::cell::cell_types::{classify, is_bravais_lattice, Centering, LatticeType, UniqueAxis};
use crate::error::CellError;
use crate::interfaces::Space;
use crate::Result;

/// A unit cell: direct basis (meters, columns a, b, c) with its reciprocal basis
/// (m^-1, columns a*, b*, c*, crystallographic convention without 2π) kept alongside.
///
/// Cells are values. Every transformation returns a fresh cell.
///
/// Only the direct basis is serialized; the reciprocal one is rebuilt on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UnitCellRecord", into = "UnitCellRecord")]
pub struct UnitCell {
    direct: BaseMatrix,
    reciprocal: BaseMatrix,
    lattice_type: LatticeType,
    centering: Centering,
    unique_axis: UniqueAxis,
    point_group: String,
}

#[derive(Serialize, Deserialize)]
struct UnitCellRecord {
    direct: Matrix3<f64>,
    lattice_type: LatticeType,
    centering: Centering,
    unique_axis: UniqueAxis,
    point_group: String,
}

impl TryFrom<UnitCellRecord> for UnitCell {
    type Error = CellError;

    fn try_from(record: UnitCellRecord) -> Result<Self> {
        let mut cell = Self::from_direct_matrix(record.direct)?;
        cell.lattice_type = record.lattice_type;
        cell.centering = record.centering;
        cell.unique_axis = record.unique_axis;
        cell.point_group = record.point_group;
        Ok(cell)
    }
}

impl From<UnitCell> for UnitCellRecord {
    fn from(cell: UnitCell) -> Self {
        UnitCellRecord {
            direct: *cell.direct.base_matrix(),
            lattice_type: cell.lattice_type,
            centering: cell.centering,
            unique_axis: cell.unique_axis,
            point_group: cell.point_group,
        }
    }
}

impl UnitCell {
    fn from_bases(direct: BaseMatrix, reciprocal: BaseMatrix) -> Self {
        UnitCell {
            direct,
            reciprocal,
            lattice_type: LatticeType::Triclinic,
            centering: Centering::Primitive,
            unique_axis: UniqueAxis::Unknown,
            point_group: "1".to_string(),
        }
    }

    /// Construct a cell from its direct-space basis matrix (columns a, b, c).
    pub fn from_direct_matrix(direct: Matrix3<f64>) -> Result<Self> {
        let direct = BaseMatrix::from_matrix(direct, Space::Direct)?;
        let reciprocal = direct.dual()?;
        Ok(Self::from_bases(direct, reciprocal))
    }

    /// Construct a cell from its reciprocal-space basis matrix (columns a*, b*, c*).
    pub fn from_reciprocal_matrix(reciprocal: Matrix3<f64>) -> Result<Self> {
        let reciprocal = BaseMatrix::from_matrix(reciprocal, Space::Reciprocal)?;
        let direct = reciprocal.dual()?;
        Ok(Self::from_bases(direct, reciprocal))
    }

    pub fn from_direct_axes(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> Result<Self> {
        Self::from_direct_matrix(Matrix3::from_columns(&[a, b, c]))
    }

    pub fn from_reciprocal_axes(
        a_star: Vector3<f64>,
        b_star: Vector3<f64>,
        c_star: Vector3<f64>,
    ) -> Result<Self> {
        Self::from_reciprocal_matrix(Matrix3::from_columns(&[a_star, b_star, c_star]))
    }

    /// Construct a cell from lengths (m) and angles (rad).
    ///
    /// a lies along x and b in the xy plane. Lattice type is left triclinic P; use
    /// [`UnitCell::classified`] to derive it from the parameters.
    pub fn from_parameters(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Result<Self> {
        if !(a > 0.0 && b > 0.0 && c > 0.0) {
            return Err(CellError::InvalidCellGeometry(format!(
                "cell lengths must be positive (got {a:e}, {b:e}, {c:e})"
            )));
        }
        if !angles_are_sensible(alpha, beta, gamma) {
            return Err(CellError::InvalidCellGeometry(format!(
                "cell angles {:.2}, {:.2}, {:.2} deg are not sensible",
                alpha.to_degrees(),
                beta.to_degrees(),
                gamma.to_degrees()
            )));
        }

        let (ca, cb, cg) = (alpha.cos(), beta.cos(), gamma.cos());
        let sg = gamma.sin();
        let radicand = 1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg;
        if radicand <= 0.0 {
            return Err(CellError::InvalidCellGeometry(
                "cell angles give a zero or imaginary volume".to_string(),
            ));
        }

        let av = Vector3::new(a, 0.0, 0.0);
        let bv = Vector3::new(b * cg, b * sg, 0.0);
        let cv = Vector3::new(c * cb, c * (ca - cb * cg) / sg, c * radicand.sqrt() / sg);

        Self::from_direct_axes(av, bv, cv)
    }

    /// Returns a copy with lattice type and unique axis derived from the parameters.
    pub fn classified(mut self) -> Self {
        let (a, b, c, al, be, ga) = self.parameters();
        let (lattice_type, unique_axis) = classify(a, b, c, al, be, ga);
        self.lattice_type = lattice_type;
        self.unique_axis = unique_axis;
        self
    }

    pub fn with_lattice_type(mut self, lattice_type: LatticeType) -> Self {
        self.lattice_type = lattice_type;
        self
    }

    pub fn with_centering(mut self, centering: Centering) -> Self {
        self.centering = centering;
        self
    }

    pub fn with_unique_axis(mut self, unique_axis: UniqueAxis) -> Self {
        self.unique_axis = unique_axis;
        self
    }

    pub fn with_point_group(mut self, point_group: impl Into<String>) -> Self {
        self.point_group = point_group.into();
        self
    }

    /// Copy the classification (lattice type, centering, unique axis, point group) of `other`.
    pub fn with_metadata_of(mut self, other: &UnitCell) -> Self {
        self.lattice_type = other.lattice_type;
        self.centering = other.centering;
        self.unique_axis = other.unique_axis;
        self.point_group = other.point_group.clone();
        self
    }

    pub fn lattice_type(&self) -> LatticeType {
        self.lattice_type
    }

    pub fn centering(&self) -> Centering {
        self.centering
    }

    pub fn unique_axis(&self) -> UniqueAxis {
        self.unique_axis
    }

    pub fn point_group(&self) -> &str {
        &self.point_group
    }

    /// Direct basis vectors as columns (m)
    pub fn direct_basis(&self) -> &Matrix3<f64> {
        self.direct.base_matrix()
    }

    /// Reciprocal basis vectors as columns (m^-1, no 2π)
    pub fn reciprocal_basis(&self) -> &Matrix3<f64> {
        self.reciprocal.base_matrix()
    }

    /// Reciprocal basis in the physics convention, 2π (A^-1)^T
    pub fn reciprocal_2pi(&self) -> Matrix3<f64> {
        (2.0 * PI) * self.reciprocal.base_matrix()
    }

    pub fn direct_vectors(&self) -> [Vector3<f64>; 3] {
        self.direct.base_vectors()
    }

    pub fn reciprocal_vectors(&self) -> [Vector3<f64>; 3] {
        self.reciprocal.base_vectors()
    }

    /// Lengths a, b, c (m)
    pub fn lattice_parameters(&self) -> (f64, f64, f64) {
        let metric = self.direct.metric();
        (
            metric[(0, 0)].sqrt(),
            metric[(1, 1)].sqrt(),
            metric[(2, 2)].sqrt(),
        )
    }

    /// Angles α, β, γ (rad)
    pub fn lattice_angles(&self) -> (f64, f64, f64) {
        let [a, b, c] = self.direct_vectors();
        (angle_between(&b, &c), angle_between(&a, &c), angle_between(&a, &b))
    }

    /// (a, b, c, α, β, γ) in meters and radians
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let (a, b, c) = self.lattice_parameters();
        let (al, be, ga) = self.lattice_angles();
        (a, b, c, al, be, ga)
    }

    pub fn volume(&self) -> f64 {
        self.direct.determinant().abs()
    }

    /// Position of reciprocal lattice point (h, k, l) in m^-1
    pub fn reciprocal_position(&self, h: i32, k: i32, l: i32) -> Vector3<f64> {
        self.reciprocal.base_matrix() * Vector3::new(h as f64, k as f64, l as f64)
    }

    /// sin(θ)/λ = 1/2d for reflection (h, k, l), in m^-1. Multiply by two for 1/d.
    pub fn resolution(&self, h: i32, k: i32, l: i32) -> f64 {
        self.reciprocal_position(h, k, l).norm() / 2.0
    }

    /// Cell angle check (Foadi and Evans, 2011).
    pub fn is_sensible(&self) -> bool {
        let (al, be, ga) = self.lattice_angles();
        angles_are_sensible(al, be, ga)
    }

    /// Whether the legal Bravais table admits this cell's classification.
    pub fn is_bravais_lattice(&self) -> bool {
        is_bravais_lattice(self.lattice_type, self.centering, self.unique_axis)
    }

    /// Handedness from (a×b)·c, computed independently from the direct and reciprocal bases.
    ///
    /// # Panics
    /// Panics if the two bases disagree, which means the cell was constructed inconsistently.
    pub fn is_right_handed(&self) -> bool {
        let [a_star, b_star, c_star] = self.reciprocal_vectors();
        let rh_reciprocal = right_handed_vectors(&a_star, &b_star, &c_star);

        let [a, b, c] = self.direct_vectors();
        let rh_direct = right_handed_vectors(&a, &b, &c);

        assert_eq!(
            rh_reciprocal, rh_direct,
            "Direct and reciprocal bases disagree about handedness"
        );
        rh_direct
    }

    /// Rotate the cell by a quaternion, keeping its classification.
    pub fn rotated(&self, quat: &UnitQuaternion<f64>) -> Result<UnitCell> {
        let rotated = quat.to_rotation_matrix().matrix() * self.direct_basis();
        Ok(Self::from_direct_matrix(rotated)?.with_metadata_of(self))
    }

    /// Rotate the reciprocal basis by ω about +z, then φ about +x, then `rot` about the new +z.
    ///
    /// Rotations are passive (the coordinate frame turns by the given angles).
    pub fn rotated_euler(&self, omega: f64, phi: f64, rot: f64) -> Result<UnitCell> {
        let rz_omega = Rotation3::from_axis_angle(&Vector3::z_axis(), -omega);
        let rx_phi = Rotation3::from_axis_angle(&Vector3::x_axis(), -phi);
        let rz_rot = Rotation3::from_axis_angle(&Vector3::z_axis(), -rot);
        let rotation = rz_rot * rx_phi * rz_omega;

        let reciprocal = rotation.matrix() * self.reciprocal_basis();
        Ok(Self::from_reciprocal_matrix(reciprocal)?.with_metadata_of(self))
    }
}

impl fmt::Display for UnitCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.lattice_type, self.centering)?;
        if self.lattice_type.has_unique_axis() {
            write!(f, ", unique axis {}", self.unique_axis)?;
        }
        if self.is_right_handed() {
            write!(f, ", right handed")?;
        } else {
            write!(f, ", left handed")?;
        }
        writeln!(f, ", point group '{}'.", self.point_group)?;

        let (a, b, c, al, be, ga) = self.parameters();
        writeln!(f, "  a     b     c         alpha   beta  gamma")?;
        writeln!(
            f,
            "{:5.2} {:5.2} {:5.2} nm    {:6.2} {:6.2} {:6.2} deg",
            a * 1e9,
            b * 1e9,
            c * 1e9,
            al.to_degrees(),
            be.to_degrees(),
            ga.to_degrees()
        )?;

        for (name, v) in ["a", "b", "c"].iter().zip(self.direct_vectors().iter()) {
            writeln!(f, "{} = {:10.3e} {:10.3e} {:10.3e} m", name, v.x, v.y, v.z)?;
        }
        for (name, v) in ["astar", "bstar", "cstar"]
            .iter()
            .zip(self.reciprocal_vectors().iter())
        {
            writeln!(
                f,
                "{} = {:10.3e} {:10.3e} {:10.3e} m^-1 (modulus = {:10.3e} m^-1)",
                name,
                v.x,
                v.y,
                v.z,
                v.norm()
            )?;
        }
        Ok(())
    }
}

/// Dump a cell to the log for diagnostics.
pub fn log_cell(cell: &UnitCell) {
    for line in cell.to_string().lines() {
        info!("{}", line);
    }
}

/// Run the crystallographic validity checks, warning about each failure.
///
/// Returns true if every check passed.
pub fn validate_cell(cell: &UnitCell) -> bool {
    let mut ok = true;

    if !cell.is_sensible() {
        warn!("Unit cell parameters are not sensible.");
        ok = false;
    }

    if !cell.is_bravais_lattice() {
        warn!("Unit cell is not a conventional Bravais lattice.");
        ok = false;
    }

    if !cell.is_right_handed() {
        warn!("Unit cell is not right handed.");
        ok = false;
    }

    if !ok {
        log_cell(cell);
    }
    ok
}

/// The four spherical-triangle conditions on the cell angles, plus NaN rejection.
pub fn angles_are_sensible(al: f64, be: f64, ga: f64) -> bool {
    if al.is_nan() || be.is_nan() || ga.is_nan() {
        return false;
    }
    [al + be + ga, al + be - ga, al - be + ga, -al + be + ga]
        .iter()
        .all(|&s| s > 0.0 && s < 2.0 * PI)
}

/// (a×b)·c > 0
pub fn right_handed_vectors(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> bool {
    a.cross(b).dot(c) > 0.0
}

/// Angle between two vectors in radians, in [0, π].
pub fn angle_between(u: &Vector3<f64>, v: &Vector3<f64>) -> f64 {
    let cos = u.dot(v) / (u.norm() * v.norm());
    cos.clamp(-1.0, 1.0).acos()
}
