use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::BASE_VECTOR_TOLERANCE;
use crate::error::CellError;
use crate::interfaces::Space;
use crate::Result;

/// A validated, invertible 3×3 basis with its vectors stored as columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BaseMatrixRecord", into = "BaseMatrixRecord")]
pub struct BaseMatrix {
    base_matrix: Matrix3<f64>,
    space: Space,
}

/// Wire form; deserialized data goes back through [`BaseMatrix::from_matrix`].
#[derive(Serialize, Deserialize)]
struct BaseMatrixRecord {
    base_matrix: Matrix3<f64>,
    space: Space,
}

impl TryFrom<BaseMatrixRecord> for BaseMatrix {
    type Error = CellError;

    fn try_from(record: BaseMatrixRecord) -> Result<Self> {
        Self::from_matrix(record.base_matrix, record.space)
    }
}

impl From<BaseMatrix> for BaseMatrixRecord {
    fn from(basis: BaseMatrix) -> Self {
        BaseMatrixRecord {
            base_matrix: basis.base_matrix,
            space: basis.space,
        }
    }
}

impl BaseMatrix {
    pub fn from_base_vectors(
        base_1: Vector3<f64>,
        base_2: Vector3<f64>,
        base_3: Vector3<f64>,
        space: Space,
    ) -> Result<Self> {
        // Pre-Construct the base matrix for operations
        let preliminary_base_matrix = Matrix3::from_columns(&[base_1, base_2, base_3]);

        if base_1.iter().chain(base_2.iter()).chain(base_3.iter()).any(|x| !x.is_finite()) {
            return Err(CellError::InvalidCellGeometry(
                "Base vectors contain non-finite components.".to_string(),
            ));
        }

        // Linearly non-dependent, relative to the scale of the vectors (cells are in meters)
        let scale = base_1.norm() * base_2.norm() * base_3.norm();
        if scale == 0.0 || preliminary_base_matrix.determinant().abs() < BASE_VECTOR_TOLERANCE * scale {
            return Err(CellError::SingularBasis);
        }

        Ok(BaseMatrix {
            base_matrix: preliminary_base_matrix,
            space,
        })
    }

    pub fn from_matrix(matrix: Matrix3<f64>, space: Space) -> Result<Self> {
        Self::from_base_vectors(
            matrix.column(0).clone_owned(),
            matrix.column(1).clone_owned(),
            matrix.column(2).clone_owned(),
            space,
        )
    }

    /// Converts to the dual basis (inverse transpose, no 2π factor).
    ///
    /// A direct basis yields the reciprocal one and vice versa.
    pub fn dual(&self) -> Result<BaseMatrix> {
        let inverse = self.base_matrix.try_inverse().ok_or(CellError::SingularBasis)?;

        Self::from_matrix(
            inverse.transpose(),
            match self.space {
                Space::Direct => Space::Reciprocal,
                Space::Reciprocal => Space::Direct,
            },
        )
    }

    pub fn base_matrix(&self) -> &Matrix3<f64> {
        &self.base_matrix
    }

    pub fn space(&self) -> Space {
        self.space
    }

    pub fn determinant(&self) -> f64 {
        self.base_matrix.determinant()
    }

    pub fn metric(&self) -> Matrix3<f64> {
        self.base_matrix.transpose() * self.base_matrix
    }

    pub fn base_vectors(&self) -> [Vector3<f64>; 3] {
        [
            self.base_matrix.column(0).clone_owned(),
            self.base_matrix.column(1).clone_owned(),
            self.base_matrix.column(2).clone_owned(),
        ]
    }
}
