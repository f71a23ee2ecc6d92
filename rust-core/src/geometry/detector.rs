use nalgebra::{Matrix2, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::CellError;
use crate::interfaces::{DetectorModel, DetectorPosition};
use crate::Result;

/// One flat detector panel perpendicular to the beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub name: String,
    pub min_fs: f64,
    pub max_fs: f64,
    pub min_ss: f64,
    pub max_ss: f64,
    /// Position of the (min_fs, min_ss) corner relative to the beam, in pixels
    pub corner: Vector2<f64>,
    /// Camera length in meters
    pub clen: f64,
    /// Pixels per meter
    pub res: f64,
    /// Lab-frame (x, y) step per fast-scan pixel
    pub fs_direction: Vector2<f64>,
    /// Lab-frame (x, y) step per slow-scan pixel
    pub ss_direction: Vector2<f64>,
    // Maps a lab offset from the corner back to (fs, ss)
    inverse: Matrix2<f64>,
}

impl Panel {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        fs_range: (f64, f64),
        ss_range: (f64, f64),
        corner: Vector2<f64>,
        clen: f64,
        res: f64,
        fs_direction: Vector2<f64>,
        ss_direction: Vector2<f64>,
    ) -> Result<Self> {
        let name = name.into();
        if clen <= 0.0 || res <= 0.0 {
            return Err(CellError::InvalidCellGeometry(format!(
                "panel {name}: camera length and resolution must be positive"
            )));
        }
        let forward = Matrix2::from_columns(&[fs_direction, ss_direction]);
        let inverse = forward.try_inverse().ok_or_else(|| {
            CellError::InvalidCellGeometry(format!(
                "panel {name}: fast and slow scan directions are parallel"
            ))
        })?;

        Ok(Panel {
            name,
            min_fs: fs_range.0,
            max_fs: fs_range.1,
            min_ss: ss_range.0,
            max_ss: ss_range.1,
            corner,
            clen,
            res,
            fs_direction,
            ss_direction,
            inverse,
        })
    }

    /// Panel pixel coordinates of a point given in lab-frame pixels relative to the beam.
    pub fn lab_to_pixel(&self, xd: f64, yd: f64) -> (f64, f64) {
        let rel = Vector2::new(xd, yd) - self.corner;
        let fs_ss = self.inverse * rel;
        (fs_ss.x + self.min_fs, fs_ss.y + self.min_ss)
    }

    /// Lab-frame position (meters) of a panel pixel.
    pub fn pixel_to_lab(&self, fs: f64, ss: f64) -> Vector3<f64> {
        let xy = self.corner
            + self.fs_direction * (fs - self.min_fs)
            + self.ss_direction * (ss - self.min_ss);
        Vector3::new(xy.x / self.res, xy.y / self.res, self.clen)
    }

    pub fn contains(&self, fs: f64, ss: f64) -> bool {
        fs >= self.min_fs && fs <= self.max_fs && ss >= self.min_ss && ss <= self.max_ss
    }

    fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_fs, self.min_ss),
            (self.max_fs, self.min_ss),
            (self.min_fs, self.max_ss),
            (self.max_fs, self.max_ss),
        ]
    }
}

/// Scattering vector (m^-1) for a diffracted ray hitting `lab` (meters), with wavenumber `k`.
pub fn scattering_vector(lab: &Vector3<f64>, k: f64) -> Vector3<f64> {
    let twotheta = lab.xy().norm().atan2(lab.z);
    let az = lab.y.atan2(lab.x);
    Vector3::new(
        k * twotheta.sin() * az.cos(),
        k * twotheta.sin() * az.sin(),
        k * (twotheta.cos() - 1.0),
    )
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    pub panels: Vec<Panel>,
}

impl Detector {
    pub fn new(panels: Vec<Panel>) -> Self {
        Detector { panels }
    }
}

impl DetectorModel for Detector {
    fn locate_peak(&self, q: &Vector3<f64>, k: f64) -> Option<DetectorPosition> {
        let den = k + q.z;
        let mut found = None;

        for (i, p) in self.panels.iter().enumerate() {
            // Position relative to the direct beam in pixels
            let xd = p.clen * q.x / den * p.res;
            let yd = p.clen * q.y / den * p.res;

            let (fs, ss) = p.lab_to_pixel(xd, yd);
            if !p.contains(fs, ss) {
                continue;
            }

            // Claimed by two panels
            if found.is_some() {
                return None;
            }
            found = Some(DetectorPosition { panel: i, fs, ss });
        }

        found
    }

    fn largest_q(&self, wavelength: f64) -> f64 {
        let k = 1.0 / wavelength;
        self.panels
            .iter()
            .flat_map(|p| p.corners().map(|(fs, ss)| p.pixel_to_lab(fs, ss)))
            .map(|lab| scattering_vector(&lab, k).norm())
            .fold(0.0, f64::max)
    }
}
