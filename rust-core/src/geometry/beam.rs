use serde::{Deserialize, Serialize};

use crate::error::CellError;
use crate::Result;

/// Per-shot radiation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    /// Wavelength λ in meters
    pub wavelength: f64,
    /// Bandwidth as a fraction of the wavelength (FWHM of a top hat)
    pub bandwidth: f64,
    /// Divergence in radians
    pub divergence: f64,
}

impl Beam {
    pub fn new(wavelength: f64, bandwidth: f64, divergence: f64) -> Result<Self> {
        if !(wavelength > 0.0 && wavelength.is_finite()) {
            return Err(CellError::InvalidCellGeometry(format!(
                "wavelength must be positive (got {wavelength:e} m)"
            )));
        }
        if !(0.0..2.0).contains(&bandwidth) || divergence < 0.0 {
            return Err(CellError::InvalidCellGeometry(format!(
                "bandwidth {bandwidth} and divergence {divergence} must be non-negative and bandwidth below 2"
            )));
        }
        Ok(Beam {
            wavelength,
            bandwidth,
            divergence,
        })
    }

    /// Monochromatic, parallel beam.
    pub fn monochromatic(wavelength: f64) -> Result<Self> {
        Self::new(wavelength, 0.0, 0.0)
    }

    /// Incident wavenumber 1/λ (m^-1)
    pub fn k(&self) -> f64 {
        1.0 / self.wavelength
    }

    /// Wavenumber of the short-wavelength edge of the band, the largest Ewald sphere
    pub fn k_low(&self) -> f64 {
        1.0 / (self.wavelength - self.wavelength * self.bandwidth / 2.0)
    }

    /// Wavenumber of the long-wavelength edge of the band, the smallest Ewald sphere
    pub fn k_high(&self) -> f64 {
        1.0 / (self.wavelength + self.wavelength * self.bandwidth / 2.0)
    }
}
