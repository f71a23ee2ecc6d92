
//! Diffraction geometry core
//!
//! This library provides unit cell normalisation and Bravais classification, matching of
//! autoindexed cells against reference cells, and Ewald-sphere reflection prediction with
//! partiality and polarisation modelling for pulsed-source (FEL) crystallography.

pub mod cell;
pub mod config;
pub mod error;
pub mod geometry;
pub mod interfaces;
pub mod symmetries;

pub use error::CellError;

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, CellError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
