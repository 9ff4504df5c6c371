//! Cell and pixel retrieval
//!
//! Per cell: visibility from the dark-target search and the reference-pixel
//! refinement, AOT at 550 nm from visibility and elevation. Per pixel: water
//! vapour from the band 14/13 ratio and surface reflectance by inverting the
//! radiative-transfer equation.

pub mod aot;
pub mod cell;
pub mod error;
pub mod grids;
pub mod processor;
pub mod reference_pixels;
pub mod reflectance;
pub mod refinement;
pub mod visibility;
pub mod water_vapour;

pub use aot::AotConverter;
pub use cell::{CellData, CellInputs, ClearLandAndWaterPixels, ClearLandPixels, ClearPixelStrategy};
pub use error::SceneError;
pub use grids::RadiativeTransferGrids;
pub use processor::{BandRaster, ProcessingOptions, Scene, SceneProcessor, SceneResult};
pub use reflectance::PixelResult;

use crate::lut::LutPoint;

/// Canonical visibility (km), used as refinement seed and reflectance fallback.
pub const VIS_INIT: f64 = 23.0;

/// Canonical water vapour column (g/cm2).
pub const WV_INIT: f64 = 2.0;

/// Absolute tolerance of the water vapour root search.
pub const WV_TOLERANCE: f64 = 1.0e-4;
pub const WV_MAX_ITER: usize = 10_000;

/// Fractional tolerance of the reference-pixel minimisation.
pub const POWELL_FTOL: f64 = 1.0e-4;

pub const VISIBILITY_NODATA: f64 = 0.0;
pub const AOT_NODATA: f64 = 0.0;

/// Written to reflectance and water vapour of pixels that were not corrected.
pub const AC_NODATA: f64 = -1.0;

/// Representative viewing and illumination geometry of a cell, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub vza: f64,
    pub sza: f64,
    pub raa: f64,
}

impl Geometry {
    pub fn at(&self, hsf: f64, vis: f64, cwv: f64) -> LutPoint {
        LutPoint {
            vza: self.vza,
            sza: self.sza,
            raa: self.raa,
            hsf,
            vis,
            cwv,
        }
    }
}
