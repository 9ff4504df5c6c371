//! Radiative-transfer lookup table: binary loading and multilinear interpolation.

pub mod error;
pub mod frac_index;
pub mod lookup_table;

pub use error::{LutError, LutFormatError};
pub use frac_index::FracIndex;
pub use lookup_table::{AtmosphericLut, Domain, LutAxes, LutPoint, LutSpectrum, NUM_PARAMS};

#[cfg(test)]
pub(crate) mod test_support;
