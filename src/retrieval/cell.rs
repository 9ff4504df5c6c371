use crate::lut::AtmosphericLut;
use crate::sensor::NUM_BANDS;
use crate::solar::relative_azimuth;

use super::Geometry;

/// Classification flag bits.
pub const FLAG_INVALID: u32 = 1 << 0;
pub const FLAG_CLOUD: u32 = 1 << 1;
pub const FLAG_WATER: u32 = 1 << 3;

/// Decides from the classification flags whether a pixel takes part in the retrieval.
pub trait ClearPixelStrategy: Send + Sync {
    fn is_clear(&self, flags: u32) -> bool;
}

/// Cloud-free, valid land pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearLandPixels;

impl ClearPixelStrategy for ClearLandPixels {
    fn is_clear(&self, flags: u32) -> bool {
        flags & (FLAG_INVALID | FLAG_CLOUD | FLAG_WATER) == 0
    }
}

/// Cloud-free, valid pixels over land or water.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearLandAndWaterPixels;

impl ClearPixelStrategy for ClearLandAndWaterPixels {
    fn is_clear(&self, flags: u32) -> bool {
        flags & (FLAG_INVALID | FLAG_CLOUD) == 0
    }
}

/// Raw inputs of one cell, row-major, one entry per pixel.
#[derive(Debug, Clone, Default)]
pub struct CellInputs {
    pub width: usize,
    pub height: usize,
    pub radiance: Vec<[f64; NUM_BANDS]>,
    /// Metres above sea level.
    pub elevation: Vec<f64>,
    pub sun_zenith: Vec<f64>,
    pub view_zenith: Vec<f64>,
    pub sun_azimuth: Vec<f64>,
    pub view_azimuth: Vec<f64>,
    pub flags: Vec<u32>,
}

/// A cell ready for retrieval: TOA values, elevation in km clamped to the LUT,
/// illumination cosines and the clear-pixel statistics.
#[derive(Debug, Clone)]
pub struct CellData {
    pub width: usize,
    pub height: usize,
    pub geometry: Geometry,
    pub toa: Vec<[f64; NUM_BANDS]>,
    pub hsurf: Vec<f64>,
    pub cos_sza: Vec<f64>,
    pub clear: Vec<bool>,
    pub hsurf_mean: f64,
    pub cos_sza_mean: f64,
    /// Smallest positive TOA value of each band over the whole cell.
    pub toa_min: [f64; NUM_BANDS],
    pub clear_fraction: f64,
}

impl CellData {
    /// `toa_scale` converts radiance to TOA units, see [`crate::solar::toa_scale_factor`].
    pub fn prepare(
        inputs: &CellInputs,
        lut: &AtmosphericLut,
        strategy: &dyn ClearPixelStrategy,
        toa_scale: f64,
    ) -> Self {
        let hsf_domain = lut.hsf_domain();
        let n = inputs.width * inputs.height;

        let toa: Vec<[f64; NUM_BANDS]> = inputs
            .radiance
            .iter()
            .map(|&rad| rad.map(|r| r * toa_scale))
            .collect();

        let hsurf: Vec<f64> = inputs
            .elevation
            .iter()
            .map(|&dem| {
                if dem.is_finite() {
                    hsf_domain.clamp(0.001 * dem)
                } else {
                    hsf_domain.min
                }
            })
            .collect();

        let cos_sza: Vec<f64> = inputs
            .sun_zenith
            .iter()
            .map(|sza| sza.to_radians().cos())
            .collect();

        let clear: Vec<bool> = inputs.flags.iter().map(|&f| strategy.is_clear(f)).collect();
        let clear_count = clear.iter().filter(|&&c| c).count();

        let mut toa_min = [f64::MAX; NUM_BANDS];
        for pixel in &toa {
            for (band, &value) in pixel.iter().enumerate() {
                if value.is_finite() && value > 0.0 && value < toa_min[band] {
                    toa_min[band] = value;
                }
            }
        }

        let centre = (inputs.height / 2) * inputs.width + inputs.width / 2;
        let geometry = Geometry {
            vza: inputs.view_zenith[centre],
            sza: inputs.sun_zenith[centre],
            raa: relative_azimuth(inputs.view_azimuth[centre], inputs.sun_azimuth[centre]),
        };

        let hsurf_mean =
            clear_mean(&hsurf, &clear).unwrap_or(hsf_domain.min);
        let cos_sza_mean =
            clear_mean(&cos_sza, &clear).unwrap_or_else(|| geometry.sza.to_radians().cos());

        Self {
            width: inputs.width,
            height: inputs.height,
            geometry,
            toa,
            hsurf,
            cos_sza,
            clear,
            hsurf_mean,
            cos_sza_mean,
            toa_min,
            clear_fraction: if n == 0 {
                0.0
            } else {
                clear_count as f64 / n as f64
            },
        }
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when strictly more than `fraction` of the pixels are clear.
    pub fn is_clear_above(&self, fraction: f64) -> bool {
        self.clear_fraction > fraction
    }
}

// Mean over clear pixels with a finite value.
fn clear_mean(values: &[f64], clear: &[bool]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .zip(clear)
        .filter(|(v, c)| **c && v.is_finite())
        .fold((0.0, 0usize), |(s, n), (v, _)| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}
