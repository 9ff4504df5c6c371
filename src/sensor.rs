//! MERIS band tables and the fixed spectra used by the retrieval.

use std::fmt::Display;

pub const NUM_BANDS: usize = 15;

/// Number of reference pixels in one reference set.
pub const NUM_REF_PIXELS: usize = 5;

/// Band centre wavelengths (nm), MERIS bands 1 to 15.
pub const MERIS_WAVELENGTHS: [f64; NUM_BANDS] = [
    412.545, 442.401, 489.744, 509.7, 559.634, 619.62, 664.64, 680.902, 708.426, 753.472, 761.606,
    778.498, 864.833, 884.849, 899.86,
];

/// Nominal MERIS solar fluxes (mW m-2 nm-1) used when the scene does not carry its own.
pub const NOMINAL_SOLAR_FLUX: [f64; NUM_BANDS] = [
    1714.9, 1872.4, 1926.6, 1930.2, 1804.2, 1651.5, 1531.4, 1475.6, 1408.9, 1265.5, 1255.4, 1178.0,
    955.1, 914.2, 882.8,
];

// NDVI bands (0-based) and their solar irradiance normalisation.
pub const NDVI_RED_BAND: usize = 7;
pub const NDVI_NIR_BAND: usize = 9;
pub const SOLAR_IRRADIANCE_RED: f64 = 1424.7742;
pub const SOLAR_IRRADIANCE_NIR: f64 = 1225.6102;

/// Bands used for the reference-set NDVI seed of the refinement.
pub const SEED_RED_BAND: usize = 7;
pub const SEED_NIR_BAND: usize = 12;

/// Window band and absorption band of the water vapour ratio.
pub const WV_WINDOW_BAND: usize = 13;
pub const WV_ABSORPTION_BAND: usize = 14;

/// Oxygen A and water vapour absorption bands, never inverted to reflectance.
pub const O2_BAND: usize = 10;
pub const NOT_INVERTED_BANDS: [usize; 2] = [O2_BAND, WV_ABSORPTION_BAND];

/// 443 nm band, written only on request.
pub const BAND_443NM: usize = 1;

/// Vegetation endmember spectra tried by the refinement.
pub const RHO_VEG_ALL: [[f64; NUM_BANDS]; 3] = [
    [
        0.0235, 0.0382, 0.0319, 0.0342, 0.0526, 0.0425, 0.0371, 0.0369, 0.0789, 0.3561, 0.3698,
        0.3983, 0.4248, 0.4252, 0.4254,
    ],
    [
        0.0206, 0.04120, 0.0445, 0.0498, 0.0728, 0.0821, 0.0847, 0.0870, 0.1301, 0.1994, 0.2020,
        0.2074, 0.2365, 0.2419, 0.2459,
    ],
    [
        0.0138, 0.0158, 0.0188, 0.021, 0.0395, 0.0279, 0.0211, 0.0206, 0.0825, 0.2579, 0.2643,
        0.2775, 0.3201, 0.3261, 0.3307,
    ],
];

/// Bare soil endmember spectrum.
pub const RHO_SOIL: [f64; NUM_BANDS] = [
    0.0490, 0.0860, 0.1071, 0.1199, 0.1679, 0.2425, 0.2763, 0.2868, 0.3148, 0.3470, 0.3498, 0.3558,
    0.3984, 0.4062, 0.4120,
];

/// Per-band chi-square weights. Zero for the two absorption bands.
pub const WL_CENTER_INV: [f64; NUM_BANDS] = [
    14.2274, 11.5368, 8.50600, 1.96148, 1.78669, 1.61394, 1.50473, 4.65445, 1.41177, 3.10430, 0.0,
    1.28467, 1.15624, 1.13002, 0.0,
];

/// Per-pixel chi-square weights of a reference set.
pub const REF_PIXEL_WEIGHTS: [f64; NUM_REF_PIXELS] = [2.0, 2.0, 1.5, 1.5, 1.0];

/// AOT at 550 nm, one row per elevation layer, one column per visibility node.
pub const AOT_GRID: [[f64; 7]; 3] = [
    [
        0.673345, 0.472727, 0.324623, 0.220397, 0.136966, 0.0900341, 0.0586890,
    ],
    [
        0.597473, 0.420376, 0.289417, 0.197476, 0.123751, 0.0822952, 0.0545618,
    ],
    [
        0.402420, 0.285551, 0.199061, 0.138343, 0.089596, 0.0623010, 0.0439519,
    ],
];

/// Which bands end up in the reflectance product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputBands {
    include_443nm: bool,
}

impl OutputBands {
    pub fn new(include_443nm: bool) -> Self {
        Self { include_443nm }
    }

    pub fn contains(&self, band: usize) -> bool {
        if band >= NUM_BANDS || NOT_INVERTED_BANDS.contains(&band) {
            return false;
        }
        band != BAND_443NM || self.include_443nm
    }

    /// 0-based indices of the written bands, in band order.
    pub fn indices(&self) -> Vec<usize> {
        (0..NUM_BANDS).filter(|&b| self.contains(b)).collect()
    }
}

impl Display for OutputBands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bands: Vec<usize> = self.indices().iter().map(|b| b + 1).collect();
        write!(f, "MERIS bands {:?}", bands)
    }
}
