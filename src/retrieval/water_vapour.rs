use crate::lut::{FracIndex, LutSpectrum};
use crate::math::{RootOutcome, find_root};
use crate::sensor::{MERIS_WAVELENGTHS, NUM_BANDS, WV_ABSORPTION_BAND, WV_WINDOW_BAND};

use super::grids::PixelTerms;
use super::{WV_INIT, WV_MAX_ITER, WV_TOLERANCE};

/// Surface reflectance of the window band and the reflectance extrapolated to
/// the absorption band, from the atmosphere at the canonical visibility and
/// water vapour.
pub fn window_reflectance(canonical: &LutSpectrum, toa: &[f64; NUM_BANDS], cos_sza: f64) -> [f64; 2] {
    let invert = |band: usize| {
        let p = &canonical[band];
        let x = std::f64::consts::PI * (toa[band] - p[0]) / (p[1] * cos_sza + p[2]);
        x / (1.0 + p[4] * x)
    };
    let lower = WV_WINDOW_BAND - 1;
    let r_lower = invert(lower);
    let r_window = invert(WV_WINDOW_BAND);

    let wl = &MERIS_WAVELENGTHS;
    let extrapolated = ((r_window - r_lower) * wl[WV_ABSORPTION_BAND] + r_lower * wl[WV_WINDOW_BAND]
        - r_window * wl[lower])
        / (wl[WV_WINDOW_BAND] - wl[lower]);
    [r_window, extrapolated]
}

/// Difference between the observed absorption-to-window ratio and the ratio
/// modelled at a trial water vapour column.
#[derive(Debug, Clone, Copy)]
pub struct WaterVapourFunction<'a> {
    terms: &'a PixelTerms,
    cwv_grid: &'a [f64],
    ratio: f64,
    reflectance: [f64; 2],
}

impl<'a> WaterVapourFunction<'a> {
    pub fn new(terms: &'a PixelTerms, cwv_grid: &'a [f64], ratio: f64, reflectance: [f64; 2]) -> Self {
        Self {
            terms,
            cwv_grid,
            ratio,
            reflectance,
        }
    }

    pub fn value(&self, cwv: f64) -> f64 {
        let at = FracIndex::locate(self.cwv_grid, cwv);
        let window = self.terms.at_cwv(WV_WINDOW_BAND, at).toa(self.reflectance[0]);
        let absorbed = self.terms.at_cwv(WV_ABSORPTION_BAND, at).toa(self.reflectance[1]);
        self.ratio - absorbed / window
    }
}

/// Retrieved column and its position in the water vapour grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterVapour {
    pub value: f64,
    pub index: FracIndex,
}

impl WaterVapour {
    /// The canonical column, used in constant mode and when the root search fails.
    pub fn canonical(cwv_grid: &[f64]) -> Self {
        Self {
            value: WV_INIT,
            index: FracIndex::locate(cwv_grid, WV_INIT),
        }
    }
}

/// Solves for the water vapour column of one pixel within `[lower, upper]`.
pub fn retrieve_water_vapour(
    terms: &PixelTerms,
    cwv_grid: &[f64],
    toa: &[f64; NUM_BANDS],
    reflectance: [f64; 2],
    lower: f64,
    upper: f64,
) -> WaterVapour {
    let ratio = toa[WV_ABSORPTION_BAND] / toa[WV_WINDOW_BAND];
    let function = WaterVapourFunction::new(terms, cwv_grid, ratio, reflectance);
    match find_root(|cwv| function.value(cwv), lower, upper, WV_TOLERANCE, WV_MAX_ITER) {
        RootOutcome::Converged(value) => WaterVapour {
            value,
            index: FracIndex::locate(cwv_grid, value),
        },
        RootOutcome::Unbracketed | RootOutcome::IterationLimit(_) => WaterVapour::canonical(cwv_grid),
    }
}
