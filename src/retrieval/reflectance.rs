use crate::lut::AtmosphericLut;
use crate::sensor::{NOT_INVERTED_BANDS, NUM_BANDS};

use super::cell::CellData;
use super::grids::{PixelTerms, RadiativeTransferGrids};
use super::water_vapour::{WaterVapour, retrieve_water_vapour, window_reflectance};
use super::{AC_NODATA, VIS_INIT, WV_INIT};

/// Water vapour and surface reflectance of one pixel. Bands that are never
/// inverted hold [`AC_NODATA`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelResult {
    pub water_vapour: f64,
    pub reflectance: [f64; NUM_BANDS],
}

impl PixelResult {
    pub fn nodata() -> Self {
        Self {
            water_vapour: AC_NODATA,
            reflectance: [AC_NODATA; NUM_BANDS],
        }
    }
}

/// Water vapour and reflectance retrieval for every pixel of a cell at a fixed
/// visibility.
pub fn correct_cell(
    lut: &AtmosphericLut,
    cell: &CellData,
    visibility: f64,
    solar_irradiance: &[f64; NUM_BANDS],
    constant_water_vapour: bool,
) -> Vec<PixelResult> {
    let grids = RadiativeTransferGrids::build(lut, &cell.geometry, solar_irradiance);
    let canonical = lut.interpolate(&cell.geometry.at(cell.hsurf_mean, VIS_INIT, WV_INIT));
    let cwv_domain = lut.cwv_domain();
    let cwv_grid = grids.cwv_grid();
    let mut terms = PixelTerms::new(cwv_grid.len());

    (0..cell.len())
        .map(|pixel| {
            if !cell.clear[pixel] {
                return PixelResult::nodata();
            }
            let toa = &cell.toa[pixel];
            let cos_sza = cell.cos_sza[pixel];
            grids.fill_pixel_terms(
                &mut terms,
                cell.hsurf[pixel],
                visibility,
                cos_sza,
                cell.cos_sza_mean,
            );

            let water_vapour = if constant_water_vapour {
                WaterVapour::canonical(cwv_grid)
            } else {
                let prior = window_reflectance(&canonical, toa, cos_sza);
                retrieve_water_vapour(&terms, cwv_grid, toa, prior, cwv_domain.min, cwv_domain.max)
            };

            let mut reflectance = [AC_NODATA; NUM_BANDS];
            for (band, refl) in reflectance.iter_mut().enumerate() {
                if !NOT_INVERTED_BANDS.contains(&band) {
                    *refl = terms.at_cwv(band, water_vapour.index).invert(toa[band]);
                }
            }
            PixelResult {
                water_vapour: water_vapour.value,
                reflectance,
            }
        })
        .collect()
}
