use log::debug;

use crate::lut::AtmosphericLut;
use crate::sensor::NUM_BANDS;

use super::cell::CellData;
use super::reference_pixels::extract_reference_sets;
use super::refinement::{VisibilityTerms, refine_visibility};
use super::{Geometry, WV_INIT};

/// Step sizes (km) of the coarse and the fine dark-target pass.
const SEARCH_STEPS: [f64; 2] = [1.0, 0.1];

/// Dark-target visibility: the smallest visibility whose path radiance stays
/// below the darkest observed TOA value in every band, searched in 1 km and then
/// 0.1 km steps.
pub fn search_visibility(
    lut: &AtmosphericLut,
    geometry: &Geometry,
    hsurf_mean: f64,
    toa_min: &[f64; NUM_BANDS],
) -> f64 {
    let domain = lut.vis_domain();
    let mut vis = domain.min - 1.0;

    for (pass, &step) in SEARCH_STEPS.iter().enumerate() {
        if pass > 0 {
            vis = (vis - 1.0).max(domain.min);
        }
        let mut too_hazy = true;
        while too_hazy && vis + step < domain.max {
            vis += step;
            let f = lut.interpolate(&geometry.at(hsurf_mean, vis, WV_INIT));
            too_hazy = toa_min.iter().zip(f.iter()).any(|(&toa, p)| toa <= p[0]);
        }
    }

    vis - 0.1
}

/// Visibility of a prepared cell, clamped to the LUT domain. With `refine` set
/// the dark-target estimate is the lower bound of the reference-pixel fit.
pub fn cell_visibility(lut: &AtmosphericLut, cell: &CellData, refine: bool) -> f64 {
    let mut vis = search_visibility(lut, &cell.geometry, cell.hsurf_mean, &cell.toa_min);
    debug!("Dark-target visibility {:.3} km", vis);

    if refine {
        match extract_reference_sets(cell) {
            Some(sets) if !sets.is_empty() => {
                let terms = VisibilityTerms::build(
                    lut,
                    &cell.geometry,
                    cell.hsurf_mean,
                    cell.cos_sza_mean,
                );
                vis = refine_visibility(&terms, vis, &sets);
                debug!("Refined visibility {:.3} km from {} set(s)", vis, sets.len());
            }
            _ => debug!("No reference sets, keeping dark-target visibility"),
        }
    }

    lut.vis_domain().clamp(vis)
}
