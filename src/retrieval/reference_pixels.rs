use std::cmp::Ordering;

use crate::sensor::{
    NDVI_NIR_BAND, NDVI_RED_BAND, NUM_BANDS, NUM_REF_PIXELS, SOLAR_IRRADIANCE_NIR,
    SOLAR_IRRADIANCE_RED,
};

use super::cell::CellData;

/// TOA values of five reference pixels in every band: two dense-vegetation,
/// two medium-vegetation and one sparse-vegetation pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSet {
    pub toa: [[f64; NUM_REF_PIXELS]; NUM_BANDS],
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    pixel: usize,
    ndvi: f64,
}

/// NDVI from irradiance-normalised red and NIR TOA values.
pub fn ndvi(toa: &[f64; NUM_BANDS]) -> f64 {
    let red = toa[NDVI_RED_BAND] / SOLAR_IRRADIANCE_RED;
    let nir = toa[NDVI_NIR_BAND] / SOLAR_IRRADIANCE_NIR;
    (nir - red) / (nir + red)
}

/// Classifies the cell's pixels by NDVI and assembles reference sets.
///
/// Only pixels whose elevation is within 20 % and illumination cosine within
/// 10 % of the cell means are candidates. Returns `None` when the medium class is
/// too small for a set; the returned list may still be empty when the dense
/// class is short.
pub fn extract_reference_sets(cell: &CellData) -> Option<Vec<ReferenceSet>> {
    let (h_lo, h_hi) = (0.8 * cell.hsurf_mean, 1.2 * cell.hsurf_mean);
    let (c_lo, c_hi) = (0.9 * cell.cos_sza_mean, 1.1 * cell.cos_sza_mean);

    let mut high = Vec::new();
    let mut medium = Vec::new();
    let mut low = Vec::new();

    for (pixel, toa) in cell.toa.iter().enumerate() {
        let h = cell.hsurf[pixel];
        let c = cell.cos_sza[pixel];
        if !(h > h_lo && h < h_hi && c > c_lo && c < c_hi) {
            continue;
        }
        let ndvi = ndvi(toa);
        let candidate = Candidate { pixel, ndvi };
        if (0.4..0.9).contains(&ndvi) {
            high.push(candidate);
        } else if (0.15..0.4).contains(&ndvi) {
            medium.push(candidate);
        } else if (0.09..0.15).contains(&ndvi) {
            low.push(candidate);
        }
    }

    for class in [&mut high, &mut medium, &mut low] {
        class.sort_by(|a, b| a.ndvi.partial_cmp(&b.ndvi).unwrap_or(Ordering::Equal));
    }

    if medium.len() + 2 < NUM_REF_PIXELS {
        return None;
    }

    let n_sets = (high.len() / 2).min(medium.len() / 3);
    let sets = (0..n_sets)
        .map(|i| {
            let fifth = low.get(i).copied().unwrap_or_else(|| medium[2 * i + 2]);
            let members = [high[2 * i], high[2 * i + 1], medium[2 * i], medium[2 * i + 1], fifth];
            let mut toa = [[0.0; NUM_REF_PIXELS]; NUM_BANDS];
            for (band, row) in toa.iter_mut().enumerate() {
                for (slot, member) in row.iter_mut().zip(members.iter()) {
                    *slot = cell.toa[member.pixel][band];
                }
            }
            ReferenceSet { toa }
        })
        .collect();

    Some(sets)
}
