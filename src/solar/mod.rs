use chrono::{Datelike, NaiveDate};
use std::f64::consts::PI;

use crate::sensor::NUM_BANDS;

/// Converts radiance scaled by the Earth-Sun distance into the TOA units used by the LUT.
const RADIANCE_SCALE: f64 = 1.0e-4;

pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Earth-Sun distance variability factor (6S `varsol`).
pub fn solar_distance_factor(day_of_year: u32) -> f64 {
    let om = (0.9856 * (day_of_year as f64 - 4.0)) * PI / 180.0;
    let d = 1.0 - 0.01673 * om.cos();
    (d * d).sqrt()
}

/// Factor applied to sensor radiance to get the TOA values the retrieval works with.
pub fn toa_scale_factor(day_of_year: u32) -> f64 {
    let varsol = solar_distance_factor(day_of_year);
    varsol * varsol * RADIANCE_SCALE
}

/// Solar flux per band in the TOA units of the LUT.
pub fn scale_solar_irradiance(flux: &[f64; NUM_BANDS]) -> [f64; NUM_BANDS] {
    flux.map(|f| f * RADIANCE_SCALE)
}

/// Relative azimuth in degrees, folded into [0, 180].
pub fn relative_azimuth(view_azimuth: f64, sun_azimuth: f64) -> f64 {
    (view_azimuth - sun_azimuth)
        .to_radians()
        .cos()
        .clamp(-1.0, 1.0)
        .acos()
        .to_degrees()
}
