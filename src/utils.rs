use log::info;

use crate::retrieval::SceneResult;
use crate::retrieval::{AC_NODATA, AOT_NODATA, VISIBILITY_NODATA};

/// Min, max and mean over the valid values of a raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterSummary {
    pub valid: usize,
    pub total: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl RasterSummary {
    /// Values equal to `nodata` and NaN are skipped.
    pub fn from_values(values: &[f32], nodata: f32) -> Self {
        let valid: Vec<f32> = values
            .iter()
            .copied()
            .filter(|v| !v.is_nan() && *v != nodata)
            .collect();
        Self {
            valid: valid.len(),
            total: values.len(),
            min: valid.iter().fold(f32::INFINITY, |a, &b| a.min(b)),
            max: valid.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b)),
            mean: if valid.is_empty() {
                f32::NAN
            } else {
                valid.iter().sum::<f32>() / valid.len() as f32
            },
        }
    }
}

fn log_summary(name: &str, values: &[f32], nodata: f64) {
    let s = RasterSummary::from_values(values, nodata as f32);
    info!(
        "{}: min {:.4}, max {:.4}, mean {:.4}, valid pixels {} / {} ({:.1}%)",
        name,
        s.min,
        s.max,
        s.mean,
        s.valid,
        s.total,
        100.0 * s.valid as f32 / s.total.max(1) as f32
    );
}

pub fn log_scene_statistics(result: &SceneResult) {
    log_summary("Visibility [km]", &result.visibility, VISIBILITY_NODATA);
    log_summary("AOT 550", &result.aot550, AOT_NODATA);
    log_summary("Water vapour [g/cm2]", &result.water_vapour, AC_NODATA);
    for raster in &result.reflectance {
        log_summary(&format!("Reflectance band {}", raster.band + 1), &raster.data, AC_NODATA);
    }
}
