//! Synthetic LUT and scene fixtures for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use atmocor::sensor::{MERIS_WAVELENGTHS, NUM_BANDS};
use atmocor::writers::write_raster;

pub const NUM_PARAMS: usize = 7;

pub struct Axes {
    pub grids: [Vec<f32>; 6],
}

pub fn axes() -> Axes {
    Axes {
        grids: [
            vec![0.0, 18.0, 36.0],
            vec![0.0, 20.0, 50.0, 70.0],
            vec![0.0, 90.0, 180.0],
            vec![0.0, 0.7, 2.5],
            vec![10.0, 15.0, 23.0, 35.0, 60.0, 100.0, 180.0],
            vec![0.3, 1.0, 1.5, 2.0, 2.7, 5.0],
        ],
    }
}

/// Path radiance and spherical albedo fall with visibility, transmittances
/// rise with it, band 15 is attenuated by water vapour.
pub fn lut_value(vis: f32, hsf: f32, cwv: f32, param: usize, band: usize) -> f32 {
    let wl_ratio = (MERIS_WAVELENGTHS[0] / MERIS_WAVELENGTHS[band]) as f32;
    let altitude = (-0.2 * hsf).exp();
    let absorption = if band == 14 { (-0.15 * cwv).exp() } else { 1.0 };
    match param {
        0 => 0.004 * wl_ratio * wl_ratio * (0.5 + 5.0 / vis) * altitude,
        1 => 0.12 * (1.0 - 3.0 / vis) * absorption,
        2 => 0.03 * (1.0 + 2.0 / vis) * absorption,
        3 => 0.1,
        4 => 0.05 + 0.5 / vis,
        5 => 1.0,
        _ => 0.5,
    }
}

/// Serializes the synthetic table in the little-endian on-disk layout.
pub fn encode_lut() -> Vec<u8> {
    let axes = axes();
    let mut bytes = Vec::new();
    for grid in &axes.grids {
        bytes.extend_from_slice(&(grid.len() as i32).to_le_bytes());
        for v in grid {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    }
    let [vza, sza, raa, hsf, vis, cwv] = &axes.grids;
    let nodes = vza.len() * sza.len() * raa.len();
    for _ in 0..nodes {
        for &h in hsf {
            for &v in vis {
                for &c in cwv {
                    for param in 0..NUM_PARAMS {
                        for band in 0..NUM_BANDS {
                            bytes.extend_from_slice(&lut_value(v, h, c, param, band).to_le_bytes());
                        }
                    }
                }
            }
        }
    }
    bytes
}

pub fn write_lut(dir: &Path) -> PathBuf {
    let path = dir.join("SYNTHETIC_LUT");
    fs::write(&path, encode_lut()).unwrap();
    path
}

/// Writes uniform input rasters of a `width` x `height` scene and returns the
/// `inputs` section of a run configuration.
pub fn write_scene(dir: &Path, width: usize, height: usize, radiance: f32) -> String {
    let n = width * height;
    let raster = |name: &str, value: f32| -> String {
        let path = dir.join(name);
        write_raster(&path, width, height, &vec![value; n]).unwrap();
        format!("{:?}", path.to_string_lossy())
    };
    let radiance: Vec<String> = (1..=NUM_BANDS)
        .map(|b| raster(&format!("radiance_{}.tif", b), radiance))
        .collect();
    format!(
        r#"{{
            "radiance": [{}],
            "elevation": {},
            "sun_zenith": {},
            "view_zenith": {},
            "sun_azimuth": {},
            "view_azimuth": {},
            "flags": {}
        }}"#,
        radiance.join(", "),
        raster("elevation.tif", 700.0),
        raster("sza.tif", 20.0),
        raster("vza.tif", 18.0),
        raster("saa.tif", 90.0),
        raster("vaa.tif", 0.0),
        raster("flags.tif", 0.0),
    )
}
