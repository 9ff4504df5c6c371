//! Synthetic tables shared by the unit tests.

use std::path::PathBuf;

use super::{AtmosphericLut, LutAxes, LutPoint, NUM_PARAMS};
use crate::sensor::{MERIS_WAVELENGTHS, NUM_BANDS, WV_ABSORPTION_BAND};

pub fn small_axes() -> LutAxes {
    LutAxes {
        vza: vec![0.0, 18.0, 36.0],
        sza: vec![0.0, 20.0, 50.0],
        raa: vec![0.0, 90.0, 180.0],
        hsf: vec![0.0, 0.7, 2.5],
        vis: vec![10.0, 15.0, 23.0, 35.0, 60.0, 100.0, 180.0],
        cwv: vec![0.3, 1.0, 1.5, 2.0, 2.7, 5.0],
    }
}

fn coordinates(axes: &LutAxes, node: [usize; 6]) -> [f64; 6] {
    [
        axes.vza[node[0]],
        axes.sza[node[1]],
        axes.raa[node[2]],
        axes.hsf[node[3]],
        axes.vis[node[4]],
        axes.cwv[node[5]],
    ]
}

/// Fills a table by evaluating `f(node, param, band)` at every entry.
pub fn lut_from_fn<F>(axes: LutAxes, f: F) -> AtmosphericLut
where
    F: Fn([usize; 6], usize, usize) -> f32,
{
    let lens = [
        axes.vza.len(),
        axes.sza.len(),
        axes.raa.len(),
        axes.hsf.len(),
        axes.vis.len(),
        axes.cwv.len(),
    ];
    let mut values = Vec::with_capacity(lens.iter().product::<usize>() * NUM_PARAMS * NUM_BANDS);
    for i0 in 0..lens[0] {
        for i1 in 0..lens[1] {
            for i2 in 0..lens[2] {
                for i3 in 0..lens[3] {
                    for i4 in 0..lens[4] {
                        for i5 in 0..lens[5] {
                            for param in 0..NUM_PARAMS {
                                for band in 0..NUM_BANDS {
                                    values.push(f([i0, i1, i2, i3, i4, i5], param, band));
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    AtmosphericLut::new(axes, values).unwrap()
}

pub fn affine_value(p: &LutPoint, param: usize, band: usize) -> f64 {
    0.001 * p.vza + 0.002 * p.sza + 0.0005 * p.raa + 0.1 * p.hsf + 0.003 * p.vis
        + 0.05 * p.cwv
        + param as f64
        + 0.01 * band as f64
}

/// Table whose entries are an affine function of the six coordinates.
pub fn linear_lut() -> AtmosphericLut {
    let axes = small_axes();
    let grid = axes.clone();
    lut_from_fn(axes, move |node, param, band| {
        let c = coordinates(&grid, node);
        let p = LutPoint {
            vza: c[0],
            sza: c[1],
            raa: c[2],
            hsf: c[3],
            vis: c[4],
            cwv: c[5],
        };
        affine_value(&p, param, band) as f32
    })
}

/// Radiative-transfer-like content: path radiance and spherical albedo fall with
/// visibility, transmittances rise with it, and the water vapour band is
/// attenuated by the water column.
pub fn physical_value(vis: f64, hsf: f64, cwv: f64, param: usize, band: usize) -> f64 {
    let wl_ratio = MERIS_WAVELENGTHS[0] / MERIS_WAVELENGTHS[band];
    let altitude = (-0.2 * hsf).exp();
    let absorption = if band == WV_ABSORPTION_BAND {
        (-0.15 * cwv).exp()
    } else {
        1.0
    };
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

pub fn physical_lut() -> AtmosphericLut {
    let axes = small_axes();
    let grid = axes.clone();
    lut_from_fn(axes, move |node, param, band| {
        let c = coordinates(&grid, node);
        physical_value(c[4], c[3], c[5], param, band) as f32
    })
}

/// Serializes a table in the on-disk layout.
pub fn encode_lut(lut: &AtmosphericLut) -> Vec<u8> {
    let axes = lut.axes();
    let mut bytes = Vec::new();
    for grid in [&axes.vza, &axes.sza, &axes.raa, &axes.hsf, &axes.vis, &axes.cwv] {
        bytes.extend_from_slice(&(grid.len() as i32).to_le_bytes());
        for &v in grid.iter() {
            bytes.extend_from_slice(&(v as f32).to_le_bytes());
        }
    }
    for i0 in 0..axes.vza.len() {
        for i1 in 0..axes.sza.len() {
            for i2 in 0..axes.raa.len() {
                for i3 in 0..axes.hsf.len() {
                    for i4 in 0..axes.vis.len() {
                        for i5 in 0..axes.cwv.len() {
                            for param in 0..NUM_PARAMS {
                                for band in 0..NUM_BANDS {
                                    let v = lut.value_at([i0, i1, i2, i3, i4, i5], param, band);
                                    bytes.extend_from_slice(&(v as f32).to_le_bytes());
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    bytes
}

/// Location of the MERIS LUT, if it is available on this machine.
pub fn fixture_lut_path() -> Option<PathBuf> {
    let path = std::env::var_os("ATMOCOR_LUT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/SCAPEM_LUT_MERIS"));
    path.exists().then_some(path)
}
