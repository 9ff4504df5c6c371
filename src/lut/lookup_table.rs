use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::info;

use super::error::{LutError, LutFormatError};
use super::frac_index::FracIndex;
use crate::sensor::NUM_BANDS;

/// Radiative-transfer quantities stored per node, in LUT order.
pub const NUM_PARAMS: usize = 7;

/// One interpolation result, `[band][parameter]`.
pub type LutSpectrum = [[f64; NUM_PARAMS]; NUM_BANDS];

// Values stored per (vza, sza, raa, hsf, vis, cwv) node: parameter-major, band fastest.
const SLAB_LEN: usize = NUM_PARAMS * NUM_BANDS;

// Keeps physical queries strictly inside the first and last grid node.
const DOMAIN_MARGIN: f64 = 0.001;

// Upper bound on a single axis length read from disk.
const MAX_AXIS_LEN: i64 = 4096;

// Upper bound on the value tensor (1 GiB of f32).
const MAX_TENSOR_LEN: usize = 1 << 28;

const AXIS_NAMES: [&str; 6] = ["vza", "sza", "raa", "hsf", "vis", "cwv"];

/// The six continuous axes of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct LutAxes {
    pub vza: Vec<f64>,
    pub sza: Vec<f64>,
    pub raa: Vec<f64>,
    pub hsf: Vec<f64>,
    pub vis: Vec<f64>,
    pub cwv: Vec<f64>,
}

impl LutAxes {
    fn grids(&self) -> [&[f64]; 6] {
        [
            &self.vza, &self.sza, &self.raa, &self.hsf, &self.vis, &self.cwv,
        ]
    }

    /// Number of values the axes describe, refusing tensors above
    /// `MAX_TENSOR_LEN` before anything is allocated.
    fn tensor_len(&self) -> Result<usize, LutFormatError> {
        let nodes = self.grids().map(|g| g.len());
        nodes
            .iter()
            .try_fold(SLAB_LEN, |acc, &n| acc.checked_mul(n))
            .filter(|&len| len <= MAX_TENSOR_LEN)
            .ok_or(LutFormatError::TooLarge {
                nodes,
                limit: MAX_TENSOR_LEN,
            })
    }

    fn validate(&self) -> Result<(), LutFormatError> {
        for (&axis, grid) in AXIS_NAMES.iter().zip(self.grids()) {
            if grid.len() < 2 {
                return Err(LutFormatError::AxisLength {
                    axis,
                    len: grid.len() as i64,
                });
            }
            if grid.iter().any(|v| !v.is_finite()) {
                return Err(LutFormatError::NonFinite { axis });
            }
            if grid.windows(2).any(|w| w[1] <= w[0]) {
                return Err(LutFormatError::NotIncreasing { axis });
            }
        }
        Ok(())
    }
}

/// A query into the table. Every coordinate is expected to be inside its axis;
/// callers clamp physical quantities to the LUT domains beforehand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LutPoint {
    pub vza: f64,
    pub sza: f64,
    pub raa: f64,
    pub hsf: f64,
    pub vis: f64,
    pub cwv: f64,
}

/// Closed interval a physical quantity is clamped to before interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    fn inside(grid: &[f64]) -> Self {
        Self {
            min: grid[0] + DOMAIN_MARGIN,
            max: grid[grid.len() - 1] - DOMAIN_MARGIN,
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Immutable 8-D atmospheric parameter table
/// `(vza, sza, raa, hsf, vis, cwv, parameter, band)`.
#[derive(Debug, Clone)]
pub struct AtmosphericLut {
    axes: LutAxes,
    values: Vec<f32>,
    strides: [usize; 6],
}

impl AtmosphericLut {
    /// Builds a table from axes and a flat tensor in LUT order (band fastest).
    pub fn new(axes: LutAxes, values: Vec<f32>) -> Result<Self, LutError> {
        Ok(Self::assemble(axes, values)?)
    }

    fn assemble(axes: LutAxes, values: Vec<f32>) -> Result<Self, LutFormatError> {
        axes.validate()?;
        let expected = axes.tensor_len()?;
        if values.len() != expected {
            return Err(LutFormatError::TensorSize {
                expected,
                actual: values.len(),
            });
        }

        let lengths = axes.grids().map(|g| g.len());
        let mut strides = [SLAB_LEN; 6];
        for axis in (0..5).rev() {
            strides[axis] = strides[axis + 1] * lengths[axis + 1];
        }

        Ok(Self {
            axes,
            values,
            strides,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LutError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LutError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let lut = Self::decode(BufReader::new(file)).map_err(|source| LutError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            "Loaded LUT {}: {} nodes x {} values",
            path.display(),
            lut.values.len() / SLAB_LEN,
            SLAB_LEN
        );
        Ok(lut)
    }

    /// Decodes the little-endian binary layout: six length-prefixed `f32` axes
    /// followed by the value tensor.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LutError> {
        Ok(Self::decode(reader)?)
    }

    fn decode<R: Read>(mut reader: R) -> Result<Self, LutFormatError> {
        let axes = LutAxes {
            vza: read_axis(&mut reader, AXIS_NAMES[0])?,
            sza: read_axis(&mut reader, AXIS_NAMES[1])?,
            raa: read_axis(&mut reader, AXIS_NAMES[2])?,
            hsf: read_axis(&mut reader, AXIS_NAMES[3])?,
            vis: read_axis(&mut reader, AXIS_NAMES[4])?,
            cwv: read_axis(&mut reader, AXIS_NAMES[5])?,
        };
        axes.validate()?;

        let values = read_f32s(&mut reader, axes.tensor_len()?)?;
        Self::assemble(axes, values)
    }

    pub fn axes(&self) -> &LutAxes {
        &self.axes
    }

    pub fn hsf_grid(&self) -> &[f64] {
        &self.axes.hsf
    }

    pub fn vis_grid(&self) -> &[f64] {
        &self.axes.vis
    }

    pub fn cwv_grid(&self) -> &[f64] {
        &self.axes.cwv
    }

    pub fn hsf_domain(&self) -> Domain {
        Domain::inside(&self.axes.hsf)
    }

    pub fn vis_domain(&self) -> Domain {
        Domain::inside(&self.axes.vis)
    }

    pub fn cwv_domain(&self) -> Domain {
        Domain::inside(&self.axes.cwv)
    }

    /// Stored value at a node, `node` indexing (vza, sza, raa, hsf, vis, cwv).
    pub fn value_at(&self, node: [usize; 6], param: usize, band: usize) -> f64 {
        let offset: usize = node
            .iter()
            .zip(self.strides.iter())
            .map(|(i, s)| i * s)
            .sum();
        self.values[offset + param * NUM_BANDS + band] as f64
    }

    /// Multilinear interpolation over the 64 corners of the six continuous axes.
    /// Parameter and band are read at their nodes, so every returned entry is a
    /// convex combination of stored values.
    pub fn interpolate(&self, point: &LutPoint) -> LutSpectrum {
        let coords = [
            point.vza, point.sza, point.raa, point.hsf, point.vis, point.cwv,
        ];
        let grids = self.axes.grids();
        let fracs: [FracIndex; 6] =
            std::array::from_fn(|axis| FracIndex::locate(grids[axis], coords[axis]));

        let mut out = [[0.0; NUM_PARAMS]; NUM_BANDS];
        for corner in 0..(1usize << 6) {
            let mut weight = 1.0;
            let mut offset = 0;
            for (axis, frac) in fracs.iter().enumerate() {
                let upper = (corner >> (5 - axis)) & 1 == 1;
                if upper {
                    weight *= frac.fraction;
                    offset += frac.upper() * self.strides[axis];
                } else {
                    weight *= 1.0 - frac.fraction;
                    offset += frac.index * self.strides[axis];
                }
            }
            if weight == 0.0 {
                continue;
            }

            let slab = &self.values[offset..offset + SLAB_LEN];
            for (param, row) in slab.chunks_exact(NUM_BANDS).enumerate() {
                for (band, &value) in row.iter().enumerate() {
                    out[band][param] += weight * value as f64;
                }
            }
        }
        out
    }
}

fn read_axis<R: Read>(reader: &mut R, axis: &'static str) -> Result<Vec<f64>, LutFormatError> {
    let len = read_i32(reader)? as i64;
    if !(2..=MAX_AXIS_LEN).contains(&len) {
        return Err(LutFormatError::AxisLength { axis, len });
    }
    Ok(read_f32s(reader, len as usize)?
        .into_iter()
        .map(f64::from)
        .collect())
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, LutFormatError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32s<R: Read>(reader: &mut R, count: usize) -> Result<Vec<f32>, LutFormatError> {
    let mut bytes = vec![0u8; count * 4];
    reader.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lut::test_support::{encode_lut, fixture_lut_path, linear_lut, small_axes};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_interpolation_is_exact_at_nodes() {
        let lut = linear_lut();
        let axes = lut.axes().clone();
        for (i0, &vza) in axes.vza.iter().enumerate() {
            for (i3, &hsf) in axes.hsf.iter().enumerate() {
                for (i4, &vis) in axes.vis.iter().enumerate() {
                    let point = LutPoint {
                        vza,
                        sza: axes.sza[1],
                        raa: axes.raa[0],
                        hsf,
                        vis,
                        cwv: axes.cwv[2],
                    };
                    let f = lut.interpolate(&point);
                    for band in [0, 7, 14] {
                        for param in 0..NUM_PARAMS {
                            let stored = lut.value_at([i0, 1, 0, i3, i4, 2], param, band);
                            assert_abs_diff_eq!(f[band][param], stored, epsilon = 1e-5);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_interpolation_reproduces_affine_values() {
        let lut = linear_lut();
        let point = LutPoint {
            vza: 12.5,
            sza: 41.0,
            raa: 97.0,
            hsf: 1.3,
            vis: 47.0,
            cwv: 1.7,
        };
        let f = lut.interpolate(&point);
        for band in 0..NUM_BANDS {
            for param in 0..NUM_PARAMS {
                let expected = crate::lut::test_support::affine_value(&point, param, band);
                assert_abs_diff_eq!(f[band][param], expected, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn test_interpolation_stays_within_corner_values() {
        let axes = small_axes();
        // Non-affine content: products of coordinates plus a wiggle.
        let lut = crate::lut::test_support::lut_from_fn(axes.clone(), |node, param, band| {
            let x: f64 = node.iter().map(|&i| (i as f64 * 1.7).sin()).sum();
            (x * (param + 1) as f64 + band as f64 * 0.1) as f32
        });

        let point = LutPoint {
            vza: 20.0,
            sza: 12.0,
            raa: 30.0,
            hsf: 0.3,
            vis: 19.0,
            cwv: 1.2,
        };
        let grids = [
            &axes.vza, &axes.sza, &axes.raa, &axes.hsf, &axes.vis, &axes.cwv,
        ];
        let coords = [
            point.vza, point.sza, point.raa, point.hsf, point.vis, point.cwv,
        ];
        let fracs: Vec<FracIndex> = (0..6)
            .map(|a| FracIndex::locate(grids[a], coords[a]))
            .collect();

        let f = lut.interpolate(&point);
        for band in [0, 5, 14] {
            for param in 0..NUM_PARAMS {
                let mut lo = f64::INFINITY;
                let mut hi = f64::NEG_INFINITY;
                for corner in 0..64usize {
                    let node: [usize; 6] = std::array::from_fn(|a| {
                        fracs[a].index + ((corner >> (5 - a)) & 1)
                    });
                    let v = lut.value_at(node, param, band);
                    lo = lo.min(v);
                    hi = hi.max(v);
                }
                assert!(f[band][param] >= lo - 1e-9 && f[band][param] <= hi + 1e-9);
            }
        }
    }

    #[test]
    fn test_from_reader_roundtrip() {
        let lut = linear_lut();
        let bytes = encode_lut(&lut);
        let decoded = AtmosphericLut::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(decoded.axes(), lut.axes());
        assert_abs_diff_eq!(
            decoded.value_at([1, 2, 0, 1, 3, 4], 4, 9),
            lut.value_at([1, 2, 0, 1, 3, 4], 4, 9),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_truncated_stream_is_rejected() {
        let lut = linear_lut();
        let mut bytes = encode_lut(&lut);
        bytes.truncate(bytes.len() - 8);
        let err = AtmosphericLut::from_reader(bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            LutError::Format(LutFormatError::Truncated(_))
        ));
    }

    #[test]
    fn test_bad_axis_length_is_rejected() {
        let bytes = 1i32.to_le_bytes().to_vec();
        let err = AtmosphericLut::from_reader(bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            LutError::Format(LutFormatError::AxisLength { axis: "vza", len: 1 })
        ));
    }

    #[test]
    fn test_oversized_header_is_rejected_before_reading_values() {
        // Six maximal axes and no tensor behind them.
        let mut bytes = Vec::new();
        for _ in 0..6 {
            bytes.extend_from_slice(&4096i32.to_le_bytes());
            for v in 0..4096 {
                bytes.extend_from_slice(&(v as f32).to_le_bytes());
            }
        }
        let err = AtmosphericLut::from_reader(bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            LutError::Format(LutFormatError::TooLarge {
                nodes: [4096, 4096, 4096, 4096, 4096, 4096],
                ..
            })
        ));
    }

    #[test]
    fn test_from_file_oversized_header_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge_lut");
        let mut bytes = Vec::new();
        for _ in 0..6 {
            bytes.extend_from_slice(&100i32.to_le_bytes());
            for v in 0..100 {
                bytes.extend_from_slice(&(v as f32).to_le_bytes());
            }
        }
        std::fs::write(&path, bytes).unwrap();

        let err = AtmosphericLut::from_file(&path).unwrap_err();
        assert!(matches!(
            err,
            LutError::Corrupt {
                source: LutFormatError::TooLarge { .. },
                ..
            }
        ));
        assert!(err.to_string().contains("huge_lut"));
    }

    #[test]
    fn test_new_rejects_decreasing_axis() {
        let mut axes = small_axes();
        axes.vis = vec![23.0, 15.0, 60.0];
        let len = axes.tensor_len().unwrap();
        let err = AtmosphericLut::new(axes, vec![0.0; len]).unwrap_err();
        assert!(matches!(
            err,
            LutError::Format(LutFormatError::NotIncreasing { axis: "vis" })
        ));
    }

    #[test]
    fn test_from_file_missing_reports_path() {
        let err = AtmosphericLut::from_file("/nonexistent/SCAPEM_LUT").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/SCAPEM_LUT"));
    }

    #[test]
    fn test_domains() {
        let lut = linear_lut();
        let vis = lut.vis_domain();
        assert_abs_diff_eq!(vis.min, lut.vis_grid()[0] + 0.001, epsilon = 1e-12);
        assert_abs_diff_eq!(vis.clamp(1.0e6), vis.max, epsilon = 1e-12);
        assert!(!lut.cwv_domain().contains(lut.cwv_grid()[0]));
    }

    #[test]
    fn test_meris_lut_fixture() {
        // Skip test if the LUT resource is not available
        let Some(path) = fixture_lut_path() else {
            return;
        };
        let lut = AtmosphericLut::from_file(path).unwrap();
        let f = lut.interpolate(&LutPoint {
            vza: 7.13599,
            sza: 64.9990,
            raa: 126.915,
            hsf: 0.0215365,
            vis: 10.0010,
            cwv: 2.0,
        });
        assert_abs_diff_eq!(f[0][0], 0.00581705, epsilon = 1e-4);
        assert_abs_diff_eq!(f[14][6], 0.474061, epsilon = 1e-4);
    }
}
