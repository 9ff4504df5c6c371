use crate::lut::{AtmosphericLut, FracIndex};
use crate::sensor::NUM_BANDS;

use super::Geometry;

/// Radiative-transfer terms tabulated at the LUT nodes of
/// (band, water vapour, visibility, elevation) for one cell geometry.
#[derive(Debug, Clone)]
pub struct RadiativeTransferGrids {
    cwv: Vec<f64>,
    vis: Vec<f64>,
    hsf: Vec<f64>,
    /// Path radiance.
    lpw: Vec<f64>,
    /// Direct part of the total transmittance, scaled by the solar irradiance.
    e0tw: Vec<f64>,
    /// Diffuse part of the total transmittance.
    ediftw: Vec<f64>,
    /// Spherical albedo.
    sab: Vec<f64>,
    /// Direct transmittance.
    tdir_d: Vec<f64>,
}

/// Atmospheric terms at one pixel's elevation and visibility, one row per
/// water vapour node, one column per band.
#[derive(Debug, Clone)]
pub struct PixelTerms {
    pub lpw: Vec<[f64; NUM_BANDS]>,
    pub etw: Vec<[f64; NUM_BANDS]>,
    pub sab: Vec<[f64; NUM_BANDS]>,
}

/// The three terms of one band at a given water vapour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandTerms {
    pub lpw: f64,
    pub etw: f64,
    pub sab: f64,
}

impl BandTerms {
    /// Modelled TOA value over a Lambertian surface of reflectance `refl`.
    pub fn toa(&self, refl: f64) -> f64 {
        self.lpw + refl * self.etw / (std::f64::consts::PI * (1.0 - refl * self.sab))
    }

    /// Surface reflectance from an observed TOA value.
    pub fn invert(&self, toa: f64) -> f64 {
        let x = std::f64::consts::PI * (toa - self.lpw) / self.etw;
        x / (1.0 + self.sab * x)
    }
}

impl PixelTerms {
    /// Zeroed terms for `n_cwv` water vapour nodes.
    pub fn new(n_cwv: usize) -> Self {
        Self {
            lpw: vec![[0.0; NUM_BANDS]; n_cwv],
            etw: vec![[0.0; NUM_BANDS]; n_cwv],
            sab: vec![[0.0; NUM_BANDS]; n_cwv],
        }
    }

    pub fn cwv_len(&self) -> usize {
        self.lpw.len()
    }

    /// Terms of `band` interpolated between two water vapour nodes.
    pub fn at_cwv(&self, band: usize, cwv: FracIndex) -> BandTerms {
        let (i, j) = (cwv.index, cwv.upper());
        BandTerms {
            lpw: cwv.lerp(self.lpw[i][band], self.lpw[j][band]),
            etw: cwv.lerp(self.etw[i][band], self.etw[j][band]),
            sab: cwv.lerp(self.sab[i][band], self.sab[j][band]),
        }
    }

    /// Terms of `band` at water vapour node `i`.
    pub fn at_node(&self, band: usize, i: usize) -> BandTerms {
        BandTerms {
            lpw: self.lpw[i][band],
            etw: self.etw[i][band],
            sab: self.sab[i][band],
        }
    }
}

impl RadiativeTransferGrids {
    /// One LUT interpolation per (cwv, vis, hsf) node. `solar_irradiance` is per
    /// band, already scaled to TOA units.
    pub fn build(
        lut: &AtmosphericLut,
        geometry: &Geometry,
        solar_irradiance: &[f64; NUM_BANDS],
    ) -> Self {
        let cwv = lut.cwv_grid().to_vec();
        let vis = lut.vis_grid().to_vec();
        let hsf = lut.hsf_grid().to_vec();
        let len = NUM_BANDS * cwv.len() * vis.len() * hsf.len();

        let mut grids = Self {
            lpw: vec![0.0; len],
            e0tw: vec![0.0; len],
            ediftw: vec![0.0; len],
            sab: vec![0.0; len],
            tdir_d: vec![0.0; len],
            cwv,
            vis,
            hsf,
        };

        for i in 0..grids.cwv.len() {
            for j in 0..grids.vis.len() {
                for k in 0..grids.hsf.len() {
                    let f = lut.interpolate(&geometry.at(grids.hsf[k], grids.vis[j], grids.cwv[i]));
                    for (band, p) in f.iter().enumerate() {
                        let at = grids.offset(band, i, j, k);
                        grids.lpw[at] = p[0];
                        grids.e0tw[at] = p[1];
                        grids.ediftw[at] = p[2];
                        grids.sab[at] = p[4];
                        grids.tdir_d[at] = p[1] / (p[5] * (1.0 + p[3]) * solar_irradiance[band]);
                    }
                }
            }
        }
        grids
    }

    fn offset(&self, band: usize, cwv: usize, vis: usize, hsf: usize) -> usize {
        ((band * self.cwv.len() + cwv) * self.vis.len() + vis) * self.hsf.len() + hsf
    }

    pub fn cwv_grid(&self) -> &[f64] {
        &self.cwv
    }

    pub fn lpw(&self, band: usize, cwv: usize, vis: usize, hsf: usize) -> f64 {
        self.lpw[self.offset(band, cwv, vis, hsf)]
    }

    pub fn sab(&self, band: usize, cwv: usize, vis: usize, hsf: usize) -> f64 {
        self.sab[self.offset(band, cwv, vis, hsf)]
    }

    pub fn tdir_d(&self, band: usize, cwv: usize, vis: usize, hsf: usize) -> f64 {
        self.tdir_d[self.offset(band, cwv, vis, hsf)]
    }

    /// Total transmittance at a node for a pixel with illumination cosine
    /// `cos_sza`. The direct-to-diffuse split uses the cell mean cosine.
    pub fn etw(
        &self,
        band: usize,
        cwv: usize,
        vis: usize,
        hsf: usize,
        cos_sza: f64,
        cos_sza_mean: f64,
    ) -> f64 {
        let at = self.offset(band, cwv, vis, hsf);
        let tdir = self.tdir_d[at];
        self.e0tw[at] * cos_sza + self.ediftw[at] * (tdir * cos_sza + 1.0 - tdir * cos_sza_mean)
    }

    /// Bilinear interpolation in (visibility, elevation) of every band and water
    /// vapour node for one pixel, written over `terms`. The buffer is reused
    /// across the pixels of a cell.
    pub fn fill_pixel_terms(
        &self,
        terms: &mut PixelTerms,
        hsurf: f64,
        visibility: f64,
        cos_sza: f64,
        cos_sza_mean: f64,
    ) {
        let h = FracIndex::locate(&self.hsf, hsurf);
        let v = FracIndex::locate(&self.vis, visibility);
        let corners = [
            (v.index, h.index, (1.0 - v.fraction) * (1.0 - h.fraction)),
            (v.index, h.upper(), (1.0 - v.fraction) * h.fraction),
            (v.upper(), h.index, v.fraction * (1.0 - h.fraction)),
            (v.upper(), h.upper(), v.fraction * h.fraction),
        ];

        let n_cwv = self.cwv.len();
        if terms.cwv_len() != n_cwv {
            *terms = PixelTerms::new(n_cwv);
        }
        for i in 0..n_cwv {
            for band in 0..NUM_BANDS {
                let (mut lpw, mut etw, mut sab) = (0.0, 0.0, 0.0);
                for &(j, k, w) in &corners {
                    lpw += w * self.lpw(band, i, j, k);
                    etw += w * self.etw(band, i, j, k, cos_sza, cos_sza_mean);
                    sab += w * self.sab(band, i, j, k);
                }
                terms.lpw[i][band] = lpw;
                terms.etw[i][band] = etw;
                terms.sab[i][band] = sab;
            }
        }
    }
}
