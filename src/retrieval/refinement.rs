//! Visibility refinement over reference pixels.
//!
//! Each reference pixel is modelled as a linear mix of a vegetation and a soil
//! endmember. The ten abundances and the visibility are fitted jointly to the
//! observed TOA spectra with Powell's method, once per vegetation spectrum, and
//! the best-fitting spectrum provides the refined visibility.

use log::debug;

use crate::lut::{AtmosphericLut, FracIndex};
use crate::math::{minimize, powell::unit_directions, stats};
use crate::sensor::{
    NUM_BANDS, NUM_REF_PIXELS, REF_PIXEL_WEIGHTS, RHO_SOIL, RHO_VEG_ALL, SEED_NIR_BAND,
    SEED_RED_BAND, WL_CENTER_INV,
};

use super::reference_pixels::ReferenceSet;
use super::{Geometry, POWELL_FTOL, WV_INIT};

/// Objective value outside the admissible region.
pub const PENALTY: f64 = 5.0e8;

/// Reference sets fitted per cell.
pub const LIM_REF_SETS: usize = 1;

/// Two abundances per reference pixel plus the visibility.
const NUM_UNKNOWNS: usize = 2 * NUM_REF_PIXELS + 1;
const VIS_PARAM: usize = NUM_UNKNOWNS - 1;

/// Atmospheric terms at the cell's mean elevation and illumination, one entry
/// per visibility node.
#[derive(Debug, Clone)]
pub struct VisibilityTerms {
    vis: Vec<f64>,
    lpw: Vec<[f64; NUM_BANDS]>,
    etw: Vec<[f64; NUM_BANDS]>,
    sab: Vec<[f64; NUM_BANDS]>,
}

impl VisibilityTerms {
    pub fn build(
        lut: &AtmosphericLut,
        geometry: &Geometry,
        hsurf_mean: f64,
        cos_sza_mean: f64,
    ) -> Self {
        let vis = lut.vis_grid().to_vec();
        let domain = lut.vis_domain();
        let mut terms = Self {
            lpw: Vec::with_capacity(vis.len()),
            etw: Vec::with_capacity(vis.len()),
            sab: Vec::with_capacity(vis.len()),
            vis,
        };
        for &node in &terms.vis {
            let f = lut.interpolate(&geometry.at(hsurf_mean, domain.clamp(node), WV_INIT));
            terms.lpw.push(f.map(|p| p[0]));
            terms.etw.push(f.map(|p| p[1] * cos_sza_mean + p[2]));
            terms.sab.push(f.map(|p| p[4]));
        }
        terms
    }

    pub fn vis_grid(&self) -> &[f64] {
        &self.vis
    }

    /// Upper end of the admissible visibility range.
    pub fn vis_upper(&self) -> f64 {
        self.vis[self.vis.len() - 1]
    }

    /// Modelled TOA value of `band` for surface reflectance `refl`.
    pub fn toa(&self, band: usize, vis: FracIndex, refl: f64) -> f64 {
        let (i, j) = (vis.index, vis.upper());
        let lpw = vis.lerp(self.lpw[i][band], self.lpw[j][band]);
        let etw = vis.lerp(self.etw[i][band], self.etw[j][band]);
        let sab = vis.lerp(self.sab[i][band], self.sab[j][band]);
        lpw + refl * etw / (std::f64::consts::PI * (1.0 - sab * refl))
    }
}

/// Weighted chi-square misfit between the observed reference spectra and the
/// endmember model for one vegetation spectrum.
#[derive(Debug, Clone)]
pub struct ToaMinimization<'a> {
    terms: &'a VisibilityTerms,
    vis_lower: f64,
    refs: &'a ReferenceSet,
    veg: &'a [f64; NUM_BANDS],
    pub weights: [f64; NUM_REF_PIXELS],
}

impl<'a> ToaMinimization<'a> {
    pub fn new(
        terms: &'a VisibilityTerms,
        vis_lower: f64,
        refs: &'a ReferenceSet,
        veg: &'a [f64; NUM_BANDS],
    ) -> Self {
        Self {
            terms,
            vis_lower,
            refs,
            veg,
            weights: REF_PIXEL_WEIGHTS,
        }
    }

    fn admissible(&self, x: &[f64]) -> bool {
        let vis = x[VIS_PARAM];
        x.iter().all(|&v| v >= 0.0) && vis >= self.vis_lower && vis < self.terms.vis_upper()
    }

    /// Unweighted misfit of every reference pixel, or `None` outside the
    /// admissible region.
    pub fn chi_square(&self, x: &[f64]) -> Option<[f64; NUM_REF_PIXELS]> {
        if !self.admissible(x) {
            return None;
        }
        let vis = FracIndex::locate(self.terms.vis_grid(), x[VIS_PARAM]);
        let mut chi = [0.0; NUM_REF_PIXELS];
        for (j, c) in chi.iter_mut().enumerate() {
            for band in 0..NUM_BANDS {
                let refl = x[2 * j] * self.veg[band] + x[2 * j + 1] * RHO_SOIL[band];
                let toa = self.terms.toa(band, vis, refl);
                let d = WL_CENTER_INV[band] * (self.refs.toa[band][j] - toa);
                *c += d * d;
            }
        }
        Some(chi)
    }

    pub fn evaluate(&self, x: &[f64]) -> f64 {
        match self.chi_square(x) {
            Some(chi) => chi.iter().zip(&self.weights).map(|(c, w)| c * w).sum(),
            None => PENALTY,
        }
    }

    /// Zeroes the weight of every reference pixel whose misfit at `x` exceeds
    /// twice the mean misfit. Returns the number of pixels dropped.
    pub fn reject_outliers(&mut self, x: &[f64]) -> usize {
        let Some(chi) = self.chi_square(x) else {
            return 0;
        };
        let threshold = 2.0 * stats::mean(&chi);
        let mut outliers = 0;
        for (weight, &c) in self.weights.iter_mut().zip(&chi) {
            if c > threshold {
                *weight = 0.0;
                outliers += 1;
            }
        }
        outliers
    }

    fn minimize_from(&self, x: &mut [f64]) -> f64 {
        let mut directions = unit_directions(x.len());
        let mut objective = |p: &[f64]| self.evaluate(p);
        minimize(&mut objective, x, &mut directions, POWELL_FTOL)
    }
}

/// Starting abundances from the NDVI of each reference pixel.
fn seed_abundances(refs: &ReferenceSet) -> [f64; NUM_UNKNOWNS] {
    let mut x = [0.0; NUM_UNKNOWNS];
    for j in 0..NUM_REF_PIXELS {
        let red = refs.toa[SEED_RED_BAND][j];
        let nir = refs.toa[SEED_NIR_BAND][j];
        let veg = 1.3 * (nir - red) / (nir + red) + 0.25;
        x[2 * j] = veg.max(0.0);
        x[2 * j + 1] = (1.0 - veg).max(0.0);
    }
    x
}

/// Refined visibility of one reference set, searched from `vis_lower` upwards.
pub fn refine_set(terms: &VisibilityTerms, vis_lower: f64, refs: &ReferenceSet) -> f64 {
    let seed = seed_abundances(refs);
    let mut scores = Vec::with_capacity(RHO_VEG_ALL.len());
    let mut estimates = Vec::with_capacity(RHO_VEG_ALL.len());

    for veg in &RHO_VEG_ALL {
        let mut problem = ToaMinimization::new(terms, vis_lower, refs, veg);
        let mut x = seed;
        x[VIS_PARAM] = vis_lower + 0.01;
        let mut fmin = problem.minimize_from(&mut x);

        let outliers = problem.reject_outliers(&x);
        if outliers > 0 {
            fmin = problem.minimize_from(&mut x);
        }

        scores.push(fmin / (NUM_REF_PIXELS - outliers) as f64);
        estimates.push(x[VIS_PARAM]);
    }

    let best = stats::argmin(&scores).unwrap_or(0);
    debug!(
        "Reference set fit: spectrum {} scores {:?} visibility {:.3}",
        best, scores, estimates[best]
    );
    estimates[best]
}

/// Refined visibility of a cell from its reference sets. `vis_lower` is the
/// dark-target estimate.
pub fn refine_visibility(terms: &VisibilityTerms, vis_lower: f64, sets: &[ReferenceSet]) -> f64 {
    let estimates: Vec<f64> = sets
        .iter()
        .take(LIM_REF_SETS)
        .map(|refs| refine_set(terms, vis_lower, refs))
        .collect();
    combine_set_estimates(&estimates).unwrap_or(vis_lower)
}

/// Mean of the per-set estimates within 1.5 sample standard deviations of their
/// mean, falling back to the plain mean.
pub fn combine_set_estimates(estimates: &[f64]) -> Option<f64> {
    match estimates {
        [] => None,
        [single] => Some(*single),
        _ => {
            let mean = stats::mean(estimates);
            let limit = 1.5 * stats::sample_stdev(estimates);
            let kept: Vec<f64> = estimates
                .iter()
                .copied()
                .filter(|v| (v - mean).abs() <= limit)
                .collect();
            if kept.is_empty() {
                Some(mean)
            } else {
                Some(stats::mean(&kept))
            }
        }
    }
}
