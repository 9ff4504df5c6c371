use crate::lut::AtmosphericLut;
use crate::math::LinearFit;
use crate::sensor::AOT_GRID;

use super::AOT_NODATA;
use super::error::SceneError;

/// Visibility to AOT at 550 nm: one `ln(aot) = a + b ln(vis)` fit per elevation
/// layer, blended linearly in elevation.
#[derive(Debug, Clone)]
pub struct AotConverter {
    hsf: Vec<f64>,
    fits: Vec<LinearFit>,
}

impl AotConverter {
    /// `table[layer][node]` holds the reference AOT of elevation layer `layer` at
    /// visibility node `node`.
    pub fn new<T: AsRef<[f64]>>(hsf: &[f64], vis: &[f64], table: &[T]) -> Self {
        let ln_vis: Vec<f64> = vis.iter().map(|v| v.ln()).collect();
        let fits = table
            .iter()
            .take(hsf.len())
            .map(|row| {
                let ln_aot: Vec<f64> = row.as_ref().iter().map(|a| a.ln()).collect();
                LinearFit::fit(&ln_vis, &ln_aot)
            })
            .collect();
        Self {
            hsf: hsf.to_vec(),
            fits,
        }
    }

    /// Converter for the MERIS table, whose rows and columns are the LUT's
    /// elevation and visibility nodes. Fails when the LUT axes have other lengths.
    pub fn for_lut(lut: &AtmosphericLut) -> Result<Self, SceneError> {
        let (hsf, vis) = (lut.hsf_grid(), lut.vis_grid());
        let (layers, nodes) = (AOT_GRID.len(), AOT_GRID[0].len());
        if hsf.len() != layers || vis.len() != nodes {
            return Err(SceneError::AotGrid {
                layers,
                nodes,
                hsf: hsf.len(),
                vis: vis.len(),
            });
        }
        Ok(Self::new(hsf, vis, &AOT_GRID))
    }

    /// AOT at 550 nm, or [`AOT_NODATA`] below the lowest elevation layer.
    pub fn aot550(&self, visibility: f64, hsurf: f64) -> f64 {
        let Some(found) = self.hsf.iter().rposition(|&layer| hsurf >= layer) else {
            return AOT_NODATA;
        };
        let layer = found.min(self.fits.len().saturating_sub(2));
        if layer + 1 >= self.fits.len() {
            return AOT_NODATA;
        }

        let hsp = (hsurf - self.hsf[layer]) / (self.hsf[layer + 1] - self.hsf[layer]);
        let ln_vis = visibility.ln();
        let lower = self.fits[layer].eval(ln_vis).exp();
        let upper = self.fits[layer + 1].eval(ln_vis).exp();
        lower + (upper - lower) * hsp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lut::test_support::{lut_from_fn, physical_lut, small_axes};
    use approx::assert_relative_eq;

    const HSF: [f64; 3] = [0.0, 0.7, 2.5];
    const VIS: [f64; 7] = [10.0, 15.0, 23.0, 35.0, 60.0, 100.0, 180.0];

    fn converter() -> AotConverter {
        AotConverter::new(&HSF, &VIS, &AOT_GRID)
    }

    #[test]
    fn test_reference_nodes_within_fit_residual() {
        let conv = converter();
        for (layer, &h) in HSF.iter().enumerate() {
            for (node, &v) in VIS.iter().enumerate() {
                let aot = conv.aot550(v, h);
                assert_relative_eq!(aot, AOT_GRID[layer][node], max_relative = 0.1);
            }
        }
    }

    #[test]
    fn test_layer_bound_matches_fitted_model() {
        let conv = converter();
        let fit = conv.fits[1];
        let expected = fit.eval(23.0f64.ln()).exp();
        assert_relative_eq!(conv.aot550(23.0, 0.7), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_between_layers_is_linear_in_elevation() {
        let conv = converter();
        let lo = conv.aot550(35.0, 0.7);
        let hi = conv.aot550(35.0, 2.5);
        let mid = conv.aot550(35.0, 1.6);
        assert_relative_eq!(mid, 0.5 * (lo + hi), max_relative = 1e-12);
    }

    #[test]
    fn test_aot_decreases_with_visibility() {
        let conv = converter();
        assert!(conv.aot550(12.0, 0.1) > conv.aot550(50.0, 0.1));
        assert!(conv.aot550(50.0, 0.1) > conv.aot550(150.0, 0.1));
    }

    #[test]
    fn test_for_lut_matches_table_axes() {
        let conv = AotConverter::for_lut(&physical_lut()).unwrap();
        assert_eq!(conv.fits.len(), AOT_GRID.len());
        assert_relative_eq!(conv.aot550(35.0, 0.7), converter().aot550(35.0, 0.7));
    }

    #[test]
    fn test_for_lut_rejects_other_elevation_layers() {
        let mut axes = small_axes();
        axes.hsf = vec![0.0, 0.7, 1.5, 2.5];
        let lut = lut_from_fn(axes, |_, _, _| 0.0);
        let err = AotConverter::for_lut(&lut).unwrap_err();
        assert!(matches!(
            err,
            SceneError::AotGrid {
                layers: 3,
                nodes: 7,
                hsf: 4,
                vis: 7
            }
        ));
    }

    #[test]
    fn test_below_lowest_layer_is_nodata() {
        let conv = converter();
        assert_eq!(conv.aot550(23.0, -0.1), AOT_NODATA);
    }
}
