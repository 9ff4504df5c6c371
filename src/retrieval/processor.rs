use log::{debug, info, warn};
use rayon::prelude::*;

use crate::lut::AtmosphericLut;
use crate::sensor::{NUM_BANDS, OutputBands};

use super::aot::AotConverter;
use super::cell::{CellData, CellInputs, ClearLandAndWaterPixels, ClearLandPixels, ClearPixelStrategy};
use super::error::SceneError;
use super::reflectance::{PixelResult, correct_cell};
use super::visibility::cell_visibility;
use super::{AOT_NODATA, VIS_INIT, VISIBILITY_NODATA};

/// Per-pixel input rasters of a scene, row-major.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub width: usize,
    pub height: usize,
    /// One raster per MERIS band.
    pub radiance: Vec<Vec<f32>>,
    /// Metres above sea level.
    pub elevation: Vec<f32>,
    pub sun_zenith: Vec<f32>,
    pub view_zenith: Vec<f32>,
    pub sun_azimuth: Vec<f32>,
    pub view_azimuth: Vec<f32>,
    pub flags: Vec<u32>,
}

impl Scene {
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if self.is_empty() {
            return Err(SceneError::Empty);
        }
        if self.radiance.len() != NUM_BANDS {
            return Err(SceneError::BandCount {
                expected: NUM_BANDS,
                actual: self.radiance.len(),
            });
        }

        let expected = self.len();
        let mut sizes: Vec<(String, usize)> = self
            .radiance
            .iter()
            .enumerate()
            .map(|(band, raster)| (format!("radiance_{}", band + 1), raster.len()))
            .collect();
        sizes.extend([
            ("elevation".to_string(), self.elevation.len()),
            ("sun_zenith".to_string(), self.sun_zenith.len()),
            ("view_zenith".to_string(), self.view_zenith.len()),
            ("sun_azimuth".to_string(), self.sun_azimuth.len()),
            ("view_azimuth".to_string(), self.view_azimuth.len()),
            ("flags".to_string(), self.flags.len()),
        ]);

        match sizes.into_iter().find(|(_, actual)| *actual != expected) {
            Some((name, actual)) => Err(SceneError::RasterSize {
                name,
                expected,
                actual,
            }),
            None => Ok(()),
        }
    }

    fn cell_inputs(&self, window: &Window) -> CellInputs {
        let n = window.width * window.height;
        let mut inputs = CellInputs {
            width: window.width,
            height: window.height,
            radiance: Vec::with_capacity(n),
            elevation: Vec::with_capacity(n),
            sun_zenith: Vec::with_capacity(n),
            view_zenith: Vec::with_capacity(n),
            sun_azimuth: Vec::with_capacity(n),
            view_azimuth: Vec::with_capacity(n),
            flags: Vec::with_capacity(n),
        };
        for index in window.pixels(self.width) {
            let mut radiance = [0.0; NUM_BANDS];
            for (band, value) in radiance.iter_mut().enumerate() {
                *value = f64::from(self.radiance[band][index]);
            }
            inputs.radiance.push(radiance);
            inputs.elevation.push(f64::from(self.elevation[index]));
            inputs.sun_zenith.push(f64::from(self.sun_zenith[index]));
            inputs.view_zenith.push(f64::from(self.view_zenith[index]));
            inputs.sun_azimuth.push(f64::from(self.sun_azimuth[index]));
            inputs.view_azimuth.push(f64::from(self.view_azimuth[index]));
            inputs.flags.push(self.flags[index]);
        }
        inputs
    }
}

/// Rectangle of scene pixels processed as one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    /// Scene-wide indices of the window's pixels, row-major.
    pub fn pixels(&self, scene_width: usize) -> impl Iterator<Item = usize> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |row| (self.x..self.x + self.width).map(move |col| row * scene_width + col))
    }
}

/// Splits a `width` x `height` raster into `cell_size` square windows; the last
/// row and column of windows may be smaller.
pub fn cell_windows(width: usize, height: usize, cell_size: usize) -> Vec<Window> {
    let mut windows = Vec::new();
    for y in (0..height).step_by(cell_size.max(1)) {
        for x in (0..width).step_by(cell_size.max(1)) {
            windows.push(Window {
                x,
                y,
                width: cell_size.min(width - x),
                height: cell_size.min(height - y),
            });
        }
    }
    windows
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingOptions {
    pub cell_size: usize,
    pub constant_water_vapour: bool,
    pub compute_over_water: bool,
    pub output_bands: OutputBands,
    pub output_rho_toa: bool,
    pub min_clear_fraction: f64,
    pub refinement_clear_fraction: f64,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            cell_size: 30,
            constant_water_vapour: false,
            compute_over_water: true,
            output_bands: OutputBands::new(false),
            output_rho_toa: false,
            min_clear_fraction: 0.35,
            refinement_clear_fraction: 0.45,
        }
    }
}

/// One output raster of a spectral band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandRaster {
    /// 0-based band index.
    pub band: usize,
    pub data: Vec<f32>,
}

/// Scene-sized output rasters.
#[derive(Debug, Clone)]
pub struct SceneResult {
    pub width: usize,
    pub height: usize,
    /// Cell visibility broadcast to the cell's pixels.
    pub visibility: Vec<f32>,
    pub aot550: Vec<f32>,
    pub water_vapour: Vec<f32>,
    pub reflectance: Vec<BandRaster>,
    pub rho_toa: Option<Vec<BandRaster>>,
}

struct CellResult {
    window: Window,
    visibility: Option<f64>,
    aot: Vec<f64>,
    pixels: Vec<PixelResult>,
    rho_toa: Option<Vec<[f64; NUM_BANDS]>>,
}

pub struct SceneProcessor<'a> {
    lut: &'a AtmosphericLut,
    options: ProcessingOptions,
    solar_irradiance: [f64; NUM_BANDS],
    toa_scale: f64,
    aot: AotConverter,
    strategy: Box<dyn ClearPixelStrategy>,
}

impl<'a> SceneProcessor<'a> {
    /// `solar_irradiance` per band and `toa_scale` are already in the units of the
    /// LUT, see [`crate::solar`]. Fails when the LUT does not match the AOT table.
    pub fn new(
        lut: &'a AtmosphericLut,
        options: ProcessingOptions,
        solar_irradiance: [f64; NUM_BANDS],
        toa_scale: f64,
    ) -> Result<Self, SceneError> {
        let strategy: Box<dyn ClearPixelStrategy> = if options.compute_over_water {
            Box::new(ClearLandAndWaterPixels)
        } else {
            Box::new(ClearLandPixels)
        };
        Ok(Self {
            lut,
            options,
            solar_irradiance,
            toa_scale,
            aot: AotConverter::for_lut(lut)?,
            strategy,
        })
    }

    pub fn process(&self, scene: &Scene) -> Result<SceneResult, SceneError> {
        scene.validate()?;
        if self.options.cell_size == 0 {
            return Err(SceneError::CellSize);
        }

        let windows = cell_windows(scene.width, scene.height, self.options.cell_size);
        info!(
            "Processing {}x{} scene in {} cells of {} pixels",
            scene.width,
            scene.height,
            windows.len(),
            self.options.cell_size
        );
        debug!("Reflectance output for {}", self.options.output_bands);

        let cells: Vec<CellResult> = windows
            .par_iter()
            .map(|window| self.process_cell(scene, window))
            .collect();

        let retrieved = cells.iter().filter(|c| c.visibility.is_some()).count();
        info!("Visibility retrieved in {} of {} cells", retrieved, cells.len());

        Ok(self.assemble(scene, &cells))
    }

    fn process_cell(&self, scene: &Scene, window: &Window) -> CellResult {
        let inputs = scene.cell_inputs(window);
        let cell = CellData::prepare(&inputs, self.lut, self.strategy.as_ref(), self.toa_scale);

        let visibility = if cell.is_clear_above(self.options.min_clear_fraction) {
            let refine = cell.is_clear_above(self.options.refinement_clear_fraction);
            Some(cell_visibility(self.lut, &cell, refine))
        } else {
            None
        };
        debug!(
            "Cell at ({}, {}): clear fraction {:.2}, visibility {:?}",
            window.x, window.y, cell.clear_fraction, visibility
        );

        let correction_visibility = visibility.unwrap_or_else(|| {
            warn!(
                "No visibility for cell at ({}, {}), correcting with {} km",
                window.x, window.y, VIS_INIT
            );
            VIS_INIT
        });
        let pixels = correct_cell(
            self.lut,
            &cell,
            correction_visibility,
            &self.solar_irradiance,
            self.options.constant_water_vapour,
        );

        let aot = match visibility {
            Some(vis) if vis != VISIBILITY_NODATA => {
                cell.hsurf.iter().map(|&h| self.aot.aot550(vis, h)).collect()
            }
            _ => vec![AOT_NODATA; cell.len()],
        };

        let rho_toa = self.options.output_rho_toa.then(|| {
            cell.toa
                .iter()
                .zip(&cell.cos_sza)
                .map(|(toa, &cos)| {
                    let mut rho = [0.0; NUM_BANDS];
                    for (band, r) in rho.iter_mut().enumerate() {
                        *r = toa[band] * std::f64::consts::PI / (self.solar_irradiance[band] * cos);
                    }
                    rho
                })
                .collect()
        });

        CellResult {
            window: *window,
            visibility,
            aot,
            pixels,
            rho_toa,
        }
    }

    fn assemble(&self, scene: &Scene, cells: &[CellResult]) -> SceneResult {
        let n = scene.len();
        let bands = self.options.output_bands.indices();
        let band_rasters = || -> Vec<BandRaster> {
            bands
                .iter()
                .map(|&band| BandRaster {
                    band,
                    data: vec![0.0; n],
                })
                .collect()
        };

        let mut result = SceneResult {
            width: scene.width,
            height: scene.height,
            visibility: vec![VISIBILITY_NODATA as f32; n],
            aot550: vec![AOT_NODATA as f32; n],
            water_vapour: vec![0.0; n],
            reflectance: band_rasters(),
            rho_toa: self.options.output_rho_toa.then(band_rasters),
        };

        for cell in cells {
            let visibility = cell.visibility.unwrap_or(VISIBILITY_NODATA) as f32;
            for (i, index) in cell.window.pixels(scene.width).enumerate() {
                result.visibility[index] = visibility;
                result.aot550[index] = cell.aot[i] as f32;
                result.water_vapour[index] = cell.pixels[i].water_vapour as f32;
                for raster in result.reflectance.iter_mut() {
                    raster.data[index] = cell.pixels[i].reflectance[raster.band] as f32;
                }
                if let (Some(rasters), Some(rho)) = (result.rho_toa.as_mut(), cell.rho_toa.as_ref()) {
                    for raster in rasters.iter_mut() {
                        raster.data[index] = rho[i][raster.band] as f32;
                    }
                }
            }
        }
        result
    }
}
