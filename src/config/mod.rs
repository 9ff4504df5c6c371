use chrono::NaiveDate;

use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::retrieval::ProcessingOptions;
use crate::sensor::{NOMINAL_SOLAR_FLUX, NUM_BANDS, OutputBands};
use crate::solar;

pub mod error;
pub use error::ConfigError;

/// Paths of the input rasters, all on the same pixel grid.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InputRasters {
    /// One radiance raster per MERIS band, in band order.
    pub radiance: Vec<PathBuf>,
    /// Surface elevation in metres.
    pub elevation: PathBuf,
    pub sun_zenith: PathBuf,
    pub view_zenith: PathBuf,
    pub sun_azimuth: PathBuf,
    pub view_azimuth: PathBuf,
    /// Classification flags (bit 0 invalid, bit 1 cloud, bit 3 water).
    pub flags: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    lut_path: PathBuf,
    acquisition_date: NaiveDate,
    inputs: InputRasters,
    output_directory: PathBuf,
    solar_flux: [f64; NUM_BANDS],
    options: ProcessingOptions,
}

fn default_cell_size() -> usize {
    30
}

fn default_true() -> bool {
    true
}

fn default_min_clear_fraction() -> f64 {
    0.35
}

fn default_refinement_clear_fraction() -> f64 {
    0.45
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

// Deserializes through a helper struct, then checks the date, the cell size,
// the clear fractions and the per-band list lengths.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            lut_path: PathBuf,
            acquisition_date: String,
            inputs: InputRasters,
            #[serde(default = "default_output_directory")]
            output_directory: PathBuf,
            #[serde(default = "default_cell_size")]
            cell_size: usize,
            solar_flux: Option<Vec<f64>>,
            #[serde(default)]
            use_constant_water_vapour: bool,
            #[serde(default = "default_true")]
            compute_over_water: bool,
            #[serde(default)]
            output_443nm_band: bool,
            #[serde(default)]
            output_rho_toa: bool,
            #[serde(default = "default_min_clear_fraction")]
            min_clear_fraction: f64,
            #[serde(default = "default_refinement_clear_fraction")]
            refinement_clear_fraction: f64,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        let acquisition_date = NaiveDate::parse_from_str(&helper.acquisition_date, "%Y-%m-%d")
            .map_err(|e| D::Error::custom(ConfigError::DateParse(e)))?;

        if helper.cell_size == 0 {
            return Err(D::Error::custom(ConfigError::CellSize));
        }

        for (name, value) in [
            ("min_clear_fraction", helper.min_clear_fraction),
            ("refinement_clear_fraction", helper.refinement_clear_fraction),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(D::Error::custom(ConfigError::Fraction { name, value }));
            }
        }

        if helper.inputs.radiance.len() != NUM_BANDS {
            return Err(D::Error::custom(ConfigError::RadianceCount {
                expected: NUM_BANDS,
                actual: helper.inputs.radiance.len(),
            }));
        }

        let solar_flux = match helper.solar_flux {
            Some(values) => <[f64; NUM_BANDS]>::try_from(values.as_slice()).map_err(|_| {
                D::Error::custom(ConfigError::SolarFluxCount {
                    expected: NUM_BANDS,
                    actual: values.len(),
                })
            })?,
            None => NOMINAL_SOLAR_FLUX,
        };

        Ok(Config {
            lut_path: helper.lut_path,
            acquisition_date,
            inputs: helper.inputs,
            output_directory: helper.output_directory,
            solar_flux,
            options: ProcessingOptions {
                cell_size: helper.cell_size,
                constant_water_vapour: helper.use_constant_water_vapour,
                compute_over_water: helper.compute_over_water,
                output_bands: OutputBands::new(helper.output_443nm_band),
                output_rho_toa: helper.output_rho_toa,
                min_clear_fraction: helper.min_clear_fraction,
                refinement_clear_fraction: helper.refinement_clear_fraction,
            },
        })
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn lut_path(&self) -> &Path {
        &self.lut_path
    }

    pub fn acquisition_date(&self) -> NaiveDate {
        self.acquisition_date
    }

    pub fn day_of_year(&self) -> u32 {
        solar::day_of_year(self.acquisition_date)
    }

    pub fn inputs(&self) -> &InputRasters {
        &self.inputs
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Solar flux per band in mW m-2 nm-1.
    pub fn solar_flux(&self) -> &[f64; NUM_BANDS] {
        &self.solar_flux
    }

    pub fn processing_options(&self) -> ProcessingOptions {
        self.options
    }
}
