use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;
use tiff::encoder::{TiffEncoder, colortype};

use crate::retrieval::{BandRaster, SceneResult};

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode TIFF {}: {source}", .path.display())]
    Tiff {
        path: PathBuf,
        source: tiff::TiffError,
    },
    #[error("{}: {len} values do not fill a {width}x{height} raster", .path.display())]
    Size {
        path: PathBuf,
        width: usize,
        height: usize,
        len: usize,
    },
}

/// Writes a single-band float32 TIFF.
pub fn write_raster(path: &Path, width: usize, height: usize, data: &[f32]) -> Result<(), WriteError> {
    if data.len() != width * height {
        return Err(WriteError::Size {
            path: path.to_path_buf(),
            width,
            height,
            len: data.len(),
        });
    }
    let tiff_error = |source| WriteError::Tiff {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(|source| WriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).map_err(tiff_error)?;
    encoder
        .write_image::<colortype::Gray32Float>(width as u32, height as u32, data)
        .map_err(tiff_error)?;
    Ok(())
}

fn band_file_name(prefix: &str, raster: &BandRaster) -> String {
    format!("{}_{}.tif", prefix, raster.band + 1)
}

/// Writes every raster of a processed scene into `directory`, creating it if
/// needed. Returns the written paths.
pub fn write_scene_result(directory: &Path, result: &SceneResult) -> Result<Vec<PathBuf>, WriteError> {
    fs::create_dir_all(directory).map_err(|source| WriteError::Create {
        path: directory.to_path_buf(),
        source,
    })?;

    let mut outputs: Vec<(String, &[f32])> = vec![
        ("cell_visibility.tif".to_string(), result.visibility.as_slice()),
        ("aot_550.tif".to_string(), result.aot550.as_slice()),
        ("water_vapour.tif".to_string(), result.water_vapour.as_slice()),
    ];
    for raster in &result.reflectance {
        outputs.push((band_file_name("refl", raster), raster.data.as_slice()));
    }
    if let Some(rho_toa) = &result.rho_toa {
        for raster in rho_toa {
            outputs.push((band_file_name("rho_toa", raster), raster.data.as_slice()));
        }
    }

    let mut written = Vec::with_capacity(outputs.len());
    for (name, data) in outputs {
        let path = directory.join(name);
        write_raster(&path, result.width, result.height, data)?;
        written.push(path);
    }
    info!("Wrote {} rasters to {}", written.len(), directory.display());
    Ok(written)
}
