pub mod geotiff;
pub mod types;

pub use geotiff::GeoTiffReader;
pub use types::{Data, DataReader, ReadError};

use std::path::Path;

use log::debug;

use crate::config::InputRasters;
use crate::retrieval::Scene;

pub fn create_reader(path: &Path) -> Result<Box<dyn DataReader>, ReadError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("tif") | Some("tiff") => Ok(Box::new(GeoTiffReader {
            path: path.to_path_buf(),
        })),
        _ => Err(ReadError::UnknownFileType {
            path: path.to_path_buf(),
        }),
    }
}

fn read_raster(path: &Path) -> Result<Data, ReadError> {
    let data = create_reader(path)?.read_data()?;
    debug!("Read {}: {}", path.display(), data);
    Ok(data)
}

// Reads a raster that must match the grid of the first radiance band.
fn read_matching(path: &Path, width: usize, height: usize) -> Result<Vec<f32>, ReadError> {
    let data = read_raster(path)?;
    if data.width != width || data.height != height {
        return Err(ReadError::Shape {
            path: path.to_path_buf(),
            width,
            height,
            actual_width: data.width,
            actual_height: data.height,
        });
    }
    Ok(data.buffer)
}

/// Loads every input raster of a scene. All rasters must share the grid of the
/// first radiance band.
pub fn read_scene(inputs: &InputRasters) -> Result<Scene, ReadError> {
    let Some(first_path) = inputs.radiance.first() else {
        return Ok(Scene::default());
    };
    let first = read_raster(first_path)?;
    let (width, height) = (first.width, first.height);

    let mut radiance = vec![first.buffer];
    for path in &inputs.radiance[1..] {
        radiance.push(read_matching(path, width, height)?);
    }

    let flags = read_matching(&inputs.flags, width, height)?
        .into_iter()
        .map(|f| if f.is_finite() && f > 0.0 { f as u32 } else { 0 })
        .collect();

    Ok(Scene {
        width,
        height,
        radiance,
        elevation: read_matching(&inputs.elevation, width, height)?,
        sun_zenith: read_matching(&inputs.sun_zenith, width, height)?,
        view_zenith: read_matching(&inputs.view_zenith, width, height)?,
        sun_azimuth: read_matching(&inputs.sun_azimuth, width, height)?,
        view_azimuth: read_matching(&inputs.view_azimuth, width, height)?,
        flags,
    })
}
