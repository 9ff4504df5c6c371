use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub trait DataReader {
    fn read_data(&self) -> Result<Data, ReadError>;
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode TIFF {}: {source}", .path.display())]
    Tiff {
        path: PathBuf,
        source: tiff::TiffError,
    },
    #[error("unsupported pixel format in {}", .path.display())]
    PixelFormat { path: PathBuf },
    #[error("unknown raster file type: {}", .path.display())]
    UnknownFileType { path: PathBuf },
    #[error("{} is {actual_width}x{actual_height}, expected {width}x{height}", .path.display())]
    Shape {
        path: PathBuf,
        width: usize,
        height: usize,
        actual_width: usize,
        actual_height: usize,
    },
}

/// A single-band raster, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    pub width: usize,
    pub height: usize,
    pub buffer: Vec<f32>,
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (min_value, max_value) = self
            .buffer
            .iter()
            .filter(|x| !x.is_nan())
            .fold((f32::NAN, f32::NAN), |(lo, hi), &x| (lo.min(x), hi.max(x)));

        write!(
            f,
            "{}x{} ({} values), min {}, max {}",
            self.width,
            self.height,
            self.buffer.len(),
            min_value,
            max_value,
        )
    }
}
