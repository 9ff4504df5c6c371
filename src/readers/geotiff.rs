use super::{Data, DataReader, ReadError};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tiff::decoder::{Decoder, DecodingResult};

pub struct GeoTiffReader {
    pub path: PathBuf,
}

impl GeoTiffReader {
    fn tiff_error(&self, source: tiff::TiffError) -> ReadError {
        ReadError::Tiff {
            path: self.path.clone(),
            source,
        }
    }
}

impl DataReader for GeoTiffReader {
    fn read_data(&self) -> Result<Data, ReadError> {
        let file = File::open(&self.path).map_err(|source| ReadError::Open {
            path: self.path.clone(),
            source,
        })?;

        let reader = BufReader::new(file);

        let mut decoder = Decoder::new(reader).map_err(|e| self.tiff_error(e))?;

        let (width, height) = decoder.dimensions().map_err(|e| self.tiff_error(e))?;

        let image_data: Vec<f32> = match decoder.read_image().map_err(|e| self.tiff_error(e))? {
            DecodingResult::U8(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::U16(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::U32(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::I16(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::I32(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::F32(data) => data,
            DecodingResult::F64(data) => data.iter().map(|&x| x as f32).collect(),
            _ => {
                return Err(ReadError::PixelFormat {
                    path: self.path.clone(),
                });
            }
        };

        Ok(Data {
            width: width as usize,
            height: height as usize,
            buffer: image_data,
        })
    }
}
