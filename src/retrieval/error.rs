use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene is empty")]
    Empty,
    #[error("expected {expected} radiance bands, got {actual}")]
    BandCount { expected: usize, actual: usize },
    #[error("raster '{name}' has {actual} pixels, expected {expected}")]
    RasterSize {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("cell size must be positive")]
    CellSize,
    #[error(
        "AOT table is {layers}x{nodes} but the LUT has {hsf} elevation and {vis} visibility nodes"
    )]
    AotGrid {
        layers: usize,
        nodes: usize,
        hsf: usize,
        vis: usize,
    },
}
