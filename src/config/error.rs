use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse date: {0}")]
    DateParse(#[from] chrono::ParseError),
    #[error("cell_size must be at least 1")]
    CellSize,
    #[error("{name} must lie in (0, 1], got {value}")]
    Fraction { name: &'static str, value: f64 },
    #[error("expected {expected} radiance rasters, got {actual}")]
    RadianceCount { expected: usize, actual: usize },
    #[error("expected {expected} solar flux values, got {actual}")]
    SolarFluxCount { expected: usize, actual: usize },
}
