use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Problems with the content of a LUT stream, independent of where it came from.
#[derive(Debug, Error)]
pub enum LutFormatError {
    #[error("unexpected end of LUT data: {0}")]
    Truncated(#[from] io::Error),

    #[error("axis {axis} has invalid length {len} (need at least 2 values)")]
    AxisLength { axis: &'static str, len: i64 },

    #[error("axis {axis} is not strictly increasing")]
    NotIncreasing { axis: &'static str },

    #[error("axis {axis} contains a non-finite value")]
    NonFinite { axis: &'static str },

    #[error("axes of {nodes:?} nodes describe more than {limit} values")]
    TooLarge { nodes: [usize; 6], limit: usize },

    #[error("value tensor has {actual} entries, expected {expected}")]
    TensorSize { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum LutError {
    #[error("failed to open LUT {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt LUT {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: LutFormatError,
    },

    #[error(transparent)]
    Format(#[from] LutFormatError),
}
