use std::path::PathBuf;

use thiserror::Error;

/// Buffer size or layout does not match the stated geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Stride is smaller than `width * 3`.
    #[error("stride is smaller than one row of pixels")]
    InvalidStride,
    /// Buffer length differs from what the geometry requires.
    #[error("buffer holds {actual} bytes, geometry requires {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    /// A packed-only strategy was handed rows with padding.
    #[error("strategy requires packed rows (stride == width * 3)")]
    PaddedRows,
    /// `width`, `height` or `stride` overflow `usize` when combined.
    #[error("image dimensions overflow the address space")]
    DimensionOverflow,
}

/// A pixel source could not deliver an image.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("source holds {actual} bytes, expected at least {expected}")]
    Truncated { expected: usize, actual: usize },
    #[error("source geometry is invalid")]
    InvalidGeometry(#[from] GeometryError),
}

/// Why a single iteration failed.
#[derive(Debug, Error)]
pub enum IterationError {
    #[error("pixel source failed")]
    Source(#[from] SourceError),
    #[error("strategy rejected the buffers")]
    Geometry(#[from] GeometryError),
}

/// A benchmark run failed as a whole. No partial result exists.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Iteration count must be at least one.
    #[error("iteration count must be at least 1")]
    InvalidIterations,
    /// The source could not be read before timing started.
    #[error("source unavailable")]
    SourceUnavailable(#[source] SourceError),
    /// An iteration failed and aborted the run.
    #[error("{strategy}: iteration {index} failed")]
    Iteration {
        strategy: &'static str,
        index: u32,
        #[source]
        source: IterationError,
    },
}
