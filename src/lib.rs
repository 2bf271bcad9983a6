//! # convbench
//!
//! One 5×5 edge-detection kernel, four ways to walk the pixels.
//!
//! Every strategy produces byte-identical output for the same BGR input; only
//! the memory-access technique changes, so the timing difference between them
//! is the cost of that technique and nothing else.
//!
//! | identifier      | addressing                                                |
//! |-----------------|-----------------------------------------------------------|
//! | `checked-index` | bounds-checked index per tap                              |
//! | `raw-memory`    | offsets from a fixed window base, no per-tap check        |
//! | `simd-lane`     | [`LANES`] pixels per channel per op (AVX2, NEON, SIMD128) |
//! | `stride-aware`  | `row * stride + col * 3` over caller-owned memory         |
//!
//! ## Convolution API
//!
//! [`convolve_checked`], [`convolve_raw`], [`convolve_lanes`] and
//! [`convolve_strided`] operate on raw `&[u8]` / `&mut [u8]` slices. The
//! output must be zero-initialised: the two-pixel border is never written.
//!
//! ## Benchmark harness
//!
//! [`Runner`] times one [`Strategy`] for N iterations, sequential or on the
//! rayon pool. [`Orchestrator`] runs several strategies by identifier and
//! [`Report`] ranks them.
//!
//! ## Feature flags
//!
//! - **`cli`** (default): the `convbench` binary.

#![forbid(unsafe_code)]

mod convolve;
mod error;
pub mod kernel;
mod orchestrator;
mod params;
pub mod pool;
mod reclaim;
mod registry;
mod report;
mod runner;
pub mod source;

pub use convolve::{
    Geometry, LANES, Strategy, convolve_checked, convolve_lanes, convolve_lanes_with_pool,
    convolve_raw, convolve_strided, convolve_strided_with_pool, lane_split,
};
pub use error::{BenchError, GeometryError, IterationError, SourceError};
pub use orchestrator::{Orchestrator, Outcome};
pub use params::{BenchmarkParameters, ParametersBuilder, Profile};
pub use pool::ScratchPool;
pub use reclaim::ReclamationPolicy;
pub use registry::StrategyRegistry;
pub use report::{Failure, Report};
pub use runner::{BenchmarkResult, Runner};
pub use source::{PixelSource, RawFileSource, SourceImage, SyntheticSource};
