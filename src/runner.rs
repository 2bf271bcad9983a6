//! The execution unit: one strategy, N timed iterations.

use std::time::{Duration, Instant};

use log::{info, trace};
use rayon::prelude::*;

use crate::convolve::{Geometry, Strategy};
use crate::error::{BenchError, GeometryError, IterationError};
use crate::params::BenchmarkParameters;
use crate::pool::{self, ScratchPool};
use crate::source::{PixelSource, SourceImage};

/// Timing for one strategy.
///
/// `average` is `total / iterations` using [`Duration`] division, which
/// truncates to whole nanoseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkResult {
    pub strategy: String,
    pub total: Duration,
    pub average: Duration,
    pub iterations: u32,
}

impl BenchmarkResult {
    pub fn new(strategy: impl Into<String>, total: Duration, iterations: u32) -> Self {
        Self {
            strategy: strategy.into(),
            total,
            average: total.checked_div(iterations).unwrap_or(Duration::ZERO),
            iterations,
        }
    }
}

/// Runs a strategy against a source under given parameters.
#[derive(Debug, Clone, Copy)]
pub struct Runner<'p> {
    pool: &'p ScratchPool,
}

impl Default for Runner<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner<'static> {
    /// A runner backed by the shared scratch pool.
    pub fn new() -> Self {
        Self { pool: pool::shared() }
    }
}

impl<'p> Runner<'p> {
    pub fn with_pool(pool: &'p ScratchPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &'p ScratchPool {
        self.pool
    }

    /// Time `params.iterations` applications of `strategy`.
    ///
    /// The source is probed once before the clock starts; if it cannot be
    /// read the run fails with [`BenchError::SourceUnavailable`]. The
    /// reclamation policy is configured once, also before the clock. Any
    /// failing iteration aborts the run.
    pub fn run(
        &self,
        strategy: Strategy,
        source: &dyn PixelSource,
        params: &BenchmarkParameters,
    ) -> Result<BenchmarkResult, BenchError> {
        if params.iterations == 0 {
            return Err(BenchError::InvalidIterations);
        }
        source.load().map_err(BenchError::SourceUnavailable)?;
        params.reclamation.configure(self.pool);

        info!(
            "{strategy}: {} iterations ({}) on {}",
            params.iterations,
            if params.parallel { "parallel" } else { "sequential" },
            source.describe()
        );

        let iterate = |index: u32| self.iteration(strategy, source, params, index);
        let start = Instant::now();
        let retained: Vec<Option<Vec<u8>>> = if params.parallel {
            (0..params.iterations)
                .into_par_iter()
                .map(iterate)
                .collect::<Result<_, _>>()?
        } else {
            (0..params.iterations)
                .map(iterate)
                .collect::<Result<_, _>>()?
        };
        let total = start.elapsed();
        drop(retained);

        let result = BenchmarkResult::new(strategy.name(), total, params.iterations);
        info!(
            "{strategy}: total {:.2}ms, average {:.2}ms",
            as_millis(result.total),
            as_millis(result.average)
        );
        Ok(result)
    }

    fn iteration(
        &self,
        strategy: Strategy,
        source: &dyn PixelSource,
        params: &BenchmarkParameters,
        index: u32,
    ) -> Result<Option<Vec<u8>>, BenchError> {
        let fail = |source: IterationError| BenchError::Iteration {
            strategy: strategy.name(),
            index,
            source,
        };
        let image = source.load().map_err(|e| fail(e.into()))?;
        let output = self.process(strategy, &image).map_err(|e| fail(e.into()))?;
        if params.reclamation.is_active() {
            params.reclamation.after_iteration(self.pool);
        }
        trace!("{strategy}: iteration {index} done");
        Ok((!params.auto_dispose).then_some(output))
    }

    /// Apply `strategy` to `image`, repacking padded rows for strategies
    /// that need packed input. The output is zero-initialised.
    fn process(&self, strategy: Strategy, image: &SourceImage) -> Result<Vec<u8>, GeometryError> {
        let geometry = image.geometry();
        if strategy.needs_packed() {
            let packed = image.packed();
            let mut output = vec![0u8; packed.len()];
            let packed_geometry = Geometry::packed(geometry.width, geometry.height);
            strategy.apply_with_pool(self.pool, &packed, &mut output, packed_geometry)?;
            Ok(output)
        } else {
            let mut output = vec![0u8; image.data().len()];
            strategy.apply_with_pool(self.pool, image.data(), &mut output, geometry)?;
            Ok(output)
        }
    }
}

pub(crate) fn as_millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::kernel::TAPS;
    use crate::reclaim::ReclamationPolicy;
    use crate::source::SyntheticSource;

    #[test]
    fn average_truncates() {
        let r = BenchmarkResult::new("x", Duration::from_nanos(10), 3);
        assert_eq!(r.average, Duration::from_nanos(3));
        assert_eq!(r.iterations, 3);
    }

    #[test]
    fn zero_iterations_rejected() {
        let pool = ScratchPool::new();
        let params = BenchmarkParameters::builder().iterations(0).build();
        let err = Runner::with_pool(&pool)
            .run(Strategy::CheckedIndex, &SyntheticSource::new(8, 8), &params)
            .unwrap_err();
        assert!(matches!(err, BenchError::InvalidIterations));
    }

    #[test]
    fn every_strategy_completes() {
        let pool = ScratchPool::new();
        let runner = Runner::with_pool(&pool);
        let source = SyntheticSource::new(33, 17).with_row_align(4);
        for parallel in [false, true] {
            let params = BenchmarkParameters::builder()
                .iterations(3)
                .parallel(parallel)
                .build();
            for strategy in Strategy::ALL {
                let result = runner.run(strategy, &source, &params).unwrap();
                assert_eq!(result.strategy, strategy.name());
                assert_eq!(result.iterations, 3);
                assert!(result.average <= result.total);
            }
        }
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn process_matches_direct_call() {
        let pool = ScratchPool::new();
        let runner = Runner::with_pool(&pool);
        let image = SyntheticSource::new(12, 9).with_row_align(8).load().unwrap();
        let packed = image.packed();
        let mut expected = vec![0u8; packed.len()];
        crate::convolve_checked(&packed, &mut expected, 12, 9).unwrap();

        for strategy in Strategy::ALL {
            let geometry = if strategy.needs_packed() {
                Geometry::packed(12, 9)
            } else {
                image.geometry()
            };
            let out = runner.process(strategy, &image).unwrap();
            let out = SourceImage::new(out, geometry).unwrap();
            assert_eq!(&*out.packed(), &expected[..], "{strategy}");
        }
    }

    #[test]
    fn aggressive_policy_leaves_pool_empty() {
        let pool = ScratchPool::new();
        let params = BenchmarkParameters::builder()
            .iterations(4)
            .reclamation(ReclamationPolicy::Aggressive)
            .build();
        Runner::with_pool(&pool)
            .run(Strategy::StrideAware, &SyntheticSource::new(16, 16), &params)
            .unwrap();
        assert_eq!(pool.idle_total(), 0);
    }

    fn low_latency(parallel: bool) -> BenchmarkParameters {
        BenchmarkParameters::builder()
            .iterations(6)
            .parallel(parallel)
            .reclamation(ReclamationPolicy::LowLatency)
            .build()
    }

    #[test]
    fn low_latency_prewarms_once_per_parallel_run() {
        let pool = ScratchPool::new();
        let source = SyntheticSource::new(21, 13);
        Runner::with_pool(&pool)
            .run(Strategy::SimdLane, &source, &low_latency(true))
            .unwrap();
        // Lane planes are never TAPS long, so only the setup hook fills this slot.
        assert_eq!(pool.idle(TAPS), rayon::current_num_threads());
        assert_eq!(pool.outstanding(), 0);

        Runner::with_pool(&pool)
            .run(Strategy::StrideAware, &source, &low_latency(true))
            .unwrap();
        assert!(pool.idle(TAPS) >= rayon::current_num_threads());
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn low_latency_prewarms_once_per_sequential_run() {
        let pool = ScratchPool::new();
        let source = SyntheticSource::new(21, 13);
        let runner = Runner::with_pool(&pool);
        runner
            .run(Strategy::SimdLane, &source, &low_latency(false))
            .unwrap();
        assert_eq!(pool.idle(TAPS), rayon::current_num_threads());

        // One rental at a time reuses a prewarmed buffer and returns it.
        runner
            .run(Strategy::StrideAware, &source, &low_latency(false))
            .unwrap();
        assert_eq!(pool.idle(TAPS), rayon::current_num_threads());
        assert_eq!(pool.outstanding(), 0);
    }

    struct Missing;

    impl PixelSource for Missing {
        fn load(&self) -> Result<SourceImage, SourceError> {
            Err(SourceError::Truncated {
                expected: 1,
                actual: 0,
            })
        }

        fn describe(&self) -> String {
            "missing".into()
        }
    }

    #[test]
    fn unavailable_source_fails_before_timing() {
        let pool = ScratchPool::new();
        let params = BenchmarkParameters::builder()
            .reclamation(ReclamationPolicy::LowLatency)
            .build();
        let err = Runner::with_pool(&pool)
            .run(Strategy::SimdLane, &Missing, &params)
            .unwrap_err();
        assert!(matches!(err, BenchError::SourceUnavailable(_)));
        // Setup hook never ran.
        assert_eq!(pool.idle_total(), 0);
    }
}
