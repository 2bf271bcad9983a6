//! Runs several strategies against one source and one parameter set.

use log::{error, warn};

use crate::convolve::Strategy;
use crate::error::BenchError;
use crate::params::BenchmarkParameters;
use crate::registry::StrategyRegistry;
use crate::runner::{BenchmarkResult, Runner};
use crate::source::PixelSource;

/// Result of one requested strategy. A failure here does not affect the
/// other strategies of the same call.
#[derive(Debug)]
pub struct Outcome {
    /// The identifier as requested.
    pub requested: String,
    /// What the identifier resolved to.
    pub strategy: Strategy,
    pub result: Result<BenchmarkResult, BenchError>,
}

#[derive(Debug, Clone)]
pub struct Orchestrator<'p> {
    registry: StrategyRegistry,
    runner: Runner<'p>,
}

impl Default for Orchestrator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator<'static> {
    /// Default registry and a runner on the shared scratch pool.
    pub fn new() -> Self {
        Self::with_parts(StrategyRegistry::default(), Runner::new())
    }
}

impl<'p> Orchestrator<'p> {
    pub fn with_parts(registry: StrategyRegistry, runner: Runner<'p>) -> Self {
        Self { registry, runner }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Run each identifier in order.
    ///
    /// Fails as a whole only when the parameters are invalid or the source
    /// cannot be read; per-strategy failures are carried in each [`Outcome`].
    pub fn run<S: AsRef<str>>(
        &self,
        ids: &[S],
        source: &dyn PixelSource,
        params: &BenchmarkParameters,
    ) -> Result<Vec<Outcome>, BenchError> {
        if params.iterations == 0 {
            return Err(BenchError::InvalidIterations);
        }
        source.load().map_err(BenchError::SourceUnavailable)?;

        let outcomes = ids
            .iter()
            .map(|id| {
                let requested = id.as_ref();
                let strategy = self.registry.resolve(requested);
                if self.registry.get(requested).is_none() {
                    warn!("unknown strategy {requested:?}, using {}", strategy.id());
                }
                let result = self.runner.run(strategy, source, params);
                if let Err(e) = &result {
                    error!("{strategy} failed: {e}");
                }
                Outcome {
                    requested: requested.to_owned(),
                    strategy,
                    result,
                }
            })
            .collect();
        Ok(outcomes)
    }
}
