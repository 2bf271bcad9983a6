//! Run parameters and the named profiles.

use crate::reclaim::ReclamationPolicy;

/// How one strategy is benchmarked. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BenchmarkParameters {
    /// Iterations per strategy. Must be at least 1.
    pub iterations: u32,
    /// Run iterations on the rayon pool instead of one after another.
    pub parallel: bool,
    /// Drop each output buffer at the end of its iteration. When `false`,
    /// outputs stay alive until the whole run has been timed.
    pub auto_dispose: bool,
    pub reclamation: ReclamationPolicy,
}

impl BenchmarkParameters {
    pub fn builder() -> ParametersBuilder {
        ParametersBuilder::default()
    }
}

impl Default for BenchmarkParameters {
    fn default() -> Self {
        Profile::Baseline.parameters()
    }
}

/// Builder for [`BenchmarkParameters`]. Defaults match [`Profile::Baseline`].
#[derive(Debug, Clone, Copy)]
pub struct ParametersBuilder {
    iterations: u32,
    parallel: bool,
    auto_dispose: bool,
    reclamation: ReclamationPolicy,
}

impl Default for ParametersBuilder {
    fn default() -> Self {
        Self {
            iterations: 5,
            parallel: false,
            auto_dispose: true,
            reclamation: ReclamationPolicy::None,
        }
    }
}

impl ParametersBuilder {
    pub fn iterations(mut self, count: u32) -> Self {
        self.iterations = count;
        self
    }

    pub fn parallel(mut self, enable: bool) -> Self {
        self.parallel = enable;
        self
    }

    pub fn auto_dispose(mut self, dispose: bool) -> Self {
        self.auto_dispose = dispose;
        self
    }

    pub fn reclamation(mut self, policy: ReclamationPolicy) -> Self {
        self.reclamation = policy;
        self
    }

    pub fn build(self) -> BenchmarkParameters {
        BenchmarkParameters {
            iterations: self.iterations,
            parallel: self.parallel,
            auto_dispose: self.auto_dispose,
            reclamation: self.reclamation,
        }
    }
}

/// Preset parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Profile {
    /// Sequential, dispose each output, no reclamation.
    #[default]
    Baseline,
    /// Parallel, keep outputs, optimized reclamation.
    Performance,
    /// Sequential, dispose each output, low-latency reclamation.
    #[cfg_attr(feature = "cli", value(name = "lowlatency"))]
    LowLatency,
    /// Sequential, keep outputs, no reclamation.
    Memory,
    /// Sequential, dispose each output, aggressive reclamation.
    Cleanup,
}

impl Profile {
    pub const ALL: [Profile; 5] = [
        Profile::Baseline,
        Profile::Performance,
        Profile::LowLatency,
        Profile::Memory,
        Profile::Cleanup,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Profile::Baseline => "baseline",
            Profile::Performance => "performance",
            Profile::LowLatency => "lowlatency",
            Profile::Memory => "memory",
            Profile::Cleanup => "cleanup",
        }
    }

    pub fn from_name(name: &str) -> Option<Profile> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    pub fn builder(self) -> ParametersBuilder {
        let b = BenchmarkParameters::builder().iterations(5);
        match self {
            Profile::Baseline => b,
            Profile::Performance => b
                .parallel(true)
                .auto_dispose(false)
                .reclamation(ReclamationPolicy::Optimized),
            Profile::LowLatency => b.reclamation(ReclamationPolicy::LowLatency),
            Profile::Memory => b.auto_dispose(false),
            Profile::Cleanup => b.reclamation(ReclamationPolicy::Aggressive),
        }
    }

    pub fn parameters(self) -> BenchmarkParameters {
        self.builder().build()
    }
}
