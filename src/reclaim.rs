//! Memory-reclamation policies applied around benchmark iterations.
//!
//! There is no collector underneath: every policy acts on the scratch pool,
//! the only memory the strategies keep between calls. `configure` runs once
//! before the clock starts; `after_iteration` runs inside the timed region
//! after each iteration.

use log::debug;

use crate::kernel::TAPS;
use crate::pool::ScratchPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ReclamationPolicy {
    /// Leave the pool alone.
    #[default]
    None,
    /// Drop every idle buffer after each iteration.
    Aggressive,
    /// Start from an empty pool; keep at most one idle buffer per size.
    Optimized,
    /// Pre-size the weight pool for every worker; never free mid-run.
    LowLatency,
}

impl ReclamationPolicy {
    pub const ALL: [ReclamationPolicy; 4] = [
        ReclamationPolicy::None,
        ReclamationPolicy::Aggressive,
        ReclamationPolicy::Optimized,
        ReclamationPolicy::LowLatency,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ReclamationPolicy::None => "none",
            ReclamationPolicy::Aggressive => "aggressive",
            ReclamationPolicy::Optimized => "optimized",
            ReclamationPolicy::LowLatency => "low-latency",
        }
    }

    /// Whether the per-iteration hook does anything.
    pub const fn is_active(self) -> bool {
        !matches!(self, ReclamationPolicy::None)
    }

    /// One-time setup before the first iteration.
    pub fn configure(self, pool: &ScratchPool) {
        match self {
            ReclamationPolicy::None | ReclamationPolicy::Aggressive => {}
            ReclamationPolicy::Optimized => pool.trim(0),
            ReclamationPolicy::LowLatency => pool.prewarm(TAPS, rayon::current_num_threads()),
        }
        debug!(
            "reclamation {}: configured, {} idle buffers",
            self.name(),
            pool.idle_total()
        );
    }

    /// Cleanup after one iteration.
    pub fn after_iteration(self, pool: &ScratchPool) {
        match self {
            ReclamationPolicy::None | ReclamationPolicy::LowLatency => {}
            ReclamationPolicy::Aggressive => pool.clear(),
            ReclamationPolicy::Optimized => pool.trim(1),
        }
    }
}

impl core::fmt::Display for ReclamationPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
