//! Identifier → strategy lookup with a defined fallback.

use std::collections::BTreeMap;

use crate::convolve::Strategy;

/// Identifiers accepted for compatibility with older benchmark scripts.
const ALIASES: [(&str, Strategy); 4] = [
    ("managed", Strategy::CheckedIndex),
    ("unsafe", Strategy::RawMemory),
    ("vectorized", Strategy::SimdLane),
    ("pooled", Strategy::StrideAware),
];

/// Maps identifiers to strategies. Lookups never fail: unknown identifiers
/// resolve to the default strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyRegistry {
    entries: BTreeMap<String, Strategy>,
    default: Strategy,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty(Strategy::CheckedIndex);
        for strategy in Strategy::ALL {
            registry.register(strategy.id(), strategy);
        }
        for (alias, strategy) in ALIASES {
            registry.register(alias, strategy);
        }
        registry
    }
}

impl StrategyRegistry {
    /// A registry with no identifiers; everything resolves to `default`.
    pub fn empty(default: Strategy) -> Self {
        Self {
            entries: BTreeMap::new(),
            default,
        }
    }

    /// Add or replace an identifier. Identifiers are case-insensitive.
    pub fn register(&mut self, id: &str, strategy: Strategy) {
        self.entries.insert(normalize(id), strategy);
    }

    /// Exact lookup; `None` for unknown identifiers.
    pub fn get(&self, id: &str) -> Option<Strategy> {
        self.entries.get(&normalize(id)).copied()
    }

    /// Lookup with fallback to [`Self::default_strategy`].
    pub fn resolve(&self, id: &str) -> Strategy {
        self.get(id).unwrap_or(self.default)
    }

    pub fn default_strategy(&self) -> Strategy {
        self.default
    }

    /// Every registered identifier, aliases included, in sorted order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn normalize(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}
