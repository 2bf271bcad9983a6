//! Ranking and rendering of benchmark results.

use core::fmt;
use std::error::Error;

use crate::orchestrator::Outcome;
use crate::runner::{BenchmarkResult, as_millis};

const RULE_WIDTH: usize = 66;

/// A strategy whose run failed, with its full error chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub strategy: String,
    pub message: String,
}

/// Results ranked fastest first by average time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    ranked: Vec<BenchmarkResult>,
    failures: Vec<Failure>,
}

impl Report {
    pub fn new(results: impl IntoIterator<Item = BenchmarkResult>) -> Self {
        let mut ranked: Vec<_> = results.into_iter().collect();
        ranked.sort_by_key(|r| r.average);
        Self {
            ranked,
            failures: Vec::new(),
        }
    }

    /// Split outcomes into ranked results and labeled failures.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        let mut results = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(result) => results.push(result),
                Err(e) => failures.push(Failure {
                    strategy: outcome.strategy.name().to_owned(),
                    message: error_chain(&e),
                }),
            }
        }
        Self {
            failures,
            ..Self::new(results)
        }
    }

    pub fn ranked(&self) -> &[BenchmarkResult] {
        &self.ranked
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn fastest(&self) -> Option<&BenchmarkResult> {
        self.ranked.first()
    }

    pub fn slowest(&self) -> Option<&BenchmarkResult> {
        self.ranked.last()
    }

    /// `slowest.average / fastest.average`.
    ///
    /// `None` with fewer than two results, or when the fastest average is
    /// zero.
    pub fn speedup(&self) -> Option<f64> {
        if self.ranked.len() < 2 {
            return None;
        }
        let fastest = self.fastest()?.average.as_nanos();
        let slowest = self.slowest()?.average.as_nanos();
        (fastest > 0).then(|| slowest as f64 / fastest as f64)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(RULE_WIDTH);
        writeln!(f, "{heavy}")?;
        writeln!(f, "BENCHMARK RESULTS")?;
        writeln!(f, "{heavy}")?;
        writeln!(
            f,
            "{:<4} {:<20} {:>12} {:>12} {:>12}",
            "#", "Strategy", "Total (ms)", "Avg (ms)", "Iterations"
        )?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
        for (rank, r) in self.ranked.iter().enumerate() {
            writeln!(
                f,
                "{:<4} {:<20} {:>12.2} {:>12.2} {:>12}",
                rank + 1,
                r.strategy,
                as_millis(r.total),
                as_millis(r.average),
                r.iterations
            )?;
        }
        for failure in &self.failures {
            writeln!(f, "FAILED {:<20} {}", failure.strategy, failure.message)?;
        }
        writeln!(f, "{heavy}")?;
        if let (Some(fastest), Some(speedup)) = (self.fastest(), self.speedup()) {
            writeln!(f, "Fastest: {}", fastest.strategy)?;
            writeln!(f, "Speedup: {speedup:.2}x over slowest")?;
        }
        Ok(())
    }
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(e) = cause {
        message.push_str(": ");
        message.push_str(&e.to_string());
        cause = e.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convolve::Strategy;
    use crate::error::{BenchError, GeometryError, IterationError};
    use std::time::Duration;

    fn result(name: &str, avg_ms: u64) -> BenchmarkResult {
        BenchmarkResult::new(name, Duration::from_millis(avg_ms * 4), 4)
    }

    #[test]
    fn ranks_by_average_and_computes_speedup() {
        let report = Report::new([result("a", 5), result("b", 2), result("c", 8)]);
        let order: Vec<_> = report.ranked().iter().map(|r| r.average).collect();
        assert_eq!(
            order,
            [
                Duration::from_millis(2),
                Duration::from_millis(5),
                Duration::from_millis(8)
            ]
        );
        assert_eq!(report.fastest().unwrap().strategy, "b");
        assert_eq!(report.slowest().unwrap().strategy, "c");
        assert_eq!(report.speedup(), Some(4.0));
    }

    #[test]
    fn single_result_has_no_speedup() {
        let report = Report::new([result("only", 3)]);
        assert_eq!(report.speedup(), None);
        let text = report.to_string();
        assert!(text.contains("only"));
        assert!(!text.contains("Speedup"));
    }

    #[test]
    fn zero_fastest_has_no_speedup() {
        let report = Report::new([
            BenchmarkResult::new("zero", Duration::ZERO, 1),
            result("slow", 3),
        ]);
        assert_eq!(report.speedup(), None);
    }

    #[test]
    fn table_lists_rank_and_speedup() {
        let text = Report::new([result("slow", 8), result("fast", 2)]).to_string();
        let fast = text.find("fast").unwrap();
        let slow = text.find("slow").unwrap();
        assert!(fast < slow);
        assert!(text.contains("Fastest: fast"));
        assert!(text.contains("Speedup: 4.00x"));
        assert!(text.contains("8.00"));
    }

    #[test]
    fn failures_are_labeled() {
        let outcomes = vec![
            Outcome {
                requested: "raw-memory".into(),
                strategy: Strategy::RawMemory,
                result: Ok(result("Raw Memory", 2)),
            },
            Outcome {
                requested: "simd-lane".into(),
                strategy: Strategy::SimdLane,
                result: Err(BenchError::Iteration {
                    strategy: Strategy::SimdLane.name(),
                    index: 3,
                    source: IterationError::Geometry(GeometryError::PaddedRows),
                }),
            },
        ];
        let report = Report::from_outcomes(outcomes);
        assert_eq!(report.ranked().len(), 1);
        assert_eq!(report.failures().len(), 1);
        let failure = &report.failures()[0];
        assert_eq!(failure.strategy, "SIMD Lanes");
        assert!(failure.message.contains("iteration 3"));
        assert!(failure.message.contains("packed rows"));
        assert!(report.to_string().contains("FAILED SIMD Lanes"));
    }
}
