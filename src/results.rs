//! Result shapes produced by operators and consumed by formatters.

use serde::{Deserialize, Serialize};

use crate::{runtimes::RuntimeInfo, suites::InterpretedSuite, system::SystemInfo};

/// Outcome of running one suite on one runtime.
///
/// Exactly one of [`SingleBenchmarkResults::bench`] and [`SingleBenchmarkResults::error`] is populated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleBenchmarkResults {
    /// Runtime the suite ran on.
    pub runtime: RuntimeInfo,
    /// Host the suite ran on.
    pub system: SystemInfo,
    /// Suite that was run.
    pub suite: InterpretedSuite,
    /// Wall-clock time spent on this pair, in milliseconds.
    pub total_ms: u64,
    /// Benchmark data emitted by the runtime, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bench: Option<serde_json::Value>,
    /// Failure message, on an expected failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SingleBenchmarkResults {
    /// Whether this result describes a failed run.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Every result of an invocation, in execution order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedBenchmarkResults {
    /// Results ordered by suite file, then suite entry, then runtime.
    pub all: Vec<SingleBenchmarkResults>,
}

impl MergedBenchmarkResults {
    /// Appends the results of another batch, preserving order.
    pub fn merge(&mut self, other: MergedBenchmarkResults) {
        self.all.extend(other.all);
    }
}

/// Summary statistics for one micro-benchmark, in nanoseconds.
///
/// Absent statistics are read as `None`.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MicroBenchmarkStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub p99: Option<f64>,
    pub p999: Option<f64>,
    pub avg: Option<f64>,
}

/// One micro-benchmark entry.
///
/// An entry that threw carries an `error` and no `stats`.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MicroBenchmarkRunResult {
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub warmup: bool,
    #[serde(default)]
    pub baseline: bool,
    #[serde(default, rename = "async")]
    pub is_async: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<MicroBenchmarkStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

/// Benchmark data emitted by the micro-benchmark harness.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MicroBenchmarkResult {
    #[serde(default)]
    pub benchmarks: Vec<MicroBenchmarkRunResult>,
}
