//! Bencher Metric Format (BMF) formatter.
//!
//! Produces one stanza per measured micro-benchmark, keyed by a name built from the runtime, the host, the suite and
//! the benchmark, each holding a single latency metric.

use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::Formatter;
use crate::results::{MergedBenchmarkResults, MicroBenchmarkResult, MicroBenchmarkRunResult, SingleBenchmarkResults};

/// Key of the latency metric in a stanza.
pub const LATENCY: &str = "latency";

/// A single metric value, with optional bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BencherMetric {
    /// Central value, in nanoseconds.
    pub value: f64,
    /// Lower bound, in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_value: Option<f64>,
    /// Upper bound, in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_value: Option<f64>,
}

/// Metrics of one benchmark, by metric kind.
pub type BencherStanza = BTreeMap<String, BencherMetric>;

/// Full report, by benchmark name.
pub type BencherMetricFormat = BTreeMap<String, BencherStanza>;

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|value| *value != 0.0)
}

/// Builds the latency metric for one benchmark, or `None` if it errored or was never measured.
///
/// The 99th percentile is preferred over the average. The maximum is only an upper bound if it exceeds the minimum.
#[must_use]
pub fn latency_metric(entry: &MicroBenchmarkRunResult) -> Option<BencherMetric> {
    if entry.error.is_some() {
        return None;
    }
    let stats = entry.stats.as_ref()?;
    Some(BencherMetric {
        value: nonzero(stats.p99).or(stats.avg)?,
        lower_value: nonzero(stats.min),
        upper_value: nonzero(stats.max).filter(|max| stats.min.is_some_and(|min| *max > min)),
    })
}

/// Builds the stanza name for one measured benchmark of a result.
#[must_use]
pub fn stanza_name(result: &SingleBenchmarkResults, entry: &MicroBenchmarkRunResult) -> String {
    format!(
        "{} {} {} / {}:{}",
        result.runtime.name.to_lowercase(),
        result.system.os.to_lowercase(),
        result.system.arch,
        result.suite.name,
        entry.name
    )
}

/// Formatter for [`super::Format::Bencher`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BencherFormatter;

impl BencherFormatter {
    /// Builds the report, skipping error-shaped results and benchmarks without measurements.
    ///
    /// # Errors
    ///
    /// If a successful result carries benchmark data that is not micro-benchmark output, the error is returned.
    pub fn format_report(&self, data: &MergedBenchmarkResults) -> anyhow::Result<BencherMetricFormat> {
        let mut report = BencherMetricFormat::new();
        for result in data.all.iter().filter(|result| !result.is_error()) {
            let Some(bench) = &result.bench else {
                log::warn!("[{}/{}] result has no benchmark data, skipping...", result.runtime.name, result.suite.name);
                continue;
            };
            let bench: MicroBenchmarkResult = serde_json::from_value(bench.clone()).with_context(|| {
                format!(
                    "could not read benchmark data of {} on {}",
                    result.suite.name, result.runtime.name
                )
            })?;

            for entry in &bench.benchmarks {
                let name = stanza_name(result, entry);
                let Some(metric) = latency_metric(entry) else {
                    log::warn!("[{name}] benchmark has no measurements, skipping...");
                    continue;
                };
                report.insert(name, BencherStanza::from([(LATENCY.to_string(), metric)]));
            }
        }
        log::debug!("formatted {} stanzas", report.len());

        Ok(report)
    }
}

impl Formatter for BencherFormatter {
    fn format(&self, data: &MergedBenchmarkResults) -> anyhow::Result<serde_json::Value> {
        serde_json::to_value(self.format_report(data)?).context("could not convert report to JSON")
    }
}
