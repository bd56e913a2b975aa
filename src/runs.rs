//! Orchestration for running suites on runtimes.
//!
//! Resolves every configured runtime once, then runs each suite on each of its target runtimes through an
//! [`Operator`], strictly one pair at a time. The primary entrypoint is [`Driver::execute_suite`]; [`execute_all`]
//! drives it over a list of suite files.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use runtime_bench::execute_all;
//! use runtime_bench::modes::{BenchmarkMode, OperatorRegistry};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let operator = OperatorRegistry::with_defaults().resolve(BenchmarkMode::Micro)?;
//! let results = execute_all(&[PathBuf::from("benchmarks/suite.json")], operator.as_ref()).await?;
//! # Ok(())
//! # }
//! ```

use std::{collections::HashMap, path::PathBuf, time::Instant};

use thiserror::Error;

use crate::{
    config::{self, RuntimeBenchmarkConfig},
    modes::{Operator, OperatorContext},
    results::MergedBenchmarkResults,
    runtimes::{RuntimeInfo, RuntimeResolver},
    suites,
};

/// Configuration errors, which abort a whole batch.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The configuration declares no runtimes.
    #[error("no runtimes configured for benchmark suite")]
    NoRuntimes,
    /// The configuration declares no suites.
    #[error("no suites configured for benchmark suite")]
    NoSuites,
    /// A suite entry is neither a path nor a `[path]` or `[path, overrides]` array.
    #[error("invalid suite configuration at index {0}")]
    InvalidSuiteEntry(usize),
    /// A suite targets a runtime that is not configured.
    #[error("runtime '{0}' not found in configuration")]
    UnknownRuntime(String),
    /// A runtime is declared with an empty name.
    #[error("runtime name must not be empty")]
    EmptyRuntimeName,
}

/// Drives suites through an operator, caching resolved runtimes for its lifetime.
#[derive(Debug, Default)]
pub struct Driver {
    resolver: RuntimeResolver,
}

impl Driver {
    /// Creates a driver resolving runtimes from the system `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a driver with a custom runtime resolver.
    #[must_use]
    pub fn with_resolver(resolver: RuntimeResolver) -> Self {
        Self { resolver }
    }

    /// Runs every suite of `config` on each of its target runtimes.
    ///
    /// Suites target the runtimes they list, or every configured runtime if they list none. Results are ordered by
    /// suite, then by runtime.
    ///
    /// # Errors
    ///
    /// Configuration errors (see [`DriverError`]) and any error raised by the operator abort the call, and no results
    /// are returned. Expected failures of individual runs are part of the results.
    pub async fn execute_suite(
        &mut self,
        operator: &dyn Operator,
        config: &RuntimeBenchmarkConfig,
    ) -> anyhow::Result<MergedBenchmarkResults> {
        if config.runtimes.is_empty() {
            return Err(DriverError::NoRuntimes.into());
        }
        if config.suites.is_empty() {
            return Err(DriverError::NoSuites.into());
        }

        let mut runtimes: HashMap<String, RuntimeInfo> = HashMap::new();
        for decl in &config.runtimes {
            let info = self.resolver.resolve(decl)?;
            runtimes.insert(info.name.clone(), info);
        }
        log::debug!(
            "resolved info for {} runtimes, starting benchmarks...",
            runtimes.len()
        );

        let mut results = MergedBenchmarkResults::default();
        for (index, spec) in config.suites.iter().enumerate() {
            let (entry, class) = spec.split().ok_or(DriverError::InvalidSuiteEntry(index))?;
            let suite = suites::interpret(entry, class)?;
            log::trace!("interpreted suite: {suite:#?}");

            let targets: Vec<String> = if suite.runtimes.is_empty() {
                config.runtimes.iter().map(|decl| decl.name().to_string()).collect()
            } else {
                suite.runtimes.clone()
            };

            for target in targets {
                let runtime = runtimes
                    .get(&target)
                    .cloned()
                    .ok_or(DriverError::UnknownRuntime(target))?;
                let context = OperatorContext {
                    runtime,
                    suite: suite.clone(),
                };

                log::debug!("[{}] running suite...", context.identifier());
                let result = operator.run(&context).await?;
                if let Some(error) = &result.error {
                    log::warn!("[{}] run failed: {error}, continuing...", context.identifier());
                } else {
                    log::info!("[{}] run finished in {}ms", context.identifier(), result.total_ms);
                }
                results.all.push(result);
            }
        }

        Ok(results)
    }
}

/// Runs every suite file in order and merges their results.
///
/// Runtimes are resolved once for the whole call, even when shared between files.
///
/// # Errors
///
/// If any suite file cannot be loaded or executed, the error is returned and no results are.
pub async fn execute_all(paths: &[PathBuf], operator: &dyn Operator) -> anyhow::Result<MergedBenchmarkResults> {
    let start = Instant::now();
    let mut driver = Driver::new();
    let mut merged = MergedBenchmarkResults::default();

    for path in paths {
        log::info!("reading suite from {}...", path.display());
        let config = config::load(path)?;

        let batch_start = Instant::now();
        let batch = driver.execute_suite(operator, &config).await?;
        log::info!(
            "benchmark completed in {}ms",
            batch_start.elapsed().as_millis()
        );
        merged.merge(batch);
    }
    log::info!(
        "all benchmarks completed in {}ms ({} results)",
        start.elapsed().as_millis(),
        merged.all.len()
    );

    Ok(merged)
}
