//! Benchmark modes and the operators that execute them.
//!
//! An [`Operator`] knows how to run one suite on one runtime for a given [`BenchmarkMode`]. Operators are looked up
//! through an [`OperatorRegistry`], so the driver never needs to know which concrete operator it is using.
//!
//! # Examples
//!
//! ```no_run
//! use runtime_bench::modes::{BenchmarkMode, OperatorRegistry};
//!
//! let registry = OperatorRegistry::with_defaults();
//! let operator = registry.resolve(BenchmarkMode::Micro).expect("micro mode is always registered");
//! ```

use std::fmt::{self, Display, Formatter};

use clap::ValueEnum;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::{
    registry::{Registry, RegistryError},
    results::SingleBenchmarkResults,
    runtimes::RuntimeInfo,
    suites::InterpretedSuite,
};

pub mod harness;
pub mod micro;

pub use micro::MicroBenchmarks;

/// Kind of benchmark being run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkMode {
    /// Micro-benchmarks defined in script source, run under a harness.
    Micro,
    /// Shell command benchmarks.
    Shell,
    /// Server load benchmarks.
    Server,
    /// Benchmarks driven by a custom script.
    Custom,
}

impl Display for BenchmarkMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Micro => "micro",
            Self::Shell => "shell",
            Self::Server => "server",
            Self::Custom => "custom",
        };
        write!(f, "{name}")
    }
}

/// Unit of work handed to an operator: one suite on one runtime.
#[derive(Clone, Debug)]
pub struct OperatorContext {
    /// Runtime to run the suite on.
    pub runtime: RuntimeInfo,
    /// Suite to run.
    pub suite: InterpretedSuite,
}

impl OperatorContext {
    /// Identifier used to prefix log lines about this pair.
    #[must_use]
    pub fn identifier(&self) -> String {
        format!("{}/{}", self.runtime.name, self.suite.name)
    }
}

/// Executes one benchmark mode.
pub trait Operator: Send + Sync {
    /// Runs the suite in `context` on its runtime.
    ///
    /// Expected failures, like a runtime exiting unsuccessfully, are returned as error-shaped results.
    ///
    /// # Errors
    ///
    /// Anything outside of the expected failures is returned as an error, and aborts the batch it is part of.
    fn run<'a>(&'a self, context: &'a OperatorContext) -> BoxFuture<'a, anyhow::Result<SingleBenchmarkResults>>;
}

/// Registry of operators by benchmark mode.
pub struct OperatorRegistry {
    inner: Registry<BenchmarkMode, dyn Operator>,
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl OperatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: Registry::new(RegistryError::UnknownMode),
        }
    }

    /// Creates a registry holding every built-in operator.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(BenchmarkMode::Micro, || Box::new(MicroBenchmarks::new()));
        registry
    }

    /// Registers an operator factory for a mode, replacing any previous registration.
    pub fn register(
        &mut self,
        mode: BenchmarkMode,
        factory: impl Fn() -> Box<dyn Operator> + Send + Sync + 'static,
    ) {
        self.inner.register(mode, factory);
    }

    /// Builds the operator registered for a mode.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownMode`] if nothing is registered for `mode`.
    pub fn resolve(&self, mode: BenchmarkMode) -> Result<Box<dyn Operator>, RegistryError> {
        self.inner.resolve(&mode)
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;

    struct Failing;

    impl Operator for Failing {
        fn run<'a>(&'a self, _: &'a OperatorContext) -> BoxFuture<'a, anyhow::Result<SingleBenchmarkResults>> {
            async { Err(anyhow::anyhow!("failing operator")) }.boxed()
        }
    }

    #[test]
    fn unregistered_modes_fail_to_resolve() {
        let registry = OperatorRegistry::with_defaults();

        assert!(registry.resolve(BenchmarkMode::Micro).is_ok());
        assert!(matches!(
            registry.resolve(BenchmarkMode::Shell),
            Err(RegistryError::UnknownMode(mode)) if mode == "shell"
        ));
    }

    #[test]
    fn later_registrations_win() {
        let mut registry = OperatorRegistry::empty();
        registry.register(BenchmarkMode::Custom, || Box::new(MicroBenchmarks::new()));
        registry.register(BenchmarkMode::Custom, || Box::new(Failing));

        let context = OperatorContext {
            runtime: RuntimeInfo {
                name: "node".to_string(),
                bin: "node".to_string(),
                version: None,
                resolved: "node".to_string(),
            },
            suite: crate::suites::interpret_in(
                std::path::Path::new("/work"),
                "a.mjs",
                crate::config::SuiteClass::default(),
            ),
        };
        let operator = registry.resolve(BenchmarkMode::Custom).unwrap();
        let err = futures::executor::block_on(operator.run(&context)).unwrap_err();

        assert_eq!(err.to_string(), "failing operator");
    }
}
