//! Report formats and the formatters that produce them.
//!
//! A [`Formatter`] turns [`MergedBenchmarkResults`] into a serializable report shape and serializes it. Formatters are
//! looked up through a [`FormatterRegistry`].

use std::fmt::{self, Display, Formatter as FmtFormatter};

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    modes::BenchmarkMode,
    registry::{Registry, RegistryError},
    results::MergedBenchmarkResults,
};

pub mod bencher;

pub use bencher::BencherFormatter;

/// Supported report formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Bencher Metric Format, see <https://bencher.dev>.
    Bencher,
}

impl Display for Format {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> fmt::Result {
        match self {
            Self::Bencher => write!(f, "bencher"),
        }
    }
}

/// Lays out benchmark results for one reporting mechanism.
pub trait Formatter: Send + Sync {
    /// Transforms results into this format's report shape.
    ///
    /// # Errors
    ///
    /// If the results cannot be represented in this format, the error is returned.
    fn format(&self, data: &MergedBenchmarkResults) -> anyhow::Result<serde_json::Value>;

    /// Serializes a report shape produced by [`Formatter::format`], as indented JSON unless overridden.
    ///
    /// # Errors
    ///
    /// If the report cannot be serialized, the error is returned.
    fn serialize(&self, formatted: &serde_json::Value) -> anyhow::Result<String> {
        serde_json::to_string_pretty(formatted).context("could not serialize report")
    }

    /// Whether this format can report results of the given mode.
    fn supports(&self, _mode: BenchmarkMode) -> bool {
        true
    }
}

/// Registry of formatters by format.
pub struct FormatterRegistry {
    inner: Registry<Format, dyn Formatter>,
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl FormatterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: Registry::new(RegistryError::UnknownFormat),
        }
    }

    /// Creates a registry holding every built-in formatter.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Format::Bencher, || Box::new(BencherFormatter));
        registry
    }

    /// Registers a formatter factory for a format, replacing any previous registration.
    pub fn register(&mut self, format: Format, factory: impl Fn() -> Box<dyn Formatter> + Send + Sync + 'static) {
        self.inner.register(format, factory);
    }

    /// Builds the formatter registered for a format.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownFormat`] if nothing is registered for `format`.
    pub fn resolve(&self, format: Format) -> Result<Box<dyn Formatter>, RegistryError> {
        self.inner.resolve(&format)
    }
}
