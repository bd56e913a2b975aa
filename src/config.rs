//! Declarative suite configuration.
//!
//! A suite configuration file is a JSON document naming the runtimes to benchmark and the suites to run on them. The
//! primary entrypoint for this module is [`load`], which reads and deserializes one such file into a
//! [`RuntimeBenchmarkConfig`].
//!
//! # Examples
//!
//! ```
//! use runtime_bench::config::{RuntimeBenchmarkConfig, RuntimeDecl, SuiteSpec};
//!
//! let config: RuntimeBenchmarkConfig = serde_json::from_str(
//!     r#"{"runtimes": ["node", {"name": "deno"}], "suites": [["bench/a.mjs"], "bench/b.mjs"]}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.runtimes.len(), 2);
//! assert_eq!(config.runtimes[1].name(), "deno");
//! assert!(matches!(config.suites[1], SuiteSpec::Path(_)));
//! ```

use std::{collections::BTreeMap, fs::File, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Environment variable overrides, keyed by variable name.
pub type Env = BTreeMap<String, String>;

/// User-declared identity of a runtime.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Name of the runtime, e.g. `deno`. This is the key runtimes are cached and referenced by.
    pub name: String,
    /// Executable name or path, if it differs from [`RuntimeConfig::name`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<String>,
    /// Free-form version label for the runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl From<&str> for RuntimeConfig {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// A runtime declaration, either a bare name or a full [`RuntimeConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuntimeDecl {
    /// Bare runtime name, resolved as its own executable.
    Name(String),
    /// Runtime configuration with optional binary override.
    Config(RuntimeConfig),
}

impl RuntimeDecl {
    /// Declared name of the runtime.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Config(config) => &config.name,
        }
    }

    /// Normalizes this declaration into a [`RuntimeConfig`].
    #[must_use]
    pub fn to_config(&self) -> RuntimeConfig {
        match self {
            Self::Name(name) => RuntimeConfig::from(name.as_str()),
            Self::Config(config) => config.clone(),
        }
    }
}

impl From<&str> for RuntimeDecl {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Inline, user-authored overrides attached to a suite reference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteClass {
    /// Names of the runtimes to run this suite on; all configured runtimes when empty or absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtimes: Option<Vec<String>>,
    /// Extra arguments passed to the runtime after the harness script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Extra environment for the runtime process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Env>,
}

/// One element of a tuple-shaped suite entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuitePart {
    /// Path to the suite source file.
    Path(String),
    /// Overrides for the suite.
    Class(SuiteClass),
}

/// A suite entry as written in configuration.
///
/// The shape of tuple entries is only validated when the suite is executed, see [`crate::runs::Driver`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuiteSpec {
    /// Bare path to the suite source file.
    Path(String),
    /// `[path]` or `[path, overrides]`.
    Tuple(Vec<SuitePart>),
}

impl From<&str> for SuiteSpec {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl SuiteSpec {
    /// Splits this entry into its path and overrides, or `None` if the entry is malformed.
    #[must_use]
    pub fn split(&self) -> Option<(&str, SuiteClass)> {
        match self {
            Self::Path(path) => Some((path, SuiteClass::default())),
            Self::Tuple(parts) => match parts.as_slice() {
                [SuitePart::Path(path)] => Some((path, SuiteClass::default())),
                [SuitePart::Path(path), SuitePart::Class(class)] => Some((path, class.clone())),
                _ => None,
            },
        }
    }
}

/// Runtimes and suites to benchmark, as read from one suite configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeBenchmarkConfig {
    /// Runtimes to resolve and benchmark against.
    #[serde(default)]
    pub runtimes: Vec<RuntimeDecl>,
    /// Suites to run.
    #[serde(default)]
    pub suites: Vec<SuiteSpec>,
}

/// Reads a suite configuration file.
///
/// # Errors
///
/// If the file cannot be opened or is not a valid suite configuration document, the error is returned.
pub fn load(path: &Path) -> anyhow::Result<RuntimeBenchmarkConfig> {
    log::debug!("reading suite configuration ({})...", path.display());
    let config: RuntimeBenchmarkConfig = serde_json::from_reader(
        File::open(path)
            .with_context(|| format!("could not open suite file {}", path.display()))?,
    )
    .with_context(|| format!("could not deserialize suite file {}", path.display()))?;
    log::trace!("suite configuration: {config:#?}");

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_declarations_accept_names_and_objects() {
        let decls: Vec<RuntimeDecl> =
            serde_json::from_str(r#"["node", {"name": "deno", "bin": "/opt/deno", "version": "1.40"}]"#).unwrap();

        assert_eq!(decls[0], RuntimeDecl::from("node"));
        assert_eq!(
            decls[1].to_config(),
            RuntimeConfig {
                name: "deno".to_string(),
                bin: Some("/opt/deno".to_string()),
                version: Some("1.40".to_string()),
            }
        );
    }

    #[test]
    fn suite_entries_split_by_shape() {
        let suites: Vec<SuiteSpec> = serde_json::from_str(
            r#"["a.mjs", ["b.mjs"], ["c.mjs", {"runtimes": ["node"], "env": {"K": "V"}}], ["d.mjs", "e.mjs"], []]"#,
        )
        .unwrap();

        assert_eq!(suites[0].split().unwrap().0, "a.mjs");
        assert_eq!(suites[1].split().unwrap(), ("b.mjs", SuiteClass::default()));

        let (path, class) = suites[2].split().unwrap();
        assert_eq!(path, "c.mjs");
        assert_eq!(class.runtimes, Some(vec!["node".to_string()]));
        assert_eq!(class.env.unwrap().get("K").map(String::as_str), Some("V"));

        assert!(suites[3].split().is_none());
        assert!(suites[4].split().is_none());
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let config: RuntimeBenchmarkConfig = serde_json::from_str("{}").unwrap();

        assert!(config.runtimes.is_empty());
        assert!(config.suites.is_empty());
    }
}
