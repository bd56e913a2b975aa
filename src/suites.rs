//! Interpretation of suite entries into fully specified suites.

use std::{
    env,
    path::{Component, Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::{Env, SuiteClass};

/// Fully resolved suite, ready to be handed to an operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretedSuite {
    /// Final path segment of [`InterpretedSuite::resolved`].
    pub name: String,
    /// Path to the suite source as written in configuration.
    pub entry: String,
    /// Absolute path to the suite source.
    pub resolved: PathBuf,
    /// Runtimes to run this suite on; empty means all configured runtimes.
    pub runtimes: Vec<String>,
    /// Extra arguments for the runtime, after the harness script.
    pub args: Vec<String>,
    /// Extra environment for the runtime, winning over inherited variables.
    pub env: Env,
    /// Whether the runtime inherits our own environment.
    #[serde(rename = "sysEnv")]
    pub sys_env: bool,
}

/// Joins `entry` under `base`, folding `.` and `..` without touching the filesystem.
///
/// A root or prefix in `entry` is dropped, so the result stays anchored at `base`.
fn anchor(base: &Path, entry: &str) -> PathBuf {
    let entry = Path::new(entry)
        .components()
        .filter(|component| !matches!(component, Component::Prefix(_) | Component::RootDir));
    let mut normalized = PathBuf::new();
    for component in base.components().chain(entry) {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Interprets a suite entry against an explicit base directory.
///
/// The entry file is not required to exist. Absolute entries are still placed under `base`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use runtime_bench::{config::SuiteClass, suites::interpret_in};
///
/// let suite = interpret_in(Path::new("/work"), "bench/../bench/sort.mjs", SuiteClass::default());
///
/// assert_eq!(suite.resolved, Path::new("/work/bench/sort.mjs"));
/// assert_eq!(suite.name, "sort.mjs");
/// assert!(suite.sys_env);
///
/// let suite = interpret_in(Path::new("/work"), "/elsewhere/b.mjs", SuiteClass::default());
/// assert_eq!(suite.resolved, Path::new("/work/elsewhere/b.mjs"));
/// ```
#[must_use]
pub fn interpret_in(base: &Path, entry: &str, class: SuiteClass) -> InterpretedSuite {
    let resolved = anchor(base, entry);
    let name = resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    InterpretedSuite {
        name,
        entry: entry.to_string(),
        resolved,
        runtimes: class.runtimes.unwrap_or_default(),
        args: class.args.unwrap_or_default(),
        env: class.env.unwrap_or_default(),
        // not user-settable yet
        sys_env: true,
    }
}

/// Interprets a suite entry relative to the current working directory.
///
/// # Errors
///
/// If the current working directory cannot be determined, the error is returned.
pub fn interpret(entry: &str, class: SuiteClass) -> anyhow::Result<InterpretedSuite> {
    let cwd = env::current_dir().context("could not determine current working directory")?;
    Ok(interpret_in(&cwd, entry, class))
}
