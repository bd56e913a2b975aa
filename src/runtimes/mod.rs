//! Utilities for resolving runtimes to executables.
//!
//! The primary entrypoint for this module is [`RuntimeResolver::resolve`], which turns a [`RuntimeDecl`] into a
//! cached [`RuntimeInfo`] describing the executable to spawn.
//!
//! # Examples
//!
//! ```
//! use runtime_bench::config::RuntimeDecl;
//! use runtime_bench::runtimes::RuntimeResolver;
//!
//! let mut resolver = RuntimeResolver::new();
//! let info = resolver.resolve(&RuntimeDecl::from("/usr/bin/env")).unwrap();
//!
//! assert_eq!(info.resolved, "/usr/bin/env");
//! ```

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{config::RuntimeDecl, runs::DriverError};

mod shims;

pub use shims::{shim_for, RuntimeShim, StdoutPolicy};

/// Fully resolved runtime, ready to be spawned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    /// Declared name of the runtime.
    pub name: String,
    /// Executable identifier the runtime was resolved from.
    pub bin: String,
    /// Free-form version label for the runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Path found on lookup, or the bare [`RuntimeInfo::bin`] identifier if lookup missed.
    pub resolved: String,
}

type Lookup = Box<dyn Fn(&str) -> Option<PathBuf> + Send + Sync>;

/// Searches `PATH` for an executable, tolerating misses.
fn lookup_on_path(bin: &str) -> Option<PathBuf> {
    which::which(bin)
        .map_err(|err| log::debug!("could not find {bin} on PATH: {err}"))
        .ok()
}

/// Resolves and caches runtime executables by declared name.
///
/// Entries are never invalidated; a resolver is meant to live for one benchmarking invocation.
pub struct RuntimeResolver {
    cache: HashMap<String, RuntimeInfo>,
    lookup: Lookup,
}

impl fmt::Debug for RuntimeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeResolver")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Default for RuntimeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeResolver {
    /// Creates a resolver which searches the system `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lookup(lookup_on_path)
    }

    /// Creates a resolver with a custom lookup for non-absolute executable identifiers.
    pub fn with_lookup(lookup: impl Fn(&str) -> Option<PathBuf> + Send + Sync + 'static) -> Self {
        Self {
            cache: HashMap::new(),
            lookup: Box::new(lookup),
        }
    }

    /// Resolves a runtime declaration, returning the cached entry if the name was seen before.
    ///
    /// A lookup miss is not an error here: the bare identifier is used instead, and failure surfaces when the
    /// runtime is spawned.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::EmptyRuntimeName`] if the declared name is empty.
    pub fn resolve(&mut self, decl: &RuntimeDecl) -> Result<RuntimeInfo, DriverError> {
        let config = decl.to_config();
        if config.name.is_empty() {
            return Err(DriverError::EmptyRuntimeName);
        }
        if let Some(cached) = self.cache.get(&config.name) {
            log::trace!("runtime ({}) already resolved", config.name);
            return Ok(cached.clone());
        }

        let bin = config.bin.unwrap_or_else(|| config.name.clone());
        let resolved = if Path::new(&bin).is_absolute() {
            Some(PathBuf::from(&bin))
        } else {
            (self.lookup)(&bin)
        };
        log::debug!("runtime ({}) resolved to path: {resolved:?}", config.name);

        let info = RuntimeInfo {
            name: config.name.clone(),
            resolved: resolved.map_or_else(|| bin.clone(), |path| path.to_string_lossy().into_owned()),
            bin,
            version: config.version,
        };
        self.cache.insert(config.name, info.clone());

        Ok(info)
    }
}
