//! Micro-benchmark operator.
//!
//! Runs a suite of micro-benchmarks written against the harness library under a runtime. For every (runtime, suite)
//! pair, a harness script is rendered around the suite source and written to a fresh temporary directory along with
//! a symlink to the dependency directory, so the script can import the harness library by name. The runtime is then
//! spawned on that script and its output is interpreted as the benchmark data.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! use runtime_bench::config::{RuntimeDecl, SuiteClass};
//! use runtime_bench::modes::{MicroBenchmarks, OperatorContext};
//! use runtime_bench::runtimes::RuntimeResolver;
//! use runtime_bench::suites::interpret;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let context = OperatorContext {
//!     runtime: RuntimeResolver::new().resolve(&RuntimeDecl::from("node"))?,
//!     suite: interpret("benchmarks/sort.mjs", SuiteClass::default())?,
//! };
//!
//! let result = MicroBenchmarks::new().run_bench(&context).await?;
//! # Ok(())
//! # }
//! ```

use std::{
    env, iter,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Instant,
};

use anyhow::Context;
use futures::{future::BoxFuture, FutureExt};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    process::Command,
};

use super::{harness, Operator, OperatorContext};
use crate::{
    results::SingleBenchmarkResults,
    runtimes::{shim_for, StdoutPolicy},
    system::SystemInfo,
};

/// Prefix of the temporary directory created for each run.
pub const TEMP_PREFIX: &str = "runtime-bench-";

/// File name of the rendered harness script.
pub const ENTRY_FILE_NAME: &str = "entry.mjs";

/// Name of the dependency directory, both in the working directory and in each temporary directory.
pub const DEPS_DIR_NAME: &str = "node_modules";

const CHUNK_SIZE: usize = 8 * 1024;

/// Operator for [`super::BenchmarkMode::Micro`].
#[derive(Clone, Debug)]
pub struct MicroBenchmarks {
    system: SystemInfo,
    deps_dir: Option<PathBuf>,
}

impl Default for MicroBenchmarks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn link_dir(original: &Path, link: &Path) -> std::io::Result<()> {
    tokio::fs::symlink(original, link).await
}

#[cfg(windows)]
async fn link_dir(original: &Path, link: &Path) -> std::io::Result<()> {
    tokio::fs::symlink_dir(original, link).await
}

/// Drains a runtime's standard output, forwarding or buffering it according to `policy`.
async fn capture_stdout(mut stream: impl AsyncRead + Unpin, policy: StdoutPolicy) -> std::io::Result<Vec<u8>> {
    let mut gathered = Vec::new();
    let mut passthrough = tokio::io::stdout();
    let mut chunk = vec![0; CHUNK_SIZE];
    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        match policy {
            StdoutPolicy::Passthrough => passthrough.write_all(&chunk[..read]).await?,
            StdoutPolicy::Buffer => gathered.extend_from_slice(&chunk[..read]),
        }
    }
    passthrough.flush().await?;

    Ok(gathered)
}

async fn read_all(mut stream: impl AsyncRead + Unpin) -> std::io::Result<Vec<u8>> {
    let mut gathered = Vec::new();
    stream.read_to_end(&mut gathered).await?;
    Ok(gathered)
}

fn failure_message(status: ExitStatus) -> Option<String> {
    match status.code() {
        Some(0) => None,
        Some(code) => Some(format!("Benchmark failed with exit code {code}")),
        None => Some(format!("Benchmark failed with exit status {status}")),
    }
}

impl MicroBenchmarks {
    /// Creates the operator, collecting host facts once for every result it produces.
    #[must_use]
    pub fn new() -> Self {
        Self::with_system(SystemInfo::collect())
    }

    /// Creates the operator with the given host facts.
    #[must_use]
    pub fn with_system(system: SystemInfo) -> Self {
        Self {
            system,
            deps_dir: None,
        }
    }

    /// Overrides the dependency directory linked into each temporary directory.
    ///
    /// Defaults to `node_modules` under the current working directory.
    #[must_use]
    pub fn with_deps_dir(mut self, deps_dir: impl Into<PathBuf>) -> Self {
        self.deps_dir = Some(deps_dir.into());
        self
    }

    fn deps_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.deps_dir {
            Some(deps_dir) => Ok(deps_dir.clone()),
            None => Ok(env::current_dir()
                .context("could not determine current working directory")?
                .join(DEPS_DIR_NAME)),
        }
    }

    fn result(
        &self,
        context: &OperatorContext,
        start: Instant,
        bench: Option<serde_json::Value>,
        error: Option<String>,
    ) -> SingleBenchmarkResults {
        SingleBenchmarkResults {
            runtime: context.runtime.clone(),
            system: self.system.clone(),
            suite: context.suite.clone(),
            total_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            bench,
            error,
        }
    }

    /// Runs one suite on one runtime.
    ///
    /// A non-zero exit or an empty output is returned as an error-shaped result.
    ///
    /// # Errors
    ///
    /// If the suite source cannot be read, the temporary directory cannot be provisioned, the runtime cannot be
    /// spawned, or a successful run emits output that is not JSON, then the error is returned.
    pub async fn run_bench(&self, context: &OperatorContext) -> anyhow::Result<SingleBenchmarkResults> {
        let id = context.identifier();
        let OperatorContext { runtime, suite } = context;
        let shim = shim_for(&runtime.name);
        let start = Instant::now();

        let source = tokio::fs::read_to_string(&suite.resolved)
            .await
            .with_context(|| format!("could not read suite source {}", suite.resolved.display()))?;
        let script = harness::render(&shim, &source);
        log::trace!("[{id}] harness script:\n{script}");

        // removed on drop, whichever way this function returns
        let workdir = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir()
            .context("could not create temporary directory")?;
        let entry_path = workdir.path().join(ENTRY_FILE_NAME);
        tokio::fs::write(&entry_path, script)
            .await
            .with_context(|| format!("could not write harness script {}", entry_path.display()))?;
        let deps_dir = self.deps_dir()?;
        link_dir(&deps_dir, &workdir.path().join(DEPS_DIR_NAME))
            .await
            .with_context(|| format!("could not link dependency directory {}", deps_dir.display()))?;

        let mut command = Command::new(&runtime.resolved);
        command
            .args(shim.prefix_args)
            .arg(&entry_path)
            .args(&suite.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if !suite.sys_env {
            command.env_clear();
        }
        command.envs(&suite.env);

        let display_args: Vec<String> = shim
            .prefix_args
            .iter()
            .map(ToString::to_string)
            .chain(iter::once(entry_path.display().to_string()))
            .chain(suite.args.iter().cloned())
            .collect();
        log::info!("[{id}] {} {}", runtime.name, display_args.join(" "));
        let mut child = command
            .spawn()
            .with_context(|| format!("could not spawn runtime {} ({})", runtime.name, runtime.resolved))?;
        let stdout = child.stdout.take().context("could not capture runtime stdout")?;
        let stderr = child.stderr.take().context("could not capture runtime stderr")?;

        // both streams are drained to EOF before the exit status is looked at
        let (status, gathered_stdout, gathered_stderr) = tokio::try_join!(
            child.wait(),
            capture_stdout(stdout, shim.stdout),
            read_all(stderr),
        )
        .with_context(|| format!("could not collect output of runtime {}", runtime.name))?;
        log::debug!("[{id}] runtime exited with {status}");

        let output = if gathered_stderr.is_empty() {
            String::from_utf8_lossy(&gathered_stdout).into_owned()
        } else {
            String::from_utf8_lossy(&gathered_stderr).into_owned()
        };

        if let Some(message) = failure_message(status) {
            log::error!("[{id}] {message}\n{output}");
            return Ok(self.result(context, start, None, Some(message)));
        }
        if output.trim().is_empty() {
            let message = "No benchmark output received".to_string();
            log::error!("[{id}] {message}");
            return Ok(self.result(context, start, None, Some(message)));
        }

        let bench: serde_json::Value = serde_json::from_str(&output)
            .map_err(|err| {
                log::error!("[{id}] could not parse benchmark output:\n{output}");
                err
            })
            .context("could not parse benchmark output as JSON")?;
        let result = self.result(context, start, Some(bench), None);
        log::info!("[{id}] benchmark finished in {}ms", result.total_ms);

        Ok(result)
    }
}

impl Operator for MicroBenchmarks {
    fn run<'a>(&'a self, context: &'a OperatorContext) -> BoxFuture<'a, anyhow::Result<SingleBenchmarkResults>> {
        self.run_bench(context).boxed()
    }
}
