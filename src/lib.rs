//! Comparative benchmarking of code across language runtimes.
//!
//! runtime-bench runs suites of micro-benchmarks against several runtime binaries (for example, several JavaScript
//! engines), normalizes their output into a common result shape, and emits it in a pluggable report format.
//!
//! # Suites
//! A suite file is a JSON document listing the runtimes to benchmark and the suite sources to run on them:
//!
//! ```json
//! {
//!   "runtimes": ["node", "bun", {"name": "deno", "bin": "/opt/deno/bin/deno"}],
//!   "suites": [
//!     ["benchmarks/sort.mjs"],
//!     ["benchmarks/json.mjs", {"runtimes": ["node"], "args": ["--expose-gc"], "env": {"NODE_ENV": "production"}}]
//!   ]
//! }
//! ```
//!
//! Suite sources are plain scripts using the `bench`, `group`, `baseline` and `runBenchmarks` globals provided by the
//! harness. Each suite runs on the runtimes it lists, or on every configured runtime if it lists none.
//!
//! # Usage
//!
//! ## As an executable
//! ```console
//! $ runtime-bench --help
//! Run benchmarks across runtimes, and generate comparative report data.
//!
//! Usage: runtime-bench [OPTIONS] [SUITES]...
//!
//! Arguments:
//!   [SUITES]...  Suite files to run, as glob patterns [default: benchmarks/**/*.json]
//!
//! Options:
//!   -m, --mode <MODE>      Benchmark mode [default: micro] [possible values: micro, shell, server, custom]
//!   -f, --format <FORMAT>  Output format [default: bencher] [possible values: bencher]
//!   -o, --output <OUTPUT>  File to write the report to [default: bench-results.json]
//!   -v, --verbose          Enable verbose logging
//!   -q, --quiet            Squelch most output
//!   -h, --help             Print help
//!   -V, --version          Print version
//! ```
//!
//! ## As a library
//! ```no_run
//! use std::path::PathBuf;
//!
//! use runtime_bench::execute_all;
//! use runtime_bench::formats::{Format, FormatterRegistry};
//! use runtime_bench::modes::{BenchmarkMode, OperatorRegistry};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let operator = OperatorRegistry::with_defaults().resolve(BenchmarkMode::Micro)?;
//! let formatter = FormatterRegistry::with_defaults().resolve(Format::Bencher)?;
//!
//! let results = execute_all(&[PathBuf::from("benchmarks/suite.json")], operator.as_ref()).await?;
//! let report = formatter.serialize(&formatter.format(&results)?)?;
//! #     Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]

pub mod config;
pub mod formats;
pub mod modes;
mod registry;
pub mod results;
pub mod runs;
pub mod runtimes;
pub mod suites;
pub mod system;

pub use registry::RegistryError;
pub use results::{MergedBenchmarkResults, SingleBenchmarkResults};
pub use runs::{execute_all, Driver, DriverError};
