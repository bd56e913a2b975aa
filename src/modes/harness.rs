//! Rendering of the harness script wrapped around a micro-benchmark suite.
//!
//! The rendered script imports the benchmarking library, exposes its bindings as globals for the suite to use, runs
//! the suite source verbatim, and finally asks the library to emit its results as JSON on standard error.

use crate::runtimes::RuntimeShim;

/// Bindings exposed to suite source, as `(global name, library export)`.
const BINDINGS: &[(&str, &str)] = &[
    ("runBenchmarks", "run"),
    ("bench", "bench"),
    ("group", "group"),
    ("baseline", "baseline"),
];

/// Options the harness passes to the library's `run` call.
const RUN_OPTIONS: &[(&str, bool)] = &[
    ("units", false),
    ("avg", true),
    ("json", true),
    ("colors", true),
    ("min_max", true),
    ("percentiles", true),
    ("data_to_stderr", true),
];

fn preamble(shim: &RuntimeShim) -> String {
    let imports = BINDINGS
        .iter()
        .map(|(_, export)| *export)
        .collect::<Vec<_>>()
        .join(", ");
    let globals: String = BINDINGS
        .iter()
        .map(|(global, export)| format!("globalThis['{global}'] = {export};\n"))
        .collect();

    format!("import {{ {imports} }} from '{}';\n\n{globals}", shim.harness_module)
}

fn runner() -> String {
    let options = RUN_OPTIONS
        .iter()
        .map(|(key, value)| format!("  {key}: {value},\n"))
        .collect::<String>();

    format!("await run({{\n{options}}});\n")
}

/// Renders the full harness script for `source` under the runtime described by `shim`.
#[must_use]
pub fn render(shim: &RuntimeShim, source: &str) -> String {
    format!(
        "// script preamble (benchmark harness)\n{}\n// benchmark\n{source}\n\n// runner\n{}",
        preamble(shim),
        runner()
    )
}
