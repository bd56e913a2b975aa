//! Per-runtime compatibility shims.
//!
//! Runtimes disagree on how a harness module is imported, which permissions a script needs, and which stream
//! benchmark data ends up on. Supporting a new runtime means adding a row to [`SHIMS`].

/// What to do with a runtime's standard output while it runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StdoutPolicy {
    /// Forward bytes live to our own standard output.
    Passthrough,
    /// Capture bytes, to be used as benchmark output if nothing arrives on standard error.
    Buffer,
}

/// Compatibility settings for launching a harness script under one runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeShim {
    /// Specifier the harness preamble imports the benchmarking library from.
    pub harness_module: &'static str,
    /// Arguments placed before the script path.
    pub prefix_args: &'static [&'static str],
    /// Handling of the runtime's standard output.
    pub stdout: StdoutPolicy,
}

const DEFAULT_SHIM: RuntimeShim = RuntimeShim {
    harness_module: "mitata",
    prefix_args: &[],
    stdout: StdoutPolicy::Passthrough,
};

const SHIMS: &[(&str, RuntimeShim)] = &[(
    "deno",
    RuntimeShim {
        harness_module: "npm:mitata",
        // `--allow-sys` is needed for the harness to read CPU info
        prefix_args: &["run", "--allow-sys"],
        stdout: StdoutPolicy::Buffer,
    },
)];

/// Returns the shim for a runtime by its declared name, or the default shim.
#[must_use]
pub fn shim_for(runtime_name: &str) -> RuntimeShim {
    SHIMS
        .iter()
        .find(|(name, _)| *name == runtime_name)
        .map_or(DEFAULT_SHIM, |(_, shim)| *shim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deno_needs_run_prefix_and_buffered_stdout() {
        let shim = shim_for("deno");

        assert_eq!(shim.harness_module, "npm:mitata");
        assert_eq!(shim.prefix_args, &["run", "--allow-sys"]);
        assert_eq!(shim.stdout, StdoutPolicy::Buffer);
    }

    #[test]
    fn unknown_runtimes_get_the_default() {
        assert_eq!(shim_for("node"), DEFAULT_SHIM);
        assert_eq!(shim_for("bun"), DEFAULT_SHIM);
    }
}
